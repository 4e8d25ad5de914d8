//! Keeps an in-memory snapshot of Split feature flag and segment definitions up to date and
//! renders it as a `<script>` element that preloads a browser SDK's cache.
//!
//! A [Poller] refreshes the snapshot on a background thread using a caller-supplied
//! [SplitFetcher]; a [Serializer] (or [Poller::serialized_data]) turns the current snapshot into
//! the script payload on demand.
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and does not install a logger.

mod condition;
mod config;
mod error;
mod fetcher;
mod poller;
mod segment;
mod serializer;
mod split;
mod split_data;
mod store;
mod test_common;
mod util;

pub use condition::*;
pub use config::*;
pub use error::*;
pub use fetcher::*;
pub use poller::*;
pub use segment::*;
pub use serializer::*;
pub use split::*;
pub use split_data::*;
pub use store::*;
