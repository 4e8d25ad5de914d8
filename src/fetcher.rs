use std::collections::HashMap;

use crate::error::FetchError;
use crate::segment::Segment;
use crate::split::Split;

/// SplitFetcher is the interface the [crate::Poller] uses to retrieve definitions from the remote
/// service.
///
/// Implementations own the transport, authentication and any timeout policy; the poller calls
/// them from its background thread without holding any lock, one call at a time.
pub trait SplitFetcher: Send + Sync {
    /// Retrieve all split definitions keyed by name, along with the change number cursor the
    /// service reported.
    fn fetch_splits(&self) -> Result<(HashMap<String, Split>, i64), FetchError>;

    /// Retrieve the segment definitions used by `splits`, along with the number of segments
    /// retrieved.
    ///
    /// [crate::segment_names_for_splits] lists the segment names a set of splits depends on.
    fn fetch_segments_for_splits(
        &self,
        splits: &HashMap<String, Split>,
    ) -> Result<(HashMap<String, Segment>, usize), FetchError>;
}
