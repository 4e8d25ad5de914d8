use std::sync::Arc;

use crate::split_data::SplitData;

/// SplitDataSource is an interface for anything that holds the current [SplitData] snapshot.
///
/// Ordinarily, the only implementation of this interface is the [crate::Poller], which swaps in a
/// new snapshot after every successful polling cycle. The [crate::Serializer] reads through this
/// interface so that it can be tested against fixed data.
pub trait SplitDataSource: Send + Sync {
    /// Retrieve the current snapshot. Implementations must return promptly and never block on an
    /// in-flight fetch.
    fn split_data(&self) -> Arc<SplitData>;
}

impl SplitDataSource for SplitData {
    fn split_data(&self) -> Arc<SplitData> {
        Arc::new(self.clone())
    }
}
