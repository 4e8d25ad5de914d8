use std::collections::HashMap;

use crate::segment::Segment;
use crate::split::Split;

/// SplitData is a complete snapshot of split and segment definitions produced by one successful
/// polling cycle.
///
/// A value is either the empty default (no cycle has succeeded yet) or fully populated from a
/// single cycle. The poller replaces its snapshot wholesale and hands out shared, immutable
/// references, so readers never see fields from two different cycles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitData {
    /// Split definitions keyed by split name.
    pub splits: HashMap<String, Split>,
    /// Change number cursor returned by the split fetch.
    pub since: i64,
    /// Segment definitions keyed by segment name.
    pub segments: HashMap<String, Segment>,
    /// Number of segments retrieved in the cycle that produced this snapshot.
    pub using_segments_count: usize,
}

impl SplitData {
    pub fn new(
        splits: HashMap<String, Split>,
        since: i64,
        segments: HashMap<String, Segment>,
        using_segments_count: usize,
    ) -> Self {
        SplitData {
            splits,
            since,
            segments,
            using_segments_count,
        }
    }

    /// Reports whether this is the empty snapshot held before any cycle has succeeded.
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
            && self.segments.is_empty()
            && self.since == 0
            && self.using_segments_count == 0
    }
}
