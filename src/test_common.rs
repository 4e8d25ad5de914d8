#![cfg(test)]

use crate::error::FetchError;
use crate::fetcher::SplitFetcher;
use crate::segment::Segment;
use crate::split::Split;
use crate::split_data::SplitData;
use maplit::hashmap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const SPLITS_ERROR: &str = "Error from splitio API when getting splits";
pub const SEGMENTS_ERROR: &str = "Error from splitio API when getting segments";

/// A fetcher that returns one split and one segment per call, bumping the change number and
/// segment count every time so that each successful cycle is observable.
pub struct MockFetcher {
    since: AtomicI64,
    using_segments_count: AtomicUsize,
    splits_valid: AtomicBool,
    segments_valid: AtomicBool,
    split_calls: AtomicUsize,
    segment_calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new(splits_valid: bool, segments_valid: bool) -> Arc<Self> {
        Arc::new(Self {
            since: AtomicI64::new(0),
            using_segments_count: AtomicUsize::new(0),
            splits_valid: AtomicBool::new(splits_valid),
            segments_valid: AtomicBool::new(segments_valid),
            split_calls: AtomicUsize::new(0),
            segment_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_splits_valid(&self, valid: bool) {
        self.splits_valid.store(valid, Ordering::SeqCst);
    }

    pub fn set_segments_valid(&self, valid: bool) {
        self.segments_valid.store(valid, Ordering::SeqCst);
    }

    pub fn split_calls(&self) -> usize {
        self.split_calls.load(Ordering::SeqCst)
    }

    pub fn segment_calls(&self) -> usize {
        self.segment_calls.load(Ordering::SeqCst)
    }
}

impl SplitFetcher for MockFetcher {
    fn fetch_splits(&self) -> Result<(HashMap<String, Split>, i64), FetchError> {
        self.split_calls.fetch_add(1, Ordering::SeqCst);
        if !self.splits_valid.load(Ordering::SeqCst) {
            return Err(FetchError::new(SPLITS_ERROR));
        }

        let split = Split {
            name: "mock-split".to_string(),
            ..Default::default()
        };
        let since = self.since.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((hashmap! { "mock-split".to_string() => split }, since))
    }

    fn fetch_segments_for_splits(
        &self,
        _splits: &HashMap<String, Split>,
    ) -> Result<(HashMap<String, Segment>, usize), FetchError> {
        self.segment_calls.fetch_add(1, Ordering::SeqCst);
        if !self.segments_valid.load(Ordering::SeqCst) {
            return Err(FetchError::new(SEGMENTS_ERROR));
        }

        let segment = Segment {
            name: "mock-segment".to_string(),
            ..Default::default()
        };
        let count = self.using_segments_count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((hashmap! { "mock-segment".to_string() => segment }, count))
    }
}

pub fn sample_split_data() -> SplitData {
    SplitData::new(
        hashmap! {
            "mock-split-1".to_string() => Split {
                name: "mock-split-1".to_string(),
                status: "mock-status-1".to_string(),
                ..Default::default()
            },
        },
        1,
        hashmap! {
            "mock-segment-1".to_string() => Segment {
                name: "mock-segment-1".to_string(),
                added: Some(vec!["foo".to_string(), "bar".to_string()]),
                removed: None,
                since: 20,
                till: 20,
            },
        },
        2,
    )
}

/// Polls `condition` until it holds or `timeout` elapses, returning its final value.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
