use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, SendTimeoutError, Sender, TrySendError};
use log::{debug, error, warn};
use parking_lot::{Mutex, RwLock};

use crate::config::{polling_interval_from_seconds, PollerConfig, PollerConfigBuilder};
use crate::error::{Error, Result};
use crate::fetcher::SplitFetcher;
use crate::serializer::generate_serialized_data;
use crate::split_data::SplitData;
use crate::store::SplitDataSource;

// Undelivered errors beyond this are replaced by newer ones rather than queued.
const ERROR_CHANNEL_CAPACITY: usize = 1;

// How long a stop request waits on the loop before re-checking that it is still running.
const STOP_RETRY_INTERVAL: Duration = Duration::from_millis(50);

const WORKER_THREAD_NAME: &str = "split-poller";

/// Poller periodically fetches split and segment definitions and keeps the most recent complete
/// snapshot in memory.
///
/// Each polling cycle fetches splits, then (if configured) the segments those splits use, and only
/// when every fetch succeeded swaps in a new [SplitData]. A failed cycle leaves the previous
/// snapshot in place and reports the failure on the channel returned by [Poller::errors]; the loop
/// keeps running and simply tries again on the next tick.
///
/// Dropping the poller ends a running loop at its next check.
pub struct Poller {
    shared: Arc<PollerShared>,
    quit_tx: Sender<()>,
    stopped_rx: Receiver<()>,
    error_rx: Receiver<Error>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct PollerShared {
    config: PollerConfig,
    fetcher: Arc<dyn SplitFetcher>,
    cache: RwLock<Arc<SplitData>>,
    running: AtomicBool,
    quit_rx: Receiver<()>,
    // Signalled by the loop once it has cleared `running` after a stop request.
    stopped_tx: Sender<()>,
    error_tx: Sender<Error>,
    // Kept so a full error slot can be drained in favour of the newest error.
    error_rx: Receiver<Error>,
}

impl Poller {
    /// Create a poller for `key` that polls every `polling_rate_seconds`.
    ///
    /// A rate of zero or less selects [crate::DEFAULT_POLLING_RATE_SECONDS]. When
    /// `serialize_segments` is false, segments are never fetched and snapshots carry no segments.
    pub fn new(
        key: impl Into<String>,
        polling_rate_seconds: i64,
        serialize_segments: bool,
        fetcher: Arc<dyn SplitFetcher>,
    ) -> Self {
        let config = PollerConfigBuilder::new(key)
            .polling_interval(polling_interval_from_seconds(polling_rate_seconds))
            .serialize_segments(serialize_segments)
            .build();
        Self::with_config(config, fetcher)
    }

    pub fn with_config(config: PollerConfig, fetcher: Arc<dyn SplitFetcher>) -> Self {
        // A zero-capacity channel makes stop() a rendezvous with the loop between cycles.
        let (quit_tx, quit_rx) = bounded(0);
        let (stopped_tx, stopped_rx) = bounded(1);
        let (error_tx, error_rx) = bounded(ERROR_CHANNEL_CAPACITY);

        Poller {
            shared: Arc::new(PollerShared {
                config,
                fetcher,
                cache: RwLock::new(Arc::new(SplitData::default())),
                running: AtomicBool::new(false),
                quit_rx,
                stopped_tx,
                error_tx,
                error_rx: error_rx.clone(),
            }),
            quit_tx,
            stopped_rx,
            error_rx,
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.shared.config
    }

    /// Start polling on a background thread and return immediately.
    ///
    /// The first cycle runs one polling interval after the call. Starting a poller that is already
    /// running has no effect; starting one after [Poller::stop] resumes polling.
    pub fn start(&self) {
        if !self.shared.try_begin() {
            warn!(
                "split poller for key {} is already running; ignoring start",
                self.shared.config.key()
            );
            return;
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || shared.run_until_quit());

        match spawned {
            Ok(handle) => *self.worker.lock() = Some(handle),
            Err(e) => {
                error!("failed to spawn split poller thread: {}", e);
                self.shared.running.store(false, Ordering::Release);
            }
        }
    }

    /// Ask the polling loop to stop.
    ///
    /// A cycle already in flight is allowed to finish; once this returns no further cycle will
    /// start, the snapshot stops changing and [Poller::is_running] reads false, so the poller can
    /// be started again right away. Stopping an idle poller does nothing.
    pub fn stop(&self) {
        let mut requested = false;
        while self.shared.running.load(Ordering::Acquire) {
            match self.quit_tx.send_timeout((), STOP_RETRY_INTERVAL) {
                Ok(()) => {
                    requested = true;
                    break;
                }
                Err(SendTimeoutError::Disconnected(())) => break,
                Err(SendTimeoutError::Timeout(())) => continue,
            }
        }

        if requested {
            // The loop took the request; wait until it has released the running flag.
            let _ = self.stopped_rx.recv();
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                error!("split poller thread panicked");
            }
        }
    }

    /// Run the polling loop on the calling thread until [Poller::stop] is called.
    ///
    /// This is what [Poller::start] runs in the background; it is exposed for callers that manage
    /// their own threads. Returns immediately if the loop is already running elsewhere.
    pub fn run_jobs(&self) {
        if !self.shared.try_begin() {
            warn!(
                "split poller for key {} is already running; ignoring run_jobs",
                self.shared.config.key()
            );
            return;
        }
        self.shared.run_until_quit();
    }

    /// Run a single polling cycle on the calling thread.
    pub fn poll_for_changes(&self) {
        self.shared.poll_for_changes();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// The most recent complete snapshot, or the empty snapshot if no cycle has succeeded.
    pub fn split_data(&self) -> Arc<SplitData> {
        self.shared.split_data()
    }

    /// The current snapshot rendered by [crate::generate_serialized_data].
    pub fn serialized_data(&self) -> Result<String> {
        generate_serialized_data(&self.split_data())
    }

    /// Receiver for errors from failed polling cycles.
    ///
    /// The poller never waits for this channel to be drained. It holds a single undelivered error;
    /// if another cycle fails before that one is received, the older error is discarded in favour
    /// of the newer. Every failure is also logged.
    ///
    /// Received errors display as `failed to fetch splits: <cause>` (or segments). The fetcher's
    /// own error, with its message unchanged, is available from [Error::fetch_error].
    pub fn errors(&self) -> Receiver<Error> {
        self.error_rx.clone()
    }
}

impl SplitDataSource for Poller {
    fn split_data(&self) -> Arc<SplitData> {
        Poller::split_data(self)
    }
}

impl PollerShared {
    fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn run_until_quit(&self) {
        debug!(
            "split poller for key {} started, polling every {:?}",
            self.config.key(),
            self.config.polling_interval()
        );

        let ticker = tick(self.config.polling_interval());
        loop {
            let quit = select! {
                recv(self.quit_rx) -> _ => true,
                recv(ticker) -> _ => false,
            };
            // A stop request that raced with the tick still wins over starting another cycle.
            if quit || self.quit_rx.try_recv().is_ok() {
                break;
            }
            self.poll_for_changes();
        }

        self.running.store(false, Ordering::Release);
        let _ = self.stopped_tx.try_send(());
        debug!("split poller for key {} stopped", self.config.key());
    }

    fn split_data(&self) -> Arc<SplitData> {
        Arc::clone(&self.cache.read())
    }

    fn poll_for_changes(&self) {
        match self.fetch_split_data() {
            Ok(split_data) => {
                debug!(
                    "split poller fetched {} splits and {} segments (since {})",
                    split_data.splits.len(),
                    split_data.segments.len(),
                    split_data.since
                );
                *self.cache.write() = Arc::new(split_data);
            }
            Err(e) => {
                warn!("split poller cycle failed: {}", e);
                self.report_error(e);
            }
        }
    }

    fn fetch_split_data(&self) -> Result<SplitData> {
        let (splits, since) = self.fetcher.fetch_splits().map_err(Error::FetchSplits)?;

        if !self.config.serialize_segments() {
            return Ok(SplitData::new(splits, since, HashMap::new(), 0));
        }

        let (segments, using_segments_count) = self
            .fetcher
            .fetch_segments_for_splits(&splits)
            .map_err(Error::FetchSegments)?;

        Ok(SplitData::new(
            splits,
            since,
            segments,
            using_segments_count,
        ))
    }

    fn report_error(&self, e: Error) {
        let e = match self.error_tx.try_send(e) {
            Ok(()) => return,
            Err(TrySendError::Full(e)) => e,
            Err(TrySendError::Disconnected(_)) => return,
        };

        // Nobody has taken the previous error yet; replace it with the latest one.
        let _ = self.error_rx.try_recv();
        if let Err(TrySendError::Full(e)) = self.error_tx.try_send(e) {
            debug!("split poller dropped error: {}", e);
        }
    }
}
