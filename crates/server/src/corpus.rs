//! Lazily loaded, process-wide journal corpus.
//!
//! At most one ingestion pass runs at a time. The first `ensure_loaded()` or
//! `reload()` spawns it on the blocking pool and parks a [`Shared`] handle to it
//! in the service state; every caller arriving before it finishes awaits that
//! same handle, so concurrent requests never allocate a second store. The
//! blocking task publishes its own outcome: on success the snapshot becomes the
//! current corpus, on failure the previous snapshot (if any) stays and the next
//! caller starts over. Neither depends on a caller still awaiting the result.

use crate::api::metrics;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use scopematch_core::error::CoreError;
use scopematch_core::storage::{load_corpus, CorpusSource, IngestStats, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// A fully ingested corpus snapshot.
#[derive(Debug)]
pub struct LoadedCorpus {
    pub store: VectorStore,
    pub stats: IngestStats,
    pub source: CorpusSource,
}

pub type LoadResult = Result<Arc<LoadedCorpus>, Arc<CoreError>>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

struct InFlight {
    id: u64,
    future: LoadFuture,
}

#[derive(Default)]
struct LoadState {
    ready: Option<Arc<LoadedCorpus>>,
    in_flight: Option<InFlight>,
}

impl LoadState {
    /// Called by the load task itself once ingestion has finished.
    fn finish(&mut self, id: u64, result: &LoadResult) {
        if self.in_flight.as_ref().is_some_and(|f| f.id == id) {
            self.in_flight = None;
        }
        if let Ok(corpus) = result {
            self.ready = Some(corpus.clone());
        }
    }
}

/// Owns the corpus snapshot and the single in-flight load.
pub struct CorpusService {
    data_dir: PathBuf,
    dimension: usize,
    capacity: usize,
    state: Arc<Mutex<LoadState>>,
    next_load_id: AtomicU64,
    passes: Arc<AtomicUsize>,
}

impl CorpusService {
    pub fn new(data_dir: impl Into<PathBuf>, dimension: usize, capacity: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            dimension,
            capacity,
            state: Arc::new(Mutex::new(LoadState::default())),
            next_load_id: AtomicU64::new(0),
            passes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of ingestion passes started so far.
    pub fn load_passes(&self) -> usize {
        self.passes.load(Ordering::Relaxed)
    }

    /// The loaded corpus, if a load has completed successfully.
    pub fn current(&self) -> Option<Arc<LoadedCorpus>> {
        self.state.lock().ready.clone()
    }

    /// Returns `true` while an ingestion pass is running.
    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Returns the corpus, loading it on first use.
    pub async fn ensure_loaded(&self) -> LoadResult {
        let fut = {
            let mut state = self.state.lock();
            if let Some(corpus) = &state.ready {
                return Ok(corpus.clone());
            }
            self.join_or_start(&mut state)
        };
        fut.await
    }

    /// Re-reads the corpus and swaps it in on success.
    ///
    /// A reload requested while another pass is running joins that pass.
    /// Queries holding the previous snapshot finish on it. On failure the
    /// previous snapshot stays in place.
    pub async fn reload(&self) -> LoadResult {
        let fut = {
            let mut state = self.state.lock();
            self.join_or_start(&mut state)
        };
        fut.await
    }

    fn join_or_start(&self, state: &mut LoadState) -> LoadFuture {
        if let Some(in_flight) = &state.in_flight {
            return in_flight.future.clone();
        }
        let id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
        let future = self.start_load(id);
        state.in_flight = Some(InFlight {
            id,
            future: future.clone(),
        });
        future
    }

    /// Spawns one ingestion pass. Must be called with the state lock held so
    /// the pass is registered before it can finish.
    fn start_load(&self, id: u64) -> LoadFuture {
        let data_dir = self.data_dir.clone();
        let dimension = self.dimension;
        let capacity = self.capacity;
        let passes = self.passes.clone();
        let state = Arc::downgrade(&self.state);

        let handle = tokio::task::spawn_blocking({
            let state = state.clone();
            move || {
                passes.fetch_add(1, Ordering::Relaxed);
                let start = Instant::now();
                let result = load_corpus(&data_dir, dimension, capacity);
                let result = publish(result, start.elapsed());
                if let Some(state) = state.upgrade() {
                    state.lock().finish(id, &result);
                }
                result
            }
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Corpus load task failed: {}", e);
                    metrics::record_corpus_load_failure();
                    let result: LoadResult = Err(Arc::new(CoreError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("corpus load task failed: {}", e),
                    ))));
                    if let Some(state) = Weak::upgrade(&state) {
                        state.lock().finish(id, &result);
                    }
                    result
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn publish(
    result: scopematch_core::Result<(VectorStore, IngestStats, CorpusSource)>,
    elapsed: Duration,
) -> LoadResult {
    match result {
        Ok((store, stats, source)) => {
            metrics::record_corpus_load(&store, &stats, elapsed);
            tracing::info!(
                entries = store.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Corpus ready"
            );
            Ok(Arc::new(LoadedCorpus {
                store,
                stats,
                source,
            }))
        }
        Err(e) => {
            tracing::error!("Corpus load failed: {}", e);
            metrics::record_corpus_load_failure();
            Err(Arc::new(e))
        }
    }
}
