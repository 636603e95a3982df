//! Debounced job search.
//!
//! Every query change restarts a [`DEBOUNCE`] timer. When it fires, a fetch is
//! spawned with the next sequence number; only the response carrying the
//! latest issued number is applied, so a slow answer to an older query can
//! never overwrite fresher results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::source::{JobSource, JobSourceError};
use super::window::{self, INITIAL_VISIBLE, LOAD_MORE_STEP};
use crate::models::JobListing;

pub const DEBOUNCE: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Debouncing,
    Loading,
    Ready,
    Failed(String),
}

struct SearchState {
    results: Vec<JobListing>,
    visible_count: usize,
    status: SearchStatus,
    before_debounce: Option<SearchStatus>,
}

struct Shared {
    state: Mutex<SearchState>,
    latest_seq: AtomicU64,
    closed: AtomicBool,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn set_status(&self, status: SearchStatus) {
        self.lock().status = status;
        self.notify();
    }

    fn begin_debounce(&self) {
        {
            let mut guard = self.lock();
            let state = &mut *guard;
            if state.status != SearchStatus::Debouncing {
                let previous = std::mem::replace(&mut state.status, SearchStatus::Debouncing);
                state.before_debounce = Some(previous);
            }
        }
        self.notify();
    }

    /// Puts back the status from before a debounce that will never fire.
    fn cancel_debounce(&self) {
        let restored = {
            let mut state = self.lock();
            if state.status == SearchStatus::Debouncing {
                let previous = state.before_debounce.take().unwrap_or(SearchStatus::Idle);
                state.status = previous;
                true
            } else {
                false
            }
        };
        if restored {
            self.notify();
        }
    }

    fn complete(&self, seq: u64, query: &str, result: Result<Vec<JobListing>, JobSourceError>) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        if seq != self.latest_seq.load(Ordering::SeqCst) {
            debug!("Discarding stale results for {query:?} (request {seq})");
            return;
        }

        {
            let mut state = self.lock();
            match result {
                Ok(mut results) => {
                    window::sort_newest_first(&mut results);
                    info!("Job search for {query:?} returned {} listings", results.len());
                    state.results = results;
                    state.visible_count = INITIAL_VISIBLE;
                    state.status = SearchStatus::Ready;
                }
                Err(e) => {
                    warn!("Job search for {query:?} failed: {e}");
                    state.status = SearchStatus::Failed(e.to_string());
                }
            }
        }
        self.notify();
    }
}

/// Owns the query, the pending debounce timer and the current result set.
///
/// Must be used inside a Tokio runtime. Dropping it cancels a pending timer,
/// and late responses are ignored once it is shut down.
pub struct JobSearch {
    source: Arc<dyn JobSource>,
    shared: Arc<Shared>,
    query: String,
    timer: Option<JoinHandle<()>>,
}

impl JobSearch {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            source,
            shared: Arc::new(Shared {
                state: Mutex::new(SearchState {
                    results: Vec::new(),
                    visible_count: INITIAL_VISIBLE,
                    status: SearchStatus::Idle,
                    before_debounce: None,
                }),
                latest_seq: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                revision,
            }),
            query: String::new(),
            timer: None,
        }
    }

    /// Records the new query and restarts the debounce timer. Blank queries
    /// cancel the pending timer but never fetch or clear results.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.cancel_timer();

        if self.shared.closed.load(Ordering::SeqCst) {
            return;
        }
        if query.trim().is_empty() {
            self.shared.cancel_debounce();
            return;
        }

        self.shared.begin_debounce();
        let shared = self.shared.clone();
        let source = self.source.clone();
        let query = self.query.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            let seq = shared.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Issuing job search {seq} for {query:?}");
            shared.set_status(SearchStatus::Loading);

            // Detached: a later keystroke aborts the timer, not the request.
            tokio::spawn(async move {
                let result = source.search(&query).await;
                shared.complete(seq, &query, result);
            });
        }));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Widens the visible window by one step. Returns `false` when everything
    /// is already shown.
    pub fn load_more(&self) -> bool {
        let grew = {
            let mut state = self.shared.lock();
            if window::has_more(state.results.len(), state.visible_count) {
                state.visible_count += LOAD_MORE_STEP;
                true
            } else {
                false
            }
        };
        if grew {
            self.shared.notify();
        }
        grew
    }

    pub fn visible(&self) -> Vec<JobListing> {
        let state = self.shared.lock();
        window::visible_slice(&state.results, state.visible_count).to_vec()
    }

    pub fn results(&self) -> Vec<JobListing> {
        self.shared.lock().results.clone()
    }

    pub fn visible_count(&self) -> usize {
        self.shared.lock().visible_count
    }

    pub fn has_more(&self) -> bool {
        let state = self.shared.lock();
        window::has_more(state.results.len(), state.visible_count)
    }

    pub fn status(&self) -> SearchStatus {
        self.shared.lock().status.clone()
    }

    /// Revision counter bumped after every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Cancels the pending timer and ignores any response still in flight.
    pub fn shutdown(&mut self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.cancel_timer();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for JobSearch {
    fn drop(&mut self) {
        self.shutdown();
    }
}
