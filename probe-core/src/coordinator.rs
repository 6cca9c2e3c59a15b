use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::QueryError;
use crate::fetcher::ReadingsFetcher;
use crate::model::{QueryKey, RawReadings, Readings};
use crate::normalize::normalize;
use crate::slots::{TimeSlot, default_slot};

/// Where the current query stands. `Idle` holds only until the first
/// intent; afterwards the machine cycles `Loading` to a terminal phase and
/// back to `Loading` on supersession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Snapshot of coordinator state, as observed by a presentation surface.
///
/// `result` is present exactly when `phase == Succeeded`, `error` exactly
/// when `phase == Failed`. `generation` counts issued intents and is the
/// sole arbiter of which fetch outcome is "latest".
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub selected_key: Option<QueryKey>,
    pub phase: Phase,
    pub result: Option<Readings>,
    pub error: Option<QueryError>,
    pub generation: u64,
}

impl QueryState {
    fn initial() -> Self {
        Self { selected_key: None, phase: Phase::Idle, result: None, error: None, generation: 0 }
    }
}

/// Latest-wins query coordinator.
///
/// Every user intent consumes one generation. Only the outcome tagged with
/// the current generation may mutate observable state, whatever order the
/// underlying network calls complete in; a superseded fetch is asked to
/// cancel, but correctness never depends on the transport actually
/// stopping. Cloning yields another handle to the same coordinator, and
/// independent coordinators never share state.
///
/// `submit` and `change_time_slot` spawn the fetch onto the ambient tokio
/// runtime; none of the public operations block.
#[derive(Debug, Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    fetcher: Arc<dyn ReadingsFetcher>,
    state: watch::Sender<QueryState>,
    issue: Mutex<IssueState>,
}

/// Issue-side bookkeeping. Touched only under the mutex, never across an
/// await point.
#[derive(Debug)]
struct IssueState {
    /// Raw coordinates of the last valid click; re-queried on slot change.
    last_point: Option<(f64, f64)>,
    pending_slot: TimeSlot,
    in_flight: Option<CancellationToken>,
}

impl Coordinator {
    pub fn new(fetcher: Arc<dyn ReadingsFetcher>) -> Self {
        let (state, _) = watch::channel(QueryState::initial());
        Self {
            shared: Arc::new(Shared {
                fetcher,
                state,
                issue: Mutex::new(IssueState {
                    last_point: None,
                    pending_slot: default_slot(),
                    in_flight: None,
                }),
            }),
        }
    }

    /// Issue a query for a clicked point at the given slot.
    ///
    /// An in-flight query is superseded first. Out-of-range coordinates
    /// fail the query locally without any fetch.
    pub fn submit(&self, raw_lat: f64, raw_lng: f64, slot: TimeSlot) {
        let mut issue = self.shared.issue.lock().expect("issue state poisoned");
        issue.pending_slot = slot;

        match normalize(raw_lat, raw_lng, slot) {
            Ok(key) => {
                issue.last_point = Some((raw_lat, raw_lng));
                self.launch(&mut issue, key);
            }
            Err(err) => {
                // A rejected intent still consumes a generation and
                // supersedes the in-flight fetch: a stale response must
                // not be able to overwrite this failure.
                cancel_in_flight(&mut issue);
                self.shared.state.send_modify(|state| {
                    state.generation += 1;
                    state.phase = Phase::Failed;
                    state.result = None;
                    state.error = Some(err);
                });
                debug!(raw_lat, raw_lng, "rejected out-of-range coordinates");
            }
        }
    }

    /// Change the selected time slot.
    ///
    /// Re-queries the last-clicked point under the new slot; before any
    /// click it only records the slot and stays `Idle`.
    pub fn change_time_slot(&self, slot: TimeSlot) {
        let mut issue = self.shared.issue.lock().expect("issue state poisoned");
        issue.pending_slot = slot;

        let Some((lat, lng)) = issue.last_point else {
            debug!(slot = %slot, "slot changed with no location selected");
            return;
        };

        // The stored point already passed validation; the slot has no
        // bearing on coordinate validity.
        match normalize(lat, lng, slot) {
            Ok(key) => self.launch(&mut issue, key),
            Err(err) => {
                debug_assert!(false, "stored point failed re-normalization: {err}");
                error!(lat, lng, %err, "stored point failed re-normalization");
            }
        }
    }

    /// Read-only snapshot of the current state.
    pub fn current_state(&self) -> QueryState {
        self.shared.state.borrow().clone()
    }

    /// Change stream for a presentation surface. The receiver also yields
    /// the current value on first read.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.shared.state.subscribe()
    }

    /// Slot that the next click will query with.
    pub fn pending_slot(&self) -> TimeSlot {
        self.shared.issue.lock().expect("issue state poisoned").pending_slot
    }

    fn launch(&self, issue: &mut IssueState, key: QueryKey) {
        cancel_in_flight(issue);

        let cancel = CancellationToken::new();
        issue.in_flight = Some(cancel.clone());

        let mut generation = 0;
        self.shared.state.send_modify(|state| {
            state.generation += 1;
            state.phase = Phase::Loading;
            state.selected_key = Some(key);
            state.result = None;
            state.error = None;
            generation = state.generation;
        });
        debug!(key = %key, generation, "issuing query");

        let this = self.clone();
        tokio::spawn(async move {
            let outcome = this.shared.fetcher.fetch(&key, cancel).await;
            this.apply(generation, outcome);
        });
    }

    /// Apply a fetch outcome tagged with the generation it was issued
    /// under. Outcomes from any other generation are discarded untouched,
    /// as are cancellation acknowledgements: the superseding intent has
    /// already moved state forward.
    fn apply(&self, generation: u64, outcome: Result<RawReadings, QueryError>) {
        let mut issue = self.shared.issue.lock().expect("issue state poisoned");

        let changed = self.shared.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            match outcome {
                Ok(raw) => {
                    state.phase = Phase::Succeeded;
                    state.result = Some(raw.into_readings());
                    state.error = None;
                }
                Err(QueryError::Cancelled) => return false,
                Err(err) => {
                    state.phase = Phase::Failed;
                    state.result = None;
                    state.error = Some(err);
                }
            }
            true
        });

        if changed {
            issue.in_flight = None;
            debug!(generation, "query settled");
        } else {
            debug!(generation, "discarded stale outcome");
        }
    }
}

fn cancel_in_flight(issue: &mut IssueState) {
    if let Some(token) = issue.in_flight.take() {
        debug!("superseding in-flight query");
        token.cancel();
    }
}
