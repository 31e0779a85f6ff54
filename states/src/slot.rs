//! A single cached query result.
//!
//! Every slot tracks two counters:
//! - `epoch` is bumped by [`QuerySlot::invalidate`]. A request remembers the
//!   epoch it started in and its result is dropped if the epoch moved on in
//!   the meantime, so nothing fetched before an invalidation can land after it.
//! - `seq` numbers requests. Results are applied only if they are newer than
//!   the last applied one.
//!
//! Concurrent fetches within the same epoch share one request: the first
//! caller drives it, everyone else awaits the same result.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio::sync::{OnceCell, watch};

use crate::Freshness;

type SharedResult<T, E> = Arc<OnceCell<Result<Arc<T>, E>>>;

struct InFlight<T, E> {
    epoch: u64,
    seq: u64,
    cell: SharedResult<T, E>,
}

struct Ticket<T, E> {
    epoch: u64,
    seq: u64,
    cell: SharedResult<T, E>,
    joined: bool,
}

/// The state behind a slot, as seen by subscribers.
pub struct SlotState<T, E> {
    data: Option<Arc<T>>,
    freshness: Freshness,
    last_error: Option<E>,
    epoch: u64,
    next_seq: u64,
    applied_seq: u64,
    in_flight: Option<InFlight<T, E>>,
}

impl<T, E> Default for SlotState<T, E> {
    fn default() -> Self {
        Self {
            data: None,
            freshness: Freshness::Init,
            last_error: None,
            epoch: 0,
            next_seq: 0,
            applied_seq: 0,
            in_flight: None,
        }
    }
}

impl<T, E: Clone> SlotState<T, E> {
    pub fn data(&self) -> Option<&Arc<T>> {
        self.data.as_ref()
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn last_error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    fn snapshot(&self) -> Snapshot<T, E> {
        Snapshot {
            data: self.data.clone(),
            freshness: self.freshness,
            error: self.last_error.clone(),
        }
    }
}

/// An owned, point-in-time copy of a slot. Cheap: the data is shared.
pub struct Snapshot<T, E> {
    pub data: Option<Arc<T>>,
    pub freshness: Freshness,
    pub error: Option<E>,
}

impl<T, E: Clone> Clone for Snapshot<T, E> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            freshness: self.freshness,
            error: self.error.clone(),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Snapshot<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("data", &self.data)
            .field("freshness", &self.freshness)
            .field("error", &self.error)
            .finish()
    }
}

/// One named cache entry. See the module docs for the ordering rules.
pub struct QuerySlot<T, E> {
    name: &'static str,
    state: watch::Sender<SlotState<T, E>>,
}

impl<T, E> fmt::Debug for QuerySlot<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySlot")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T, E> QuerySlot<T, E>
where
    T: Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    /// An empty slot in [`Freshness::Init`] at epoch 0. `name` only shows up
    /// in logs and `Debug` output.
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(SlotState::default());
        Self { name, state }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current data, freshness and error, copied out.
    pub fn snapshot(&self) -> Snapshot<T, E> {
        self.state.borrow().snapshot()
    }

    /// The current data, if any.
    pub fn data(&self) -> Option<Arc<T>> {
        self.state.borrow().data.clone()
    }

    pub fn freshness(&self) -> Freshness {
        self.state.borrow().freshness
    }

    /// Number of invalidations so far.
    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    pub fn is_fetching(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    /// Receives a notification whenever visible state (data, freshness or
    /// error) changes. Bookkeeping-only changes do not wake subscribers.
    pub fn subscribe(&self) -> watch::Receiver<SlotState<T, E>> {
        self.state.subscribe()
    }

    /// Marks the slot dirty and starts a new epoch. Requests already in flight
    /// keep running but their results will be discarded.
    ///
    /// Returns the new epoch.
    pub fn invalidate(&self) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|s| {
            s.epoch += 1;
            s.freshness = Freshness::Dirty;
            epoch = s.epoch;
        });
        debug!("{}: invalidated, now at epoch {epoch}", self.name);
        epoch
    }

    /// Returns the cached data when it is clean, otherwise fetches.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        {
            let state = self.state.borrow();
            if let (Freshness::Clean, Some(data)) = (state.freshness, state.data.as_ref()) {
                return Ok(Arc::clone(data));
            }
        }
        self.fetch_with(fetch).await
    }

    /// Fetches through `fetch`, or joins the request already in flight for
    /// the current epoch.
    ///
    /// The returned value is what this caller's request produced, even if it
    /// was too old to be applied to the slot.
    pub async fn fetch_with<F, Fut>(&self, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin();
        if ticket.joined {
            debug!(
                "{}: joining in-flight request #{} (epoch {})",
                self.name, ticket.seq, ticket.epoch
            );
        } else {
            debug!(
                "{}: starting request #{} (epoch {})",
                self.name, ticket.seq, ticket.epoch
            );
        }

        let result = ticket
            .cell
            .get_or_init(|| async move { fetch().await.map(Arc::new) })
            .await
            .clone();

        self.settle(&ticket, &result);
        result
    }

    fn begin(&self) -> Ticket<T, E> {
        let mut ticket = Ticket {
            epoch: 0,
            seq: 0,
            cell: Arc::new(OnceCell::new()),
            joined: false,
        };

        self.state.send_if_modified(|s| {
            if let Some(in_flight) = s.in_flight.as_ref().filter(|f| f.epoch == s.epoch) {
                ticket.epoch = in_flight.epoch;
                ticket.seq = in_flight.seq;
                ticket.cell = Arc::clone(&in_flight.cell);
                ticket.joined = true;
                return false;
            }

            s.next_seq += 1;
            ticket.epoch = s.epoch;
            ticket.seq = s.next_seq;
            s.in_flight = Some(InFlight {
                epoch: ticket.epoch,
                seq: ticket.seq,
                cell: Arc::clone(&ticket.cell),
            });
            let changed = s.freshness != Freshness::Pending;
            s.freshness = Freshness::Pending;
            changed
        });

        ticket
    }

    fn settle(&self, ticket: &Ticket<T, E>, result: &Result<Arc<T>, E>) {
        let name = self.name;
        self.state.send_if_modified(|s| {
            if s.in_flight.as_ref().is_some_and(|f| f.seq == ticket.seq) {
                s.in_flight = None;
            }

            if ticket.epoch != s.epoch {
                debug!(
                    "{name}: dropping result of request #{} from epoch {} (now {})",
                    ticket.seq, ticket.epoch, s.epoch
                );
                return false;
            }
            if ticket.seq <= s.applied_seq {
                return false;
            }

            s.applied_seq = ticket.seq;
            match result {
                Ok(data) => {
                    s.data = Some(Arc::clone(data));
                    s.last_error = None;
                    s.freshness = Freshness::Clean;
                }
                Err(err) => {
                    debug!("{name}: request #{} failed: {err}", ticket.seq);
                    s.last_error = Some(err.clone());
                    s.freshness = if s.data.is_some() {
                        Freshness::Dirty
                    } else {
                        Freshness::Failed
                    };
                }
            }
            true
        });
    }
}
