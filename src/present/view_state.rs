use parking_lot::Mutex;
use tracing::debug;

use crate::error::PortalError;

use super::sequence::{RequestSequencer, Ticket};

/// Text shown in place of an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyNotice {
    pub title: String,
    pub detail: String,
}

impl EmptyNotice {
    pub fn new<T: Into<String>, D: Into<String>>(title: T, detail: D) -> Self {
        Self { title: title.into(), detail: detail.into() }
    }
}

/// Render state of a fetched list. An empty result is its own state, never `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<T> {
    Loading,
    Failed(String),
    Empty(EmptyNotice),
    Ready(T),
}

impl<T> ListView<T> {
    pub fn failed(err: &PortalError) -> Self { ListView::Failed(err.message().to_string()) }

    pub fn is_loading(&self) -> bool { matches!(self, ListView::Loading) }

    pub fn ready(&self) -> Option<&T> {
        match self { ListView::Ready(v) => Some(v), _ => None }
    }
}

impl<T> Default for ListView<T> {
    fn default() -> Self { ListView::Loading }
}

/// Holds one view's render state and discards responses that a newer fetch has
/// superseded.
pub struct ViewCell<T> {
    seq: RequestSequencer,
    state: Mutex<ListView<T>>,
}

impl<T: Clone> ViewCell<T> {
    pub fn new() -> Self { Self { seq: RequestSequencer::new(), state: Mutex::new(ListView::Loading) } }

    /// Start a fetch: the state becomes `Loading` and the returned ticket is current.
    pub fn begin(&self) -> Ticket {
        let t = self.seq.begin();
        *self.state.lock() = ListView::Loading;
        t
    }

    /// Apply a finished fetch. Returns false (and leaves the state alone) when stale.
    pub fn finish(&self, ticket: Ticket, next: ListView<T>) -> bool {
        let mut st = self.state.lock();
        if !self.seq.is_current(ticket) {
            debug!(target: "campus_portal::view", "dropping stale response {:?}", ticket);
            return false;
        }
        *st = next;
        true
    }

    /// Replace the state without a fetch (local re-filtering).
    pub fn set(&self, next: ListView<T>) { *self.state.lock() = next; }

    pub fn snapshot(&self) -> ListView<T> { self.state.lock().clone() }
}

impl<T: Clone> Default for ViewCell<T> {
    fn default() -> Self { Self::new() }
}
