use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request; only the most recent ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic request tagging. Responses carrying a ticket older than the latest
/// `begin()` are stale and must be dropped by the caller.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self { Self::default() }

    pub fn begin(&self) -> Ticket { Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1) }

    pub fn is_current(&self, ticket: Ticket) -> bool { self.latest.load(Ordering::Acquire) == ticket.0 }

    /// `Some(value)` when `ticket` is still current, otherwise `None`.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) { Some(value) } else { None }
    }
}
