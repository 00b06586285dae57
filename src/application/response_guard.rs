// Stale-response guard - Drops fetch results that arrive out of turn
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Issued before a fetch, presented when its response arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct GuardState {
    next: u64,
    /// Tickets below this were issued before the last invalidation
    floor: u64,
    applied: Option<u64>,
}

/// Accepts a response only if it is newer than every response applied so
/// far and was requested after the view last changed.
#[derive(Debug, Default)]
pub struct ResponseGuard {
    state: Mutex<GuardState>,
}

impl ResponseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let mut state = self.lock();
        let ticket = Ticket(state.next);
        state.next += 1;
        ticket
    }

    /// Claim the right to apply a response. Returns false for stale tickets.
    pub fn accept(&self, ticket: Ticket) -> bool {
        let mut state = self.lock();
        if ticket.0 < state.floor || state.applied.is_some_and(|applied| ticket.0 <= applied) {
            return false;
        }
        state.applied = Some(ticket.0);
        true
    }

    /// The consuming view went away or changed; reject everything in flight
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.floor = state.next;
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
