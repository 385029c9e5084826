//! Guards against applying async results to a view that moved on.
//!
//! Each fetch takes a [`Ticket`] before awaiting storage. When the result
//! arrives it is applied only if the view is still open and no newer fetch
//! has started since.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Generation number handed to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A view that has not been opened yet.
    pub fn closed() -> Self {
        let liveness = Self::new();
        liveness.kill();
        liveness
    }

    /// Start a fetch, superseding any fetch still in flight.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether a result fetched under `ticket` may still be applied.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.is_alive() && self.generation.load(Ordering::Acquire) == ticket.0
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the view closed; every outstanding ticket is rejected.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Reopen the view. Tickets taken before the close stay rejected.
    pub fn revive(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.alive.store(true, Ordering::Release);
    }
}
