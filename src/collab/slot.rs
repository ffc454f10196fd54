//! Latest-request-wins result slots
//!
//! Each request takes a [`Ticket`] from the slot. Starting a new request
//! invalidates every older ticket, so a slow response for stale input can
//! never overwrite the answer to newer input.

use std::sync::{Mutex, MutexGuard};

/// Proof of which request a result answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug)]
struct SlotState<T> {
    generation: u64,
    value: Option<T>,
}

/// A value produced by the most recent of possibly overlapping requests
#[derive(Debug)]
pub struct ResultSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                generation: 0,
                value: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a request, superseding any in flight
    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        state.generation += 1;
        Ticket {
            generation: state.generation,
        }
    }

    /// Store a result; returns false (and drops it) if the ticket is stale
    pub fn fulfill(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = state.generation,
                "discarding stale result"
            );
            return false;
        }
        state.value = Some(value);
        true
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().generation == ticket.generation
    }

    /// Drop the value and invalidate outstanding tickets
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.value = None;
    }
}

impl<T: Clone> ResultSlot<T> {
    pub fn get(&self) -> Option<T> {
        self.lock().value.clone()
    }
}
