//! System-wide probe concurrency limit.
//!
//! # Responsibilities
//! - Hold a fixed number of execution slots shared by every target
//! - Hand out slots without waiting; refuse when none are free
//!
//! # Design Decisions
//! - Backed by a Tokio semaphore; a slot is an owned permit
//! - Release happens on drop, so a panicking probe still frees its slot
//! - No fairness: whichever task asks first after a release gets the slot

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-capacity pool of probe slots.
#[derive(Debug, Clone)]
pub struct SlotPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl SlotPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Take a slot if one is free. Never waits.
    pub fn try_acquire(&self) -> Option<Slot> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| Slot { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held by running probes.
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }
}

/// A held slot. Dropping it returns the slot to the pool.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}
