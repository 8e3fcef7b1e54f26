//! Single-operation gate marking the span of one outstanding remote call.

use crate::error::{ControlError, Result};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Capacity-1 semaphore. Holding the permit means an operation is pending.
///
/// Acquisition never waits: a second operation is rejected with
/// [`ControlError::Busy`] rather than queued.
pub struct BusyGate {
    permits: Semaphore,
}

/// Proof that the holder owns the busy span. Dropping it ends the span.
pub struct BusyPermit<'a> {
    _permit: SemaphorePermit<'a>,
}

impl BusyGate {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(1),
        }
    }

    /// Enter the busy span, or fail if another operation holds it.
    pub fn try_enter(&self) -> Result<BusyPermit<'_>> {
        self.permits
            .try_acquire()
            .map(|permit| BusyPermit { _permit: permit })
            .map_err(|_| ControlError::Busy)
    }

    pub fn is_busy(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

impl Default for BusyGate {
    fn default() -> Self {
        Self::new()
    }
}
