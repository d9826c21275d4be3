//! Frame Admission Gate
//!
//! Single-flight guard cho inference: tối đa một frame được xử lý tại một
//! thời điểm, frame đến sau bị drop (không queue).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// GATE
// ============================================================================

/// Owned in-flight flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct AdmissionGate {
    in_flight: Arc<AtomicBool>,
}

impl AdmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking check-and-set.
    ///
    /// Returns `true` when the caller now owns the slot and must submit the
    /// frame, then call [`release`](Self::release) exactly once. Returns
    /// `false` (and changes nothing) while another frame is in flight.
    pub fn try_admit(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clear the in-flight flag.
    pub fn release(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Scoped admission: the returned permit releases the gate on drop.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        if self.try_admit() {
            Some(AdmissionPermit { gate: self.clone() })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

// ============================================================================
// PERMIT
// ============================================================================

/// Proof of admission. Dropping it (normal return, `?`, or unwind) releases
/// the gate exactly once.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the gate"]
pub struct AdmissionPermit {
    gate: AdmissionGate,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
