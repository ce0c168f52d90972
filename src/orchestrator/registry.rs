//! Keyed registry of in-flight wake sessions.
//!
//! One machine gets at most one concurrent session; a second trigger for the
//! same target is rejected instead of racing a duplicate poll loop against
//! the control plane.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct SessionRegistry {
    in_flight: Mutex<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the target for a new session. Returns `None` when a session for
    /// this machine is already running. The claim releases on drop, so a
    /// session that panics or is cancelled still frees its slot.
    pub fn claim(self: &Arc<Self>, machine_id: &str) -> Option<SessionClaim> {
        // A poisoned lock still holds a usable set; recover it.
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(machine_id.to_string()) {
            return None;
        }
        Some(SessionClaim {
            registry: Arc::clone(self),
            machine_id: machine_id.to_string(),
        })
    }
}

/// RAII claim on one machine id.
#[derive(Debug)]
pub struct SessionClaim {
    registry: Arc<SessionRegistry>,
    machine_id: String,
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        let mut in_flight = self
            .registry
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.machine_id);
    }
}
