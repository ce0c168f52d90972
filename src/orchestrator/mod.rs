//! Wake orchestration: the session state machine, the in-flight registry,
//! and the patience commentary it posts during long waits.

pub mod registry;
pub mod remarks;
pub mod session;

pub use registry::{SessionClaim, SessionRegistry};
pub use remarks::{pick_patience_remark, PATIENCE_REMARKS};
pub use session::{
    PollSettings, WakeOrchestrator, WakeOutcome, WakePhase, WakeRequest, WakeSession,
    PATIENCE_POLL,
};
