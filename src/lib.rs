// Wakey Library - wake-and-poll orchestration for a remote machine
// This exposes the core components for testing and integration

pub mod config;
pub mod machines;
pub mod notifier;
pub mod orchestrator;
pub mod readiness;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{ConfigurationError, WakeyConfig};
pub use machines::{ControlPlaneError, MachineDescription, MachineState, MachinesApi, MachinesClient};
pub use notifier::{ConsoleNotifier, Notifier, NotifyError};
pub use orchestrator::{
    PollSettings, SessionRegistry, WakeOrchestrator, WakeOutcome, WakePhase, WakeRequest,
};
pub use readiness::{evaluate, Verdict, WaitReason};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::init_telemetry;
