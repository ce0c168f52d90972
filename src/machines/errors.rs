use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the machine control-plane client.
///
/// The orchestrator decides severity by phase: any of these is fatal during
/// the start call, and transient during polling.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Network-level failure reaching the control plane (includes timeouts).
    #[error("control plane request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// Non-success response. The raw body is kept so an operator can see
    /// what the control plane actually said.
    #[error("control plane returned status {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The response claimed success but the body was not a machine description.
    #[error("failed to decode machine description: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}
