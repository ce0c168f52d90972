//! HTTP client for the Machines control-plane API.
//!
//! The client is deliberately retry-free: it makes exactly one request per
//! call and reports what happened. Retry policy belongs to the orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use super::errors::ControlPlaneError;
use super::types::MachineDescription;

/// Starting a stopped machine can take a while server-side.
const START_TIMEOUT: Duration = Duration::from_secs(30);
/// Reads should come back fast; a slow describe is treated as a failure
/// and the orchestrator polls again.
const DESCRIBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Control-plane operations the orchestrator depends on.
///
/// The trait exists so orchestration logic can be exercised against scripted
/// fakes without a network.
#[async_trait]
pub trait MachinesApi: Send + Sync {
    /// Request that the target machine be started. Fire-and-forget: success
    /// means the control plane accepted the request, not that the machine
    /// is ready.
    async fn start(&self) -> Result<(), ControlPlaneError>;

    /// Fetch the current description of the target machine.
    async fn describe(&self) -> Result<MachineDescription, ControlPlaneError>;
}

/// Concrete client addressing one machine of one app.
#[derive(Debug, Clone)]
pub struct MachinesClient {
    http: reqwest::Client,
    api_base: String,
    api_token: String,
    app_name: String,
    machine_id: String,
}

impl MachinesClient {
    pub fn new(
        api_base: String,
        api_token: String,
        app_name: String,
        machine_id: String,
    ) -> Result<Self, ControlPlaneError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_token,
            app_name,
            machine_id,
        })
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    fn machine_url(&self) -> String {
        format!(
            "{}/apps/{}/machines/{}",
            self.api_base, self.app_name, self.machine_id
        )
    }
}

#[async_trait]
impl MachinesApi for MachinesClient {
    async fn start(&self) -> Result<(), ControlPlaneError> {
        let url = format!("{}/start", self.machine_url());
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(START_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlPlaneError::Api { status, body });
        }

        tracing::info!(machine_id = %self.machine_id, "machine start accepted");
        Ok(())
    }

    async fn describe(&self) -> Result<MachineDescription, ControlPlaneError> {
        let response = self
            .http
            .get(self.machine_url())
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(DESCRIBE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlPlaneError::Api { status, body });
        }

        // Read the body as text first so malformed JSON surfaces as a
        // decode error rather than a generic transport error.
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ControlPlaneError::Decode { source })
    }
}
