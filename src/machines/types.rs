//! Wire types for the Machines control-plane API.
//!
//! A `MachineDescription` is a snapshot: deserialized fresh on every poll and
//! never mutated. Fields the bot does not interpret (`events`, most of
//! `config`) are still carried so the full response round-trips.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Lifecycle state reported by the control plane.
///
/// Only `Started` matters to the wake workflow; everything else means the
/// machine is not ready yet (or never will be, in the case of `Destroyed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Created,
    Starting,
    Started,
    Stopping,
    Stopped,
    Destroyed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MachineState::Created => "created",
            MachineState::Starting => "starting",
            MachineState::Started => "started",
            MachineState::Stopping => "stopping",
            MachineState::Stopped => "stopped",
            MachineState::Destroyed => "destroyed",
            MachineState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Status of a single reported health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passing,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckStatus::Passing => "passing",
            CheckStatus::Warning => "warning",
            CheckStatus::Critical => "critical",
            CheckStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One reported health-check result.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(default)]
    pub output: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A health-check definition configured on a service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckSpec {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub grace_period: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortSpec {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub handlers: Vec<String>,
}

/// A service entry from the machine config. The bot only cares whether any
/// service carries check definitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub internal_port: Option<u16>,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

/// A machine event. Carried through deserialization but not interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timestamp: i64,
}

/// Snapshot of a machine as described by the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineDescription {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub state: MachineState,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub config: MachineConfig,
    #[serde(default)]
    pub events: Vec<MachineEvent>,
}

impl MachineDescription {
    /// True iff any configured service declares at least one health check.
    ///
    /// Distinct from `checks` being non-empty: configured checks are the
    /// gate, reported checks are the gate's evaluations.
    pub fn has_configured_checks(&self) -> bool {
        self.config
            .services
            .iter()
            .any(|service| !service.checks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_description() {
        let json = r#"{
            "id": "d89023",
            "name": "game-server",
            "state": "started",
            "checks": [
                {"name": "tcp-25565", "output": "connect ok", "status": "passing", "updated_at": "2024-05-01T12:00:00Z"}
            ],
            "config": {
                "services": [
                    {
                        "protocol": "tcp",
                        "internal_port": 25565,
                        "ports": [{"port": 25565, "handlers": []}],
                        "checks": [{"type": "tcp", "interval": "15s", "timeout": "2s", "grace_period": "30s"}]
                    }
                ]
            },
            "events": [
                {"id": "e1", "type": "start", "status": "ok", "source": "user", "timestamp": 1714564800}
            ]
        }"#;
        let machine: MachineDescription = serde_json::from_str(json).unwrap();
        assert_eq!(machine.id, "d89023");
        assert_eq!(machine.state, MachineState::Started);
        assert!(machine.has_configured_checks());
        assert_eq!(machine.checks.len(), 1);
        assert_eq!(machine.checks[0].status, CheckStatus::Passing);
        assert_eq!(machine.events.len(), 1);
    }

    #[test]
    fn test_deserialize_minimal_description() {
        // The control plane omits checks/config/events for bare machines.
        let machine: MachineDescription =
            serde_json::from_str(r#"{"id": "m1", "state": "stopped"}"#).unwrap();
        assert_eq!(machine.state, MachineState::Stopped);
        assert!(machine.checks.is_empty());
        assert!(!machine.has_configured_checks());
    }

    #[test]
    fn test_unrecognized_state_maps_to_unknown() {
        let machine: MachineDescription =
            serde_json::from_str(r#"{"id": "m1", "state": "replacing"}"#).unwrap();
        assert_eq!(machine.state, MachineState::Unknown);
    }

    #[test]
    fn test_unrecognized_check_status_maps_to_unknown() {
        let json = r#"{
            "id": "m1",
            "state": "started",
            "checks": [{"name": "web", "status": "flaky"}]
        }"#;
        let machine: MachineDescription = serde_json::from_str(json).unwrap();
        assert_eq!(machine.checks[0].status, CheckStatus::Unknown);
    }

    #[test]
    fn test_service_without_checks_is_not_a_gate() {
        let json = r#"{
            "id": "m1",
            "state": "started",
            "config": {"services": [{"protocol": "tcp", "internal_port": 80}]}
        }"#;
        let machine: MachineDescription = serde_json::from_str(json).unwrap();
        assert!(!machine.has_configured_checks());
    }
}
