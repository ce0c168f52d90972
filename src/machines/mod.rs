//! Machine control-plane integration: wire types, typed errors, and the
//! HTTP client behind the `MachinesApi` trait.

pub mod client;
pub mod errors;
pub mod types;

pub use client::{MachinesApi, MachinesClient};
pub use errors::ControlPlaneError;
pub use types::{
    CheckResult, CheckSpec, CheckStatus, MachineConfig, MachineDescription, MachineEvent,
    MachineState, PortSpec, ServiceSpec,
};
