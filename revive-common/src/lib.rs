use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod operation;

pub use error::ComputeError;
pub use operation::{Operation, OperationError, OperationErrorItem, OperationStatus};

// --- Entities ---

/// Identifies one Compute Engine instance. Values are passed through to the API as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub project_id: String,
    pub zone: String,
    pub instance_name: String,
}

impl InstanceRef {
    pub fn new(
        project_id: impl Into<String>,
        zone: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            zone: zone.into(),
            instance_name: instance_name.into(),
        }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/zones/{}/instances/{}",
            self.project_id, self.zone, self.instance_name
        )
    }
}

// --- Enums ---

/// Instance lifecycle status as reported by Compute Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Suspending,
    Suspended,
    Repairing,
    Terminated, // Fully stopped, eligible for restart
    Unknown(String),
}

impl InstanceStatus {
    /// Exact, case-sensitive match on the API value. Anything unrecognised is kept verbatim.
    pub fn parse(s: &str) -> Self {
        match s {
            "PROVISIONING" => InstanceStatus::Provisioning,
            "STAGING" => InstanceStatus::Staging,
            "RUNNING" => InstanceStatus::Running,
            "STOPPING" => InstanceStatus::Stopping,
            "STOPPED" => InstanceStatus::Stopped,
            "SUSPENDING" => InstanceStatus::Suspending,
            "SUSPENDED" => InstanceStatus::Suspended,
            "REPAIRING" => InstanceStatus::Repairing,
            "TERMINATED" => InstanceStatus::Terminated,
            other => InstanceStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Provisioning => "PROVISIONING",
            InstanceStatus::Staging => "STAGING",
            InstanceStatus::Running => "RUNNING",
            InstanceStatus::Stopping => "STOPPING",
            InstanceStatus::Stopped => "STOPPED",
            InstanceStatus::Suspending => "SUSPENDING",
            InstanceStatus::Suspended => "SUSPENDED",
            InstanceStatus::Repairing => "REPAIRING",
            InstanceStatus::Terminated => "TERMINATED",
            InstanceStatus::Unknown(raw) => raw,
        }
    }

    /// Only `TERMINATED` counts as stopped; `STOPPED` is not the restart sentinel.
    pub fn is_stopped(&self) -> bool {
        matches!(self, InstanceStatus::Terminated)
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of the Compute Engine instance resource we read.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl InstanceDescriptor {
    pub fn status(&self) -> InstanceStatus {
        InstanceStatus::parse(&self.status)
    }
}
