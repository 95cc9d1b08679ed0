use clap::Parser;
use revive_common::InstanceRef;
use revive_providers::Connector;
use std::ffi::OsString;

use crate::error::RestartError;
use crate::{starter, status};

/// Restart a Compute Engine instance if it is stopped (TERMINATED).
#[derive(Debug, Parser)]
#[command(name = "revive", version)]
pub struct Cli {
    /// Instance name
    pub instance_name: String,
    /// Project ID
    pub project_id: String,
    /// Zone, e.g. us-central1-a
    pub zone: String,
}

impl Cli {
    pub fn instance(&self) -> InstanceRef {
        InstanceRef::new(&self.project_id, &self.zone, &self.instance_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The instance was not stopped; no start was issued.
    NotStopped,
    /// The instance was stopped and the start operation completed.
    Restarted,
}

/// Parse `args` (program name first), then build the connector and run one check/start cycle.
///
/// A bad argument list returns `RestartError::Usage` before `connect` is called, so usage
/// errors win over configuration errors and no connection is made.
pub async fn run<I, T, F>(args: I, connect: F) -> Result<Outcome, RestartError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce() -> Result<Box<dyn Connector>, RestartError>,
{
    let cli = Cli::try_parse_from(args)?;
    let connector = connect()?;
    revive(&cli.instance(), connector.as_ref()).await
}

pub async fn revive(
    instance: &InstanceRef,
    connector: &dyn Connector,
) -> Result<Outcome, RestartError> {
    tracing::info!("Checking instance {} status...", instance.instance_name);
    let stopped = status::is_stopped(connector, instance).await?;

    let outcome = if stopped {
        tracing::info!("Instance {} is stopped, restarting it...", instance.instance_name);
        starter::start(connector, instance).await?;
        Outcome::Restarted
    } else {
        tracing::info!("Instance {} is not stopped, nothing to do", instance.instance_name);
        Outcome::NotStopped
    };

    tracing::info!("All Done!");
    Ok(outcome)
}
