use revive_common::InstanceRef;
use revive_providers::Connector;

use crate::error::RestartError;

/// True iff the instance reports `TERMINATED`.
///
/// Opens its own client for the call; the client is dropped on every return path.
pub async fn is_stopped(
    connector: &dyn Connector,
    instance: &InstanceRef,
) -> Result<bool, RestartError> {
    let provider = connector.connect().await.map_err(RestartError::GetInstance)?;

    let descriptor = provider
        .get_instance(instance)
        .await
        .map_err(RestartError::GetInstance)?;

    let status = descriptor.status();
    tracing::debug!("instance {} status={}", instance, status);
    Ok(status.is_stopped())
}
