use revive_common::InstanceRef;
use revive_providers::Connector;

use crate::error::RestartError;

/// Start the instance and wait for the resulting operation to finish.
///
/// No precondition on the current status: starting a running instance is left to the API.
pub async fn start(
    connector: &dyn Connector,
    instance: &InstanceRef,
) -> Result<(), RestartError> {
    let provider = connector.connect().await.map_err(RestartError::StartInstance)?;

    let operation = provider
        .start_instance(instance)
        .await
        .map_err(RestartError::StartInstance)?;
    tracing::debug!("start of {} accepted as operation {}", instance, operation.name);

    let done = provider
        .wait_operation(instance, operation)
        .await
        .map_err(RestartError::WaitOperation)?;
    tracing::debug!("operation {} done", done.name);

    Ok(())
}
