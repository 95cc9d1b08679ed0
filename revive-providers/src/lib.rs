use async_trait::async_trait;
use revive_common::{ComputeError, InstanceDescriptor, InstanceRef, Operation};

pub mod gce;

#[cfg(feature = "mock")]
pub mod mock;

/// A live client for the compute-management API.
///
/// Obtained from a [`Connector`] for the duration of one logical operation and dropped
/// afterwards; implementations must not rely on being reused.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Describe a single instance.
    async fn get_instance(
        &self,
        instance: &InstanceRef,
    ) -> Result<InstanceDescriptor, ComputeError>;

    /// Ask the provider to start an instance. Returns the long-running operation handle
    /// without waiting for it.
    async fn start_instance(&self, instance: &InstanceRef) -> Result<Operation, ComputeError>;

    /// Block until `operation` is done. Returns the final operation on success and
    /// `ComputeError::Operation` when it finished with an error.
    async fn wait_operation(
        &self,
        instance: &InstanceRef,
        operation: Operation,
    ) -> Result<Operation, ComputeError>;
}

/// Builds a fresh [`ComputeProvider`] (HTTP client + credentials).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ComputeProvider>, ComputeError>;
}
