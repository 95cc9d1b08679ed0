//! Scripted in-memory provider. Every connect/call is counted so callers can assert
//! exactly which remote operations a flow performed.

use crate::{ComputeProvider, Connector};
use async_trait::async_trait;
use revive_common::{
    ComputeError, InstanceDescriptor, InstanceRef, Operation, OperationError, OperationErrorItem,
    OperationStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MockCalls {
    connects: AtomicUsize,
    get_instance: AtomicUsize,
    start_instance: AtomicUsize,
    wait_operation: AtomicUsize,
}

impl MockCalls {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn get_instance(&self) -> usize {
        self.get_instance.load(Ordering::SeqCst)
    }

    pub fn start_instance(&self) -> usize {
        self.start_instance.load(Ordering::SeqCst)
    }

    pub fn wait_operation(&self) -> usize {
        self.wait_operation.load(Ordering::SeqCst)
    }

    /// Calls that reached the (pretend) remote API, connects excluded.
    pub fn remote_calls(&self) -> usize {
        self.get_instance() + self.start_instance() + self.wait_operation()
    }
}

#[derive(Debug, Clone)]
struct Scenario {
    status: String,
    connect_error: Option<String>,
    get_error: Option<ComputeError>,
    start_error: Option<ComputeError>,
    operation_error: Option<OperationError>,
    pending_polls: usize,
}

#[derive(Clone)]
pub struct MockConnector {
    scenario: Scenario,
    calls: Arc<MockCalls>,
}

impl MockConnector {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            scenario: Scenario {
                status: status.into(),
                connect_error: None,
                get_error: None,
                start_error: None,
                operation_error: None,
                pending_polls: 0,
            },
            calls: Arc::new(MockCalls::default()),
        }
    }

    pub fn running() -> Self {
        Self::with_status("RUNNING")
    }

    pub fn stopped() -> Self {
        Self::with_status("TERMINATED")
    }

    pub fn failing_connect(mut self, msg: impl Into<String>) -> Self {
        self.scenario.connect_error = Some(msg.into());
        self
    }

    pub fn failing_get(mut self, err: ComputeError) -> Self {
        self.scenario.get_error = Some(err);
        self
    }

    pub fn failing_start(mut self, err: ComputeError) -> Self {
        self.scenario.start_error = Some(err);
        self
    }

    /// The start is accepted but the operation resolves to `code: message`.
    pub fn failing_operation(mut self, code: &str, message: &str) -> Self {
        self.scenario.operation_error = Some(OperationError {
            errors: vec![OperationErrorItem {
                code: code.to_string(),
                message: message.to_string(),
            }],
        });
        self
    }

    /// Number of wait calls that still report RUNNING before the operation is DONE.
    pub fn pending_polls(mut self, n: usize) -> Self {
        self.scenario.pending_polls = n;
        self
    }

    pub fn calls(&self) -> Arc<MockCalls> {
        self.calls.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn ComputeProvider>, ComputeError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.scenario.connect_error {
            return Err(ComputeError::connection(msg.clone()));
        }
        Ok(Box::new(MockProvider {
            scenario: self.scenario.clone(),
            calls: self.calls.clone(),
        }))
    }
}

pub struct MockProvider {
    scenario: Scenario,
    calls: Arc<MockCalls>,
}

#[async_trait]
impl ComputeProvider for MockProvider {
    async fn get_instance(
        &self,
        instance: &InstanceRef,
    ) -> Result<InstanceDescriptor, ComputeError> {
        tracing::debug!("[mock] get_instance {}", instance);
        self.calls.get_instance.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.scenario.get_error {
            return Err(err.clone());
        }
        Ok(InstanceDescriptor {
            id: Some("mock-0001".to_string()),
            name: instance.instance_name.clone(),
            status: self.scenario.status.clone(),
            status_message: None,
        })
    }

    async fn start_instance(&self, instance: &InstanceRef) -> Result<Operation, ComputeError> {
        tracing::debug!("[mock] start_instance {}", instance);
        let n = self.calls.start_instance.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.scenario.start_error {
            return Err(err.clone());
        }
        Ok(Operation {
            name: format!("operation-mock-start-{}-{}", instance.instance_name, n),
            status: OperationStatus::Pending,
            error: None,
            http_error_status_code: None,
            http_error_message: None,
        })
    }

    async fn wait_operation(
        &self,
        _instance: &InstanceRef,
        operation: Operation,
    ) -> Result<Operation, ComputeError> {
        let mut op = operation;
        while !op.is_done() {
            tracing::debug!("[mock] wait_operation {}", op.name);
            let polls = self.calls.wait_operation.fetch_add(1, Ordering::SeqCst) + 1;
            op.status = if polls > self.scenario.pending_polls {
                OperationStatus::Done
            } else {
                OperationStatus::Running
            };
        }
        if let Some(error) = &self.scenario.operation_error {
            op.error = Some(error.clone());
        }
        if let Err(error) = op.to_result() {
            return Err(ComputeError::Operation {
                operation: op.name.clone(),
                error,
            });
        }
        Ok(op)
    }
}
