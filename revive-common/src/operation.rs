use serde::{Deserialize, Serialize};
use std::fmt;

// -----------------------------------------------------------------------------
// Long-running operations (zoneOperations)
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct OperationError {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("unknown error");
        }
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Handle returned by `instances.start`; polled until `DONE`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    pub status: OperationStatus,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub http_error_status_code: Option<u16>,
    #[serde(default)]
    pub http_error_message: Option<String>,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    /// `Err` when a finished operation carries an error payload or an HTTP error status.
    /// Only meaningful once `is_done()`.
    pub fn to_result(&self) -> Result<(), OperationError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if let Some(code) = self.http_error_status_code.filter(|c| *c >= 400) {
            return Err(OperationError {
                errors: vec![OperationErrorItem {
                    code: code.to_string(),
                    message: self.http_error_message.clone().unwrap_or_default(),
                }],
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn done_without_error_is_ok() {
        let op: Operation = serde_json::from_value(json!({
            "name": "operation-123",
            "status": "DONE",
            "operationType": "start"
        }))
        .unwrap();
        assert!(op.is_done());
        assert!(op.to_result().is_ok());
    }

    #[test]
    fn done_with_error_payload_fails() {
        let op: Operation = serde_json::from_value(json!({
            "name": "operation-123",
            "status": "DONE",
            "error": { "errors": [ { "code": "QUOTA_EXCEEDED", "message": "Quota 'CPUS' exceeded" } ] },
            "httpErrorStatusCode": 403,
            "httpErrorMessage": "FORBIDDEN"
        }))
        .unwrap();
        let err = op.to_result().unwrap_err();
        assert_eq!(err.errors[0].code, "QUOTA_EXCEEDED");
        assert_eq!(err.to_string(), "QUOTA_EXCEEDED: Quota 'CPUS' exceeded");
    }

    #[test]
    fn http_error_status_alone_fails() {
        let op: Operation = serde_json::from_value(json!({
            "name": "operation-123",
            "status": "DONE",
            "httpErrorStatusCode": 409,
            "httpErrorMessage": "CONFLICT"
        }))
        .unwrap();
        assert_eq!(op.to_result().unwrap_err().to_string(), "409: CONFLICT");
    }

    #[test]
    fn running_is_not_done() {
        let op: Operation =
            serde_json::from_value(json!({ "name": "op", "status": "RUNNING" })).unwrap();
        assert!(!op.is_done());
    }
}
