//! Result of a single probe attempt.

use serde::{Serialize, Serializer};
use tonic::Code;

use crate::status::ServingStatus;

/// Category of a probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The connection could not be established.
    Transport,
    /// The server returned a non-OK RPC status.
    Rpc,
    /// The attempt ended without a response.
    NoResponse,
}

/// Failure descriptor: what went wrong, its gRPC code and a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    #[serde(serialize_with = "serialize_code")]
    pub code: Code,
    pub message: String,
}

impl ProbeFailure {
    pub fn transport(code: Code, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            code,
            message: message.into(),
        }
    }

    pub fn rpc(code: Code, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Rpc,
            code,
            message: message.into(),
        }
    }

    pub fn no_response() -> Self {
        Self {
            kind: FailureKind::NoResponse,
            code: Code::Unknown,
            message: "no response".to_string(),
        }
    }
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", code_name(self.code), self.message)
    }
}

/// What one probe produced: a serving status or a failure.
///
/// Displays as the bare status name (`SERVING`) or as `CODE: message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Status(ServingStatus),
    #[serde(rename = "error")]
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    /// Returns the status if the probe got a response.
    pub fn status(&self) -> Option<ServingStatus> {
        match self {
            ProbeOutcome::Status(status) => Some(*status),
            ProbeOutcome::Failure(_) => None,
        }
    }

    /// Returns the failure descriptor if the probe failed.
    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            ProbeOutcome::Status(_) => None,
            ProbeOutcome::Failure(failure) => Some(failure),
        }
    }

    /// Returns true if the probe got a `SERVING` response.
    pub fn is_serving(&self) -> bool {
        self.status().is_some_and(|status| status.is_serving())
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Status(status) => write!(f, "{status}"),
            ProbeOutcome::Failure(failure) => write!(f, "{failure}"),
        }
    }
}

impl From<ServingStatus> for ProbeOutcome {
    fn from(status: ServingStatus) -> Self {
        ProbeOutcome::Status(status)
    }
}

impl From<ProbeFailure> for ProbeOutcome {
    fn from(failure: ProbeFailure) -> Self {
        ProbeOutcome::Failure(failure)
    }
}

/// Canonical upper snake case name of a gRPC status code.
#[allow(unreachable_patterns)]
pub fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
        _ => "UNKNOWN",
    }
}

fn serialize_code<S: Serializer>(code: &Code, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(code_name(*code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_outcome_renders_bare_status_name() {
        let outcome = ProbeOutcome::from(ServingStatus::Serving);
        assert_eq!(outcome.to_string(), "SERVING");
        assert!(outcome.is_serving());
        assert!(outcome.failure().is_none());
    }

    #[test]
    fn test_failure_outcome_renders_code_and_message() {
        let outcome = ProbeOutcome::from(ProbeFailure::rpc(
            Code::NotFound,
            "service not registered",
        ));
        assert_eq!(outcome.to_string(), "NOT_FOUND: service not registered");
        assert!(!outcome.is_serving());
        assert_eq!(outcome.status(), None);
    }

    #[test]
    fn test_no_response_outcome() {
        let outcome = ProbeOutcome::from(ProbeFailure::no_response());
        assert_eq!(outcome.to_string(), "UNKNOWN: no response");
        assert_eq!(outcome.failure().unwrap().kind, FailureKind::NoResponse);
    }

    #[test]
    fn test_code_names() {
        assert_eq!(code_name(Code::Unavailable), "UNAVAILABLE");
        assert_eq!(code_name(Code::DeadlineExceeded), "DEADLINE_EXCEEDED");
        assert_eq!(code_name(Code::Unauthenticated), "UNAUTHENTICATED");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(ProbeOutcome::from(ServingStatus::NotServing)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "NOT_SERVING" }));

        let json = serde_json::to_value(ProbeOutcome::from(ProbeFailure::transport(
            Code::Unavailable,
            "connection refused",
        )))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": {
                    "kind": "transport",
                    "code": "UNAVAILABLE",
                    "message": "connection refused"
                }
            })
        );
    }
}
