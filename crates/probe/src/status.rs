//! Serving status reported by the health-checking protocol.

use serde::{Deserialize, Serialize};
use tonic_health::pb::health_check_response::ServingStatus as WireStatus;

/// Status carried by a `HealthCheckResponse`.
///
/// Wire values:
/// ```text
/// 0 UNKNOWN  1 SERVING  2 NOT_SERVING  3 SERVICE_UNKNOWN
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    /// The server could not determine a status.
    #[default]
    Unknown,

    /// The service is serving requests.
    Serving,

    /// The service is up but not serving requests.
    NotServing,

    /// The server does not know the requested service.
    ServiceUnknown,
}

impl ServingStatus {
    /// Maps a wire value to a status, `None` if the value is not defined by the protocol.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(ServingStatus::Unknown),
            1 => Some(ServingStatus::Serving),
            2 => Some(ServingStatus::NotServing),
            3 => Some(ServingStatus::ServiceUnknown),
            _ => None,
        }
    }

    /// Maps a wire value to a status, treating undefined values as `Unknown`.
    pub fn decode(value: i32) -> Self {
        Self::from_wire(value).unwrap_or_else(|| {
            tracing::warn!(value, "server returned an undefined serving status");
            ServingStatus::Unknown
        })
    }

    /// Returns the wire value of this status.
    pub fn as_wire(&self) -> i32 {
        match self {
            ServingStatus::Unknown => 0,
            ServingStatus::Serving => 1,
            ServingStatus::NotServing => 2,
            ServingStatus::ServiceUnknown => 3,
        }
    }

    /// Returns true if the service is serving.
    pub fn is_serving(&self) -> bool {
        matches!(self, ServingStatus::Serving)
    }

    /// Returns the protocol name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServingStatus::Unknown => "UNKNOWN",
            ServingStatus::Serving => "SERVING",
            ServingStatus::NotServing => "NOT_SERVING",
            ServingStatus::ServiceUnknown => "SERVICE_UNKNOWN",
        }
    }
}

impl std::fmt::Display for ServingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<WireStatus> for ServingStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Unknown => ServingStatus::Unknown,
            WireStatus::Serving => ServingStatus::Serving,
            WireStatus::NotServing => ServingStatus::NotServing,
            WireStatus::ServiceUnknown => ServingStatus::ServiceUnknown,
        }
    }
}

impl From<ServingStatus> for WireStatus {
    fn from(status: ServingStatus) -> Self {
        match status {
            ServingStatus::Unknown => WireStatus::Unknown,
            ServingStatus::Serving => WireStatus::Serving,
            ServingStatus::NotServing => WireStatus::NotServing,
            ServingStatus::ServiceUnknown => WireStatus::ServiceUnknown,
        }
    }
}
