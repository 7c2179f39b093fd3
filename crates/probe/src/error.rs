use std::time::Duration;

use thiserror::Error;
use tonic::Code;

use crate::outcome::{ProbeFailure, code_name};
use crate::state::ProbeState;

/// Errors that can occur while probing an endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The endpoint could not be turned into a valid target URI.
    #[error("invalid endpoint uri '{uri}': {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    /// The connection could not be established (DNS, refused, TLS).
    #[error("{0}")]
    Transport(String),

    /// The server answered the RPC with a non-OK status.
    #[error("rpc failed with {}: {message}", code_name(*.code))]
    Rpc { code: Code, message: String },

    /// The server did not answer before the configured RPC deadline.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The attempt finished without a response being recorded.
    #[error("no response")]
    NoResponse,

    /// The probe attempt was driven through an invalid state transition.
    #[error("invalid probe transition from {from} to {to}")]
    InvalidTransition { from: ProbeState, to: ProbeState },
}

impl ProbeError {
    /// Builds a transport error from an error and its full source chain.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        ProbeError::Transport(describe_chain(err))
    }

    /// Converts the error into the failure descriptor reported to the user.
    pub fn into_failure(self) -> ProbeFailure {
        match self {
            ProbeError::InvalidEndpoint { .. } => {
                ProbeFailure::transport(Code::InvalidArgument, self.to_string())
            }
            ProbeError::Transport(message) => ProbeFailure::transport(Code::Unavailable, message),
            ProbeError::Rpc { code, message } => ProbeFailure::rpc(code, message),
            ProbeError::DeadlineExceeded(_) => {
                ProbeFailure::rpc(Code::DeadlineExceeded, self.to_string())
            }
            ProbeError::NoResponse => ProbeFailure::no_response(),
            ProbeError::InvalidTransition { .. } => {
                tracing::error!(error = %self, "probe attempt left in an unexpected state");
                ProbeFailure::no_response()
            }
        }
    }
}

impl From<tonic::Status> for ProbeError {
    fn from(status: tonic::Status) -> Self {
        let message = if status.message().is_empty() {
            status.code().description().to_string()
        } else {
            status.message().to_string()
        };
        ProbeError::Rpc {
            code: status.code(),
            message,
        }
    }
}

/// Joins an error with its sources, skipping causes already contained in the text.
fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Result type for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
