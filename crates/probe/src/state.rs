//! One-shot probe state machine.

use crate::error::{ProbeError, Result};
use crate::outcome::{ProbeFailure, ProbeOutcome};
use crate::status::ServingStatus;

/// The state of a probe attempt.
///
/// State transitions:
/// ```text
/// Idle ──► Probing ──┬──► Succeeded
///                    └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeState {
    /// Nothing has been sent yet.
    #[default]
    Idle,

    /// The connection is open and the check is in flight.
    Probing,

    /// A status was received (terminal state).
    Succeeded,

    /// The attempt failed (terminal state).
    Failed,
}

impl ProbeState {
    /// Returns true if a probe can start from this state.
    pub fn can_begin(&self) -> bool {
        matches!(self, ProbeState::Idle)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeState::Succeeded | ProbeState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeState::Idle => "Idle",
            ProbeState::Probing => "Probing",
            ProbeState::Succeeded => "Succeeded",
            ProbeState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for ProbeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single probe attempt and the outcome it recorded.
///
/// Attempts are never reused: once terminal, further transitions are rejected.
#[derive(Debug, Default)]
pub struct ProbeAttempt {
    state: ProbeState,
    outcome: Option<ProbeOutcome>,
}

impl ProbeAttempt {
    /// Creates an idle attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Moves the attempt from `Idle` to `Probing`.
    pub fn begin(&mut self) -> Result<()> {
        if !self.state.can_begin() {
            return Err(ProbeError::InvalidTransition {
                from: self.state,
                to: ProbeState::Probing,
            });
        }
        self.state = ProbeState::Probing;
        Ok(())
    }

    /// Records the result of the check and moves to a terminal state.
    pub fn complete(&mut self, result: Result<ServingStatus>) -> Result<()> {
        let (next, outcome) = match result {
            Ok(status) => (ProbeState::Succeeded, ProbeOutcome::Status(status)),
            Err(err) => (ProbeState::Failed, ProbeOutcome::Failure(err.into_failure())),
        };

        if self.state != ProbeState::Probing {
            return Err(ProbeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Consumes the attempt, yielding its outcome.
    ///
    /// An attempt that never recorded an outcome reports "no response".
    pub fn into_outcome(self) -> ProbeOutcome {
        self.outcome
            .unwrap_or_else(|| ProbeOutcome::Failure(ProbeFailure::no_response()))
    }
}
