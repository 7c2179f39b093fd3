//! Rendering of a probe result.

use common::Endpoint;
use probe::ProbeOutcome;
use serde::Serialize;

/// Line printed ahead of the outcome in text output.
pub const SEPARATOR: &str = "==================";

/// The result of one probe together with what was probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub endpoint: Endpoint,
    pub service: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

impl Report {
    pub fn new(endpoint: Endpoint, service: impl Into<String>, outcome: ProbeOutcome) -> Self {
        Self {
            endpoint,
            service: service.into(),
            outcome,
        }
    }

    /// Separator line, then the status name or `CODE: message`.
    pub fn render_text(&self) -> String {
        format!("{SEPARATOR}\n{}", self.outcome)
    }

    /// One JSON object with the endpoint, service and either `status` or `error`.
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Process exit status for this report.
    ///
    /// Always 0 unless `strict`, in which case anything but `SERVING` is 1.
    pub fn exit_status(&self, strict: bool) -> u8 {
        if strict && !self.outcome.is_serving() {
            1
        } else {
            0
        }
    }
}
