pub mod validate;

use serde::{Deserialize, Serialize};

/// Final status of one job listing processed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Skipped,
    Error,
}

/// One processed job listing.
///
/// `reason` may be empty; the task prompt asks the agent to fill it whenever
/// the status is not `Applied`, but the schema does not require that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Application {
    pub title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub reason: String,
}

/// All listings processed in one session, in encounter order.
/// Duplicates are allowed; a listing re-encountered is reported again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationReport {
    pub applications: Vec<Application>,
}

impl ApplicationReport {
    /// Canonical JSON form. Feeding this back through `validate::validate`
    /// yields the same records.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("report serializes to JSON")
    }
}
