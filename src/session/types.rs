use crate::outcome::validate::ValidationError;
use crate::outcome::ApplicationReport;

/// Outcome of one browsing session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The narrative passed the validation gate.
    Completed { report: ApplicationReport },
    /// The narrative failed validation; the raw text is kept for diagnosis.
    NarrativeRejected {
        raw: String,
        error: ValidationError,
    },
    /// The abort signal was observed before completion.
    Cancelled,
    /// Session-level failure (browser lost, engine error, unresolved obstacle).
    Failed { error: String },
}
