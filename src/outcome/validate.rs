use thiserror::Error;

use super::ApplicationReport;

/// Why a narrative was rejected by the validation gate.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Narrative is empty")]
    Empty,

    #[error("Narrative is not a valid report: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Record {index}: {field} must not be empty")]
    EmptyField { index: usize, field: &'static str },
}

/// Parse the planner's terminal narrative into a typed report.
///
/// The decision engine is never trusted to self-certify its output; this is
/// the gate between free-form model text and data the rest of the system
/// relies on. Pure function of its input. A single surrounding Markdown code
/// fence is tolerated, nothing else: after unfencing, the text must be
/// exactly one JSON object matching the report schema, with no unknown
/// fields and a status from the enumerated set.
pub fn validate(raw: &str) -> Result<ApplicationReport, ValidationError> {
    let body = strip_fence(raw.trim());
    if body.is_empty() {
        return Err(ValidationError::Empty);
    }

    let report: ApplicationReport = serde_json::from_str(body)?;

    for (index, application) in report.applications.iter().enumerate() {
        if application.title.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                index,
                field: "title",
            });
        }
        if application.company.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                index,
                field: "company",
            });
        }
    }

    Ok(report)
}

/// Strip one surrounding Markdown code fence (with optional language tag).
/// Returns the input unchanged when it is not fenced.
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(newline) = rest.find('\n') else {
        return text;
    };
    let body = &rest[newline + 1..];
    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim_end(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Application, ApplicationStatus};

    #[test]
    fn test_single_applied_record() {
        let raw = r#"{
            "applications": [
                {"title": "Solutions Engineer", "company": "Acme Corp", "status": "Applied", "reason": ""}
            ]
        }"#;

        let report = validate(raw).unwrap();
        assert_eq!(
            report.applications,
            vec![Application {
                title: "Solutions Engineer".to_string(),
                company: "Acme Corp".to_string(),
                status: ApplicationStatus::Applied,
                reason: String::new(),
            }]
        );
    }

    #[test]
    fn test_preserves_record_order() {
        let raw = r#"{
            "applications": [
                {"title": "Solutions Engineer", "company": "Acme Corp", "status": "Applied", "reason": ""},
                {"title": "Sales Engineer", "company": "Globex", "status": "Skipped", "reason": "no easy-apply option"}
            ]
        }"#;

        let report = validate(raw).unwrap();
        assert_eq!(report.applications.len(), 2);
        assert_eq!(report.applications[0].title, "Solutions Engineer");
        assert_eq!(report.applications[1].title, "Sales Engineer");
        assert_eq!(report.applications[1].status, ApplicationStatus::Skipped);
        assert_eq!(report.applications[1].reason, "no easy-apply option");
    }

    #[test]
    fn test_one_errored_item_does_not_suppress_siblings() {
        let raw = r#"{
            "applications": [
                {"title": "SE I", "company": "Acme", "status": "Applied", "reason": ""},
                {"title": "SE II", "company": "Globex", "status": "Error", "reason": "form rejected the submission"},
                {"title": "SE III", "company": "Initech", "status": "Applied", "reason": ""}
            ]
        }"#;

        let report = validate(raw).unwrap();
        assert_eq!(report.applications.len(), 3);
        assert_eq!(report.applications[1].status, ApplicationStatus::Error);
        assert_eq!(report.applications[0].status, ApplicationStatus::Applied);
        assert_eq!(report.applications[2].status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_missing_status_fails() {
        let raw = r#"{
            "applications": [
                {"title": "Solutions Engineer", "company": "Acme Corp", "reason": ""}
            ]
        }"#;

        let err = validate(raw).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_status_outside_enum_fails() {
        let raw = r#"{
            "applications": [
                {"title": "Solutions Engineer", "company": "Acme Corp", "status": "Pending", "reason": ""}
            ]
        }"#;

        assert!(matches!(
            validate(raw),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_field_fails() {
        let raw = r#"{
            "applications": [
                {"title": "SE", "company": "Acme", "status": "Applied", "reason": "", "salary": "n/a"}
            ]
        }"#;

        assert!(validate(raw).is_err());
    }

    #[test]
    fn test_empty_title_fails() {
        let raw = r#"{
            "applications": [
                {"title": "  ", "company": "Acme", "status": "Applied", "reason": ""}
            ]
        }"#;

        assert!(matches!(
            validate(raw),
            Err(ValidationError::EmptyField { field: "title", .. })
        ));
    }

    #[test]
    fn test_empty_company_fails() {
        let raw = r#"{
            "applications": [
                {"title": "SE", "company": "", "status": "Applied", "reason": ""}
            ]
        }"#;

        assert!(matches!(
            validate(raw),
            Err(ValidationError::EmptyField { field: "company", .. })
        ));
    }

    #[test]
    fn test_empty_narrative_fails() {
        assert!(matches!(validate("   \n "), Err(ValidationError::Empty)));
    }

    #[test]
    fn test_prose_around_json_fails() {
        let raw = r#"Here is my report: {"applications": []}"#;
        assert!(validate(raw).is_err());
    }

    #[test]
    fn test_fenced_json_accepted() {
        let raw = "```json\n{\"applications\": [{\"title\": \"SE\", \"company\": \"Acme\", \"status\": \"Applied\", \"reason\": \"\"}]}\n```";
        let report = validate(raw).unwrap();
        assert_eq!(report.applications.len(), 1);
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = validate(r#"{"applications": []}"#).unwrap();
        assert!(report.applications.is_empty());
    }

    #[test]
    fn test_idempotent_over_canonical_form() {
        let raw = r#"{
            "applications": [
                {"title": "SE", "company": "Acme", "status": "Applied", "reason": ""},
                {"title": "SE", "company": "Acme", "status": "Skipped", "reason": "duplicate listing"}
            ]
        }"#;

        let report = validate(raw).unwrap();
        let revalidated = validate(&report.to_json()).unwrap();
        assert_eq!(report, revalidated);
    }
}
