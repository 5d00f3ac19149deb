use chrono::Local;

use crate::outcome::{ApplicationReport, ApplicationStatus};

/// Render a validated report as the human-readable session summary.
pub fn render(report: &ApplicationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Application summary ({})\n",
        Local::now().format("%Y-%m-%d %H:%M")
    ));

    if report.applications.is_empty() {
        out.push_str("\nNo listings were processed.\n");
        return out;
    }

    let mut applied = 0;
    let mut skipped = 0;
    let mut errored = 0;

    for application in &report.applications {
        let tag = match application.status {
            ApplicationStatus::Applied => {
                applied += 1;
                "Applied"
            }
            ApplicationStatus::Skipped => {
                skipped += 1;
                "Skipped"
            }
            ApplicationStatus::Error => {
                errored += 1;
                "Error"
            }
        };

        out.push_str(&format!(
            "\n  [{tag:<7}] {} - {}\n",
            application.title, application.company
        ));
        if !application.reason.is_empty() {
            out.push_str(&format!("            {}\n", application.reason));
        }
    }

    out.push_str(&format!(
        "\n{applied} applied, {skipped} skipped, {errored} failed ({} total)\n",
        report.applications.len()
    ));

    out
}
