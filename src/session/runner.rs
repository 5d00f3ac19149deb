use std::time::Duration;

use crate::agent::claude::ClaudeClient;
use crate::agent::engine::{AgentEngine, AgentLimits, AgentOutcome};
use crate::agent::pacing::Pacer;
use crate::agent::prompt;
use crate::agent::tools::ToolRegistry;
use crate::agent::DecisionEngine;
use crate::browser::chrome::ChromeSession;
use crate::browser::BrowserSession;
use crate::config::AppConfig;
use crate::error::Result;
use crate::outcome::validate::validate;
use crate::session::types::SessionOutcome;

/// One-shot entry point: acquire a Chrome session, run the search, release.
pub async fn execute<F, Fut>(config: &AppConfig, is_cancelled: F) -> Result<SessionOutcome>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let engine: Box<dyn DecisionEngine> = Box::new(ClaudeClient::new(&config.claude)?);

    let session = ChromeSession::launch(&config.browser).await?;

    Ok(run_and_release(config, engine, &session, is_cancelled).await)
}

/// Run the planner against an acquired session, then release the session
/// exactly once, on every path out of the planner.
pub async fn run_and_release<F, Fut>(
    config: &AppConfig,
    engine: Box<dyn DecisionEngine>,
    session: &dyn BrowserSession,
    is_cancelled: F,
) -> SessionOutcome
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let outcome = run_search(config, engine, session, is_cancelled).await;

    if config.browser.keep_open {
        prompt_to_close().await;
    }

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to release browser session");
    }

    outcome
}

/// Run the planner and pass its narrative through the validation gate.
/// All failures fold into the outcome; nothing escapes past the release.
async fn run_search<F, Fut>(
    config: &AppConfig,
    engine: Box<dyn DecisionEngine>,
    session: &dyn BrowserSession,
    is_cancelled: F,
) -> SessionOutcome
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let system = prompt::system_prompt(&config.search, &config.applicant);
    let initial_message = prompt::initial_message(&config.search);

    let tools = ToolRegistry::new(config.agent.max_page_text);
    let limits = AgentLimits {
        max_turns: config.claude.max_turns,
        max_duration: Duration::from_secs(config.agent.max_duration_secs),
        max_obstacle_attempts: config.agent.max_obstacle_attempts,
    };
    let pacer = Pacer::new(&config.pacing);

    let agent = AgentEngine::new(engine, tools, limits, pacer);

    tracing::info!(
        role = %config.search.role,
        location = %config.search.location,
        "Planner starting"
    );

    let outcome = agent
        .run(&system, session, &initial_message, is_cancelled)
        .await;

    match outcome {
        AgentOutcome::Completed { narrative } => gate(narrative),
        AgentOutcome::BudgetExhausted { narrative } => {
            tracing::warn!("Budget exhausted; the report may be partial");
            gate(narrative)
        }
        AgentOutcome::ObstacleUnresolved { description } => SessionOutcome::Failed {
            error: format!("Unresolved obstacle: {description}"),
        },
        AgentOutcome::RateLimited { message } => SessionOutcome::Failed {
            error: format!("Decision engine rate limited: {message}"),
        },
        AgentOutcome::Cancelled => SessionOutcome::Cancelled,
        AgentOutcome::Failed { error } => SessionOutcome::Failed { error },
    }
}

/// The validation gate between the engine's free-form narrative and data the
/// rest of the system trusts.
fn gate(narrative: String) -> SessionOutcome {
    match validate(&narrative) {
        Ok(report) => {
            tracing::info!(
                applications = report.applications.len(),
                "Narrative validated"
            );
            SessionOutcome::Completed { report }
        }
        Err(error) => {
            tracing::error!(error = %error, "Narrative failed validation");
            SessionOutcome::NarrativeRejected {
                raw: narrative,
                error,
            }
        }
    }
}

async fn prompt_to_close() {
    use tokio::io::AsyncBufReadExt;

    tracing::info!("Browser left open; press Enter to close it");
    let mut line = String::new();
    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let _ = stdin.read_line(&mut line).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{end_turn, ScriptedEngine};
    use crate::browser::fake::FakeSession;
    use crate::config::{
        AgentConfig, ApplicantConfig, AppConfig, BrowserConfig, ClaudeConfig, PacingConfig,
        SearchConfig,
    };
    use std::sync::atomic::Ordering;

    fn test_config() -> AppConfig {
        AppConfig {
            claude: ClaudeConfig {
                api_key: "sk-test".to_string(),
                model: "test-model".to_string(),
                max_tokens: 1024,
                max_turns: 8,
                request_timeout_secs: 5,
                max_retries: 0,
            },
            browser: BrowserConfig::default(),
            search: SearchConfig::default(),
            applicant: ApplicantConfig {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-0100".to_string(),
                location: "San Francisco, CA".to_string(),
            },
            pacing: PacingConfig {
                enabled: false,
                ..Default::default()
            },
            agent: AgentConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_valid_narrative_produces_a_report() {
        let config = test_config();
        let session = FakeSession::default();
        let engine = Box::new(ScriptedEngine::new(vec![Ok(end_turn(
            r#"{"applications": [{"title": "SE", "company": "Acme", "status": "Applied", "reason": ""}]}"#,
        ))]));

        let outcome = run_and_release(&config, engine, &session, || async { false }).await;

        match outcome {
            SessionOutcome::Completed { report } => {
                assert_eq!(report.applications.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_narrative_is_surfaced_with_the_raw_text() {
        let config = test_config();
        let session = FakeSession::default();
        let engine = Box::new(ScriptedEngine::new(vec![Ok(end_turn(
            "I applied to a few jobs, it went great!",
        ))]));

        let outcome = run_and_release(&config, engine, &session, || async { false }).await;

        match outcome {
            SessionOutcome::NarrativeRejected { raw, .. } => {
                assert!(raw.contains("went great"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_still_releases_the_session_once() {
        let config = test_config();
        let session = FakeSession::default();
        let engine = Box::new(ScriptedEngine::new(vec![]));

        let outcome = run_and_release(&config, engine, &session, || async { true }).await;

        assert!(matches!(outcome, SessionOutcome::Cancelled));
        assert_eq!(session.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_still_releases_the_session_once() {
        let config = test_config();
        let session = FakeSession::default();
        // Script exhausted on the first decision -> planner failure.
        let engine = Box::new(ScriptedEngine::new(vec![]));

        let outcome = run_and_release(&config, engine, &session, || async { false }).await;

        assert!(matches!(outcome, SessionOutcome::Failed { .. }));
        assert_eq!(session.close_calls.load(Ordering::SeqCst), 1);
    }
}
