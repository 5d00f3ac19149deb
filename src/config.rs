use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub claude: ClaudeConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub applicant: ApplicantConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Deserialize, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("max_turns", &self.max_turns)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    /// Path to the Chrome/Chromium executable; auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,
    #[serde(default = "default_action_timeout_ms")]
    pub action_timeout_ms: u64,
    /// Leave the browser open until Enter is pressed after the run.
    #[serde(default)]
    pub keep_open: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            nav_timeout_ms: default_nav_timeout_ms(),
            action_timeout_ms: default_action_timeout_ms(),
            keep_open: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_posted_within_days")]
    pub posted_within_days: u32,
    #[serde(default = "default_radius_miles")]
    pub radius_miles: u32,
    #[serde(default = "default_max_applications")]
    pub max_applications: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            role: default_role(),
            location: default_location(),
            posted_within_days: default_posted_within_days(),
            radius_miles: default_radius_miles(),
            max_applications: default_max_applications(),
        }
    }
}

/// Details supplied to application sub-forms on the agent's behalf.
#[derive(Debug, Deserialize, Clone)]
pub struct ApplicantConfig {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    #[serde(default = "default_pacing_enabled")]
    pub enabled: bool,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: default_pacing_enabled(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_max_obstacle_attempts")]
    pub max_obstacle_attempts: u32,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
    #[serde(default = "default_max_page_text")]
    pub max_page_text: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_obstacle_attempts: default_max_obstacle_attempts(),
            max_duration_secs: default_max_duration_secs(),
            max_page_text: default_max_page_text(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_max_turns() -> u32 {
    120
}

fn default_request_timeout_secs() -> u64 {
    180
}

fn default_max_retries() -> u32 {
    2
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    900
}

fn default_nav_timeout_ms() -> u64 {
    30_000
}

fn default_action_timeout_ms() -> u64 {
    10_000
}

fn default_site() -> String {
    "https://www.indeed.com".to_string()
}

fn default_role() -> String {
    "Solutions Engineer".to_string()
}

fn default_location() -> String {
    "San Francisco".to_string()
}

fn default_posted_within_days() -> u32 {
    3
}

fn default_radius_miles() -> u32 {
    25
}

fn default_max_applications() -> u32 {
    10
}

fn default_pacing_enabled() -> bool {
    true
}

fn default_min_delay_ms() -> u64 {
    300
}

fn default_max_delay_ms() -> u64 {
    2_500
}

fn default_max_obstacle_attempts() -> u32 {
    3
}

fn default_max_duration_secs() -> u64 {
    1_800
}

fn default_max_page_text() -> usize {
    20_000
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            // Try default paths
            builder = builder.add_source(
                config::File::with_name("jobpilot")
                    .required(false),
            );
        }

        // Environment variable overrides with JOBPILOT_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("JOBPILOT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobpilot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[claude]
api_key = "sk-test"

[applicant]
full_name = "Jane Doe"
email = "jane@example.com"
phone = "555-0100"
location = "San Francisco, CA"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.claude.api_key, "sk-test");
        assert_eq!(config.search.role, "Solutions Engineer");
        assert_eq!(config.search.posted_within_days, 3);
        assert_eq!(config.search.radius_miles, 25);
        assert!(config.browser.headless);
        assert!(config.pacing.enabled);
        assert_eq!(config.agent.max_obstacle_attempts, 3);
    }

    #[test]
    fn test_load_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobpilot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[claude]
api_key = "sk-test"
max_turns = 10

[search]
role = "Platform Engineer"
location = "Remote"

[pacing]
enabled = false

[applicant]
full_name = "Jane Doe"
email = "jane@example.com"
phone = "555-0100"
location = "Portland, OR"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.claude.max_turns, 10);
        assert_eq!(config.search.role, "Platform Engineer");
        assert_eq!(config.search.location, "Remote");
        assert!(!config.pacing.enabled);
    }

    #[test]
    fn test_missing_applicant_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobpilot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[claude]
api_key = "sk-test"
"#
        )
        .unwrap();

        assert!(AppConfig::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let claude = ClaudeConfig {
            api_key: "sk-secret".to_string(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_turns: default_max_turns(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        };
        let rendered = format!("{claude:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
