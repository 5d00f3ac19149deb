pub mod chrome;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failures surfaced by a browsing session.
///
/// `SessionLost` and `Launch` are fatal for the run; everything else
/// describes one failed action the decision engine may choose to retry.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("No element matches selector '{0}'")]
    NotFound(String),

    #[error("Timed out {0}")]
    Timeout(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Action failed: {0}")]
    Action(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser session lost: {0}")]
    SessionLost(String),
}

impl BrowserError {
    /// True when the session can no longer be trusted to execute actions.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BrowserError::SessionLost(_) | BrowserError::Launch(_)
        )
    }
}

/// Identity of the current page, returned after stateful actions.
#[derive(Debug, Clone)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

/// One live web page, exclusively owned by a single planner for the
/// session's lifetime. All interaction with the page goes through here.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a URL and wait for the load to settle.
    async fn navigate(&self, url: &str) -> Result<PageInfo, BrowserError>;

    /// Click the first element matching a CSS selector.
    async fn click(&self, selector: &str) -> Result<PageInfo, BrowserError>;

    /// Focus the first element matching a CSS selector and type into it.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), BrowserError>;

    /// Dispatch a key press (e.g. "Enter") to the focused element.
    async fn press_key(&self, key: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching the selector is present.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Visible text of the matching element, or of the whole page when no
    /// selector is given.
    async fn extract_text(&self, selector: Option<&str>) -> Result<String, BrowserError>;

    /// Identity of the current page.
    async fn page_info(&self) -> Result<PageInfo, BrowserError>;

    /// Release the session. Safe to call once on any exit path.
    async fn close(&self) -> Result<(), BrowserError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{BrowserError, BrowserSession, PageInfo};

    /// Scripted in-memory session for planner and orchestrator tests.
    #[derive(Default)]
    pub(crate) struct FakeSession {
        pub page_text: Mutex<String>,
        pub close_calls: AtomicU32,
        pub lost: AtomicBool,
        /// Selectors that behave as absent from the page.
        pub missing_selectors: Vec<String>,
    }

    impl FakeSession {
        pub fn with_page_text(text: &str) -> Self {
            Self {
                page_text: Mutex::new(text.to_string()),
                ..Default::default()
            }
        }

        fn check_alive(&self) -> Result<(), BrowserError> {
            if self.lost.load(Ordering::SeqCst) {
                Err(BrowserError::SessionLost("fake session lost".to_string()))
            } else {
                Ok(())
            }
        }

        fn info(&self) -> PageInfo {
            PageInfo {
                url: "https://fake.test/".to_string(),
                title: "Fake page".to_string(),
            }
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&self, _url: &str) -> Result<PageInfo, BrowserError> {
            self.check_alive()?;
            Ok(self.info())
        }

        async fn click(&self, selector: &str) -> Result<PageInfo, BrowserError> {
            self.check_alive()?;
            if self.missing_selectors.iter().any(|s| s == selector) {
                return Err(BrowserError::NotFound(selector.to_string()));
            }
            Ok(self.info())
        }

        async fn type_text(&self, selector: &str, _text: &str) -> Result<(), BrowserError> {
            self.check_alive()?;
            if self.missing_selectors.iter().any(|s| s == selector) {
                return Err(BrowserError::NotFound(selector.to_string()));
            }
            Ok(())
        }

        async fn press_key(&self, _key: &str) -> Result<(), BrowserError> {
            self.check_alive()
        }

        async fn wait_for(
            &self,
            selector: &str,
            _timeout: Duration,
        ) -> Result<(), BrowserError> {
            self.check_alive()?;
            if self.missing_selectors.iter().any(|s| s == selector) {
                return Err(BrowserError::Timeout(format!("waiting for '{selector}'")));
            }
            Ok(())
        }

        async fn extract_text(
            &self,
            _selector: Option<&str>,
        ) -> Result<String, BrowserError> {
            self.check_alive()?;
            Ok(self.page_text.lock().unwrap().clone())
        }

        async fn page_info(&self) -> Result<PageInfo, BrowserError> {
            self.check_alive()?;
            Ok(self.info())
        }

        async fn close(&self) -> Result<(), BrowserError> {
            self.close_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
