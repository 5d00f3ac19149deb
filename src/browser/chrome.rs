use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType,
};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::browser::{BrowserError, BrowserSession, PageInfo};
use crate::config::BrowserConfig;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);
const POST_CLICK_SETTLE: Duration = Duration::from_millis(500);

/// A Chrome tab driven over CDP.
pub struct ChromeSession {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    nav_timeout: Duration,
    action_timeout: Duration,
}

impl ChromeSession {
    /// Launch Chrome and open the working tab.
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut builder =
            ChromeConfig::builder().window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let chrome_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Drive the CDP event stream; when this loop ends the session is gone.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tracing::info!(headless = config.headless, "Browser session acquired");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
            nav_timeout: Duration::from_millis(config.nav_timeout_ms),
            action_timeout: Duration::from_millis(config.action_timeout_ms),
        })
    }

    fn ensure_alive(&self) -> Result<(), BrowserError> {
        if self.handler_task.is_finished() {
            return Err(BrowserError::SessionLost(
                "CDP event stream ended".to_string(),
            ));
        }
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Element, BrowserError> {
        tokio::time::timeout(self.action_timeout, self.page.find_element(selector))
            .await
            .map_err(|_| BrowserError::Timeout(format!("looking up '{selector}'")))?
            .map_err(|_| BrowserError::NotFound(selector.to_string()))
    }

    async fn dispatch_key(
        &self,
        event_type: DispatchKeyEventType,
        key: &str,
        text: Option<&str>,
    ) -> Result<(), BrowserError> {
        let mut builder = DispatchKeyEventParams::builder().r#type(event_type).key(key);
        if let Some(text) = text {
            builder = builder.text(text);
        }
        let params = builder.build().map_err(BrowserError::Action)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?;
        Ok(())
    }

    async fn current_info(&self) -> Result<PageInfo, BrowserError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?
            .unwrap_or_default();
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?
            .unwrap_or_default();
        Ok(PageInfo { url, title })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<PageInfo, BrowserError> {
        self.ensure_alive()?;
        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| BrowserError::Navigation(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| BrowserError::Navigation(e.to_string()))?;
            Ok::<_, BrowserError>(())
        };
        tokio::time::timeout(self.nav_timeout, load)
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigating to {url}")))??;
        self.current_info().await
    }

    async fn click(&self, selector: &str) -> Result<PageInfo, BrowserError> {
        self.ensure_alive()?;
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?;
        // A click may start a navigation; give it a moment to settle.
        let _ =
            tokio::time::timeout(POST_CLICK_SETTLE, self.page.wait_for_navigation()).await;
        self.current_info().await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.ensure_alive()?;
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| BrowserError::Action(e.to_string()))?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        self.ensure_alive()?;
        // Form submission needs the carriage-return text on the down event.
        let text = match key {
            "Enter" => Some("\r"),
            _ => None,
        };
        self.dispatch_key(DispatchKeyEventType::KeyDown, key, text)
            .await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, key, None)
            .await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.ensure_alive()?;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!("waiting for '{selector}'")));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn extract_text(&self, selector: Option<&str>) -> Result<String, BrowserError> {
        self.ensure_alive()?;
        match selector {
            Some(selector) => {
                let element = self.find(selector).await?;
                let text = element
                    .inner_text()
                    .await
                    .map_err(|e| BrowserError::Action(e.to_string()))?;
                Ok(text.unwrap_or_default())
            }
            None => {
                let result = self
                    .page
                    .evaluate("document.body ? document.body.innerText : ''")
                    .await
                    .map_err(|e| BrowserError::Action(e.to_string()))?;
                Ok(result.into_value::<String>().unwrap_or_default())
            }
        }
    }

    async fn page_info(&self) -> Result<PageInfo, BrowserError> {
        self.ensure_alive()?;
        self.current_info().await
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "Browser did not close cleanly");
        }
        self.handler_task.abort();
        tracing::info!("Browser session released");
        Ok(())
    }
}
