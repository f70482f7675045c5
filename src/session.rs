//! Browser lifecycle and the CDP-backed driver implementation.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Element;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::driver::{Driver, Locator};
use crate::error::{LoginError, Result};

const CLICKABLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A live browser: the Chrome process, the task draining its CDP event
/// stream, and the single page the workflow drives.
///
/// [`close`](Driver::close) is expected exactly once per launch; the handle
/// must not be used afterwards.
pub struct BrowserSession {
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
    page: chromiumoxide::Page,
}

impl BrowserSession {
    /// Launches a new browser and opens a blank page.
    pub async fn launch(headed: bool) -> Result<Self> {
        let chrome = find_chrome().ok_or_else(|| {
            LoginError::BrowserLaunch(
                "Chrome/Chromium not found; install one or put it on PATH".to_string(),
            )
        })?;
        debug!(target = "vglogin", chrome = %chrome, headed, "launching browser");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&chrome)
            .viewport(None)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if headed {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(LoginError::BrowserLaunch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LoginError::BrowserLaunch(e.to_string()))?;
        let handler_task =
            tokio::spawn(async move { while (handler.next().await).is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Launch already succeeded; do not leak the process.
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(LoginError::BrowserLaunch(e.to_string()));
            }
        };

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler_task,
            page,
        })
    }

    async fn find(&self, locator: &Locator) -> Result<Element> {
        self.page
            .find_element(locator.as_css())
            .await
            .map_err(|_| LoginError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    /// Selenium's "clickable": present, not disabled, not hidden.
    async fn is_clickable(&self, locator: &Locator) -> Result<bool> {
        let probe = format!(
            r#"(function() {{
                const el = {lookup};
                if (!el) return false;
                const style = window.getComputedStyle(el);
                return !el.disabled && style.display !== 'none' && style.visibility !== 'hidden';
            }})()"#,
            lookup = locator.as_js_lookup()
        );
        let value: serde_json::Value = self.page.evaluate(probe).await?.into_value()?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl Driver for BrowserSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| LoginError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| LoginError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })?;
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find(locator).await?;
        // Focus before typing; the form ignores keystrokes otherwise.
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.find(locator).await?.click().await?;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        let element = self.find(locator).await?;
        let text = element.inner_text().await?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn wait_clickable(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_clickable(locator).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(LoginError::Timeout {
                    ms: timeout.as_millis() as u64,
                    condition: format!("clickable: {locator}"),
                });
            }
            tokio::time::sleep(CLICKABLE_POLL_INTERVAL).await;
        }
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            debug!(target = "vglogin", "closing browser");
            browser.close().await?;
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Backstop if close was never reached: stop draining CDP events so
        // the runtime can shut down.
        self.handler_task.abort();
    }
}

/// Locates a Chrome or Chromium executable.
fn find_chrome() -> Option<String> {
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(output) = std::process::Command::new("which").arg(name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    candidates
        .iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(|candidate| candidate.to_string())
}
