//! Chromium sessions over the DevTools protocol.

use crate::error::ScrapeError;
use crate::trendyol::session::{LaunchOptions, PageSession, SessionLauncher, WaitOutcome};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Hides `navigator.webdriver` before any page script runs.
const HIDE_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// Finds a Chromium binary: `TRENDYOL_CHROME_PATH`, then the usual names on
/// `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("TRENDYOL_CHROME_PATH") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    ["google-chrome", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Launches one Chromium process per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn PageSession>, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .arg("--incognito")
            .arg(format!("--lang={}", options.locale));
        // Without a known binary chromiumoxide runs its own detection.
        if let Some(chrome_path) = options.chrome_path.clone().or_else(find_chromium) {
            debug!("Launching {}", chrome_path.display());
            builder = builder.chrome_executable(chrome_path);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        for arg in &options.args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder.build().map_err(ScrapeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let mut session = ChromiumSession { browser, page: None, handler };
        match session.open_page(options).await {
            Ok(page) => {
                session.page = Some(page);
                Ok(Box::new(session))
            }
            Err(e) => {
                session.shutdown().await;
                Err(e)
            }
        }
    }
}

/// A browser process with a single page.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    async fn open_page(&self, options: &LaunchOptions) -> Result<Page, ScrapeError> {
        let launch_err = |e: chromiumoxide::error::CdpError| ScrapeError::Launch(e.to_string());

        let page = self.browser.new_page("about:blank").await.map_err(launch_err)?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(options.user_agent.as_str())
            .accept_language(options.locale.as_str())
            .build()
            .map_err(ScrapeError::Launch)?;
        page.execute(user_agent).await.map_err(launch_err)?;

        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(HIDE_WEBDRIVER))
            .await
            .map_err(launch_err)?;

        Ok(page)
    }

    fn page(&self) -> Result<&Page, ScrapeError> {
        self.page.as_ref().ok_or_else(|| ScrapeError::Navigation("page is closed".to_string()))
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        script: String,
    ) -> Result<T, ScrapeError> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::interaction(action, e))?
            .into_value()
            .map_err(|e| ScrapeError::interaction(action, e))
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
    }
}

/// Encodes `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let page = self.page()?;

        // One budget covers the navigation request and the readiness wait.
        tokio::time::timeout(timeout, async {
            let response = page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
            if let Some(error) = &response.result.error_text {
                return Err(ScrapeError::Navigation(format!("{url}: {error}")));
            }

            // DOMContentLoaded has fired once readyState leaves "loading".
            let ready = "document.URL !== 'about:blank' && document.readyState !== 'loading'";
            loop {
                // Evaluation fails while the old document is being replaced.
                if let Ok(true) = self.evaluate::<bool>("navigate", ready.to_string()).await {
                    return Ok::<(), ScrapeError>(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| ScrapeError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })?
    }

    async fn wait_for_attached(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<WaitOutcome, ScrapeError> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));

        let attached = tokio::time::timeout(timeout, async {
            loop {
                if let Ok(true) = self.evaluate::<bool>("wait", script.clone()).await {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        Ok(match attached {
            Ok(()) => WaitOutcome::Attached,
            Err(_) => WaitOutcome::TimedOut,
        })
    }

    async fn click(&self, selector: &str) -> Result<(), ScrapeError> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::interaction("click", e))?;
        element.click().await.map_err(|e| ScrapeError::interaction("click", e))?;
        Ok(())
    }

    async fn select_option_by_label(
        &self,
        selector: &str,
        label: &str,
    ) -> Result<(), ScrapeError> {
        let script = format!(
            r#"(() => {{
                const select = document.querySelector({selector});
                if (!select) return false;
                const option = Array.from(select.options).find(o => o.label === {label} || o.text.trim() === {label});
                if (!option) return false;
                select.value = option.value;
                select.dispatchEvent(new Event('input', {{ bubbles: true }}));
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = js_string(selector),
            label = js_string(label),
        );

        if self.evaluate::<bool>("select", script).await? {
            Ok(())
        } else {
            Err(ScrapeError::interaction("select", format!("no option '{label}' in {selector}")))
        }
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.textContent : null; }})()",
            js_string(selector)
        );
        self.evaluate("text_content", script).await
    }

    async fn close(self: Box<Self>) -> Result<(), ScrapeError> {
        let mut session = *self;
        if let Some(page) = session.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }
        session.shutdown().await;
        Ok(())
    }
}
