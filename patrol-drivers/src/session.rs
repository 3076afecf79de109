//! Ownership of the one live WebDriver session.

use std::collections::HashMap;

use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;
use webdriver::capabilities::Capabilities;

use crate::error::{classify, DriverError};
use crate::page::PatrolPage;
use crate::retry::RetryPolicy;

/// How to reach the browser-control endpoint and what window mode to ask for.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Address of a running WebDriver service (chromedriver).
    pub webdriver_url: String,
    /// Run without a visible window. Off by default so an operator can watch
    /// the pass happen.
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
        }
    }
}

/// The long-lived handle to the browser and its navigation context.
///
/// Exactly one of these is live at a time. It is created once at process
/// start, survives every polling pass, and is recovered in place with
/// [`BrowserSession::refresh`] rather than recreated.
pub struct BrowserSession {
    client: Client,
    base_url: Url,
}

impl BrowserSession {
    /// Launch a session and navigate to `base_url`, retrying the whole
    /// connect-and-navigate sequence on failure.
    ///
    /// Exhausting the budget is [`DriverError::DriverStartFailed`], fatal to
    /// the process, not something the polling loop recovers from.
    #[instrument(skip(options, policy))]
    pub async fn start(
        base_url: &str,
        options: &BrowserOptions,
        policy: RetryPolicy,
    ) -> Result<Self, DriverError> {
        let base_url = Url::parse(base_url)?;
        let attempts = policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            match Self::connect_and_navigate(&base_url, options).await {
                Ok(client) => {
                    info!(url = %base_url, attempt, "browser session started");
                    return Ok(Self { client, base_url });
                }
                Err(err) => {
                    warn!(attempt, error = %err, "webdriver start failed");
                    if attempt < attempts {
                        sleep(policy.backoff).await;
                    }
                }
            }
        }

        Err(DriverError::DriverStartFailed { attempts })
    }

    async fn connect_and_navigate(
        base_url: &Url,
        options: &BrowserOptions,
    ) -> Result<Client, DriverError> {
        let caps = chrome_capabilities(options.headless);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| DriverError::DriverUnavailable(e.to_string()))?;

        if let Err(e) = client.goto(base_url.as_str()).await {
            // Don't leak a half-started session into the next attempt.
            let _ = client.clone().close().await;
            return Err(classify("navigate to base url", e));
        }
        Ok(client)
    }

    /// Reload the current page in place. This is the recovery action after a
    /// failed pass: same handle, same `base_url`, no re-authentication, and
    /// calling it twice leaves the session exactly where one call did.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), DriverError> {
        self.client
            .refresh()
            .await
            .map_err(|e| classify("refresh", e))
    }

    /// The page the session was started against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A page wrapper sharing this session's handle.
    pub fn page(&self) -> PatrolPage {
        PatrolPage::new(self.client.clone())
    }

    /// End the WebDriver session.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await.map_err(|e| classify("close", e))
    }
}

fn chrome_capabilities(headless: bool) -> Capabilities {
    let mut caps = Capabilities::new();
    let mut chrome_opts = HashMap::new();

    let mut args = vec![json!("--no-sandbox")];
    if headless {
        args.push(json!("--headless"));
        args.push(json!("--disable-gpu"));
    }
    chrome_opts.insert("args".to_string(), json!(args));

    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_bypass_is_always_requested() {
        let caps = chrome_capabilities(false);
        let args = &caps["goog:chromeOptions"]["args"];
        assert_eq!(args, &json!(["--no-sandbox"]));
    }

    #[test]
    fn headless_appends_window_args() {
        let caps = chrome_capabilities(true);
        let args = &caps["goog:chromeOptions"]["args"];
        assert_eq!(
            args,
            &json!(["--no-sandbox", "--headless", "--disable-gpu"])
        );
    }
}
