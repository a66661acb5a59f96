use super::{PageElement, RenderingBackend};
use crate::error::BackendError;
use crate::locator::FieldSelector;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;

/// Common local WebDriver endpoints tried when the configured one is down
const FALLBACK_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

/// Rendering backend driving a real browser through WebDriver
pub struct WebDriverBackend {
    client: Client,
    webdriver_url: String,
    session_lost: bool,
}

impl WebDriverBackend {
    /// Connects to the WebDriver server at `webdriver_url`, falling back to
    /// the usual local ports
    pub async fn connect(webdriver_url: &str) -> Result<Self, BackendError> {
        match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self {
                    client,
                    webdriver_url: webdriver_url.to_string(),
                    session_lost: false,
                });
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            }
        }

        for url in FALLBACK_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self {
                    client,
                    webdriver_url: url.to_string(),
                    session_lost: false,
                });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(BackendError::Session(format!(
            "no WebDriver server reachable at {}",
            webdriver_url
        )))
    }

    /// Ends the browser session
    pub async fn close(self) -> Result<(), BackendError> {
        self.client
            .close()
            .await
            .map_err(|e| BackendError::Command(e.to_string()))
    }

    /// Replaces a lost session with a fresh one
    async fn reconnect(&mut self) -> Result<(), BackendError> {
        ::log::warn!("Attempting to reconnect WebDriver session");
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                self.client = client;
                self.session_lost = false;
                ::log::info!("Reconnected to WebDriver");
                Ok(())
            }
            Err(e) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", e);
                Err(BackendError::Session(e.to_string()))
            }
        }
    }

    /// Maps a driver error, remembering lost sessions for the next navigation
    fn classify(&mut self, error: CmdError, selector: Option<&FieldSelector>) -> BackendError {
        if let CmdError::WaitTimeout = error {
            return BackendError::Timeout {
                selector: selector.map(|s| s.to_string()).unwrap_or_default(),
            };
        }

        let message = error.to_string();
        if message.contains("Unable to find session") || message.contains("invalid session id") {
            self.session_lost = true;
            return BackendError::Session(message);
        }

        if let Some(selector) = selector {
            if error.is_no_such_element() {
                return BackendError::Timeout {
                    selector: selector.to_string(),
                };
            }
        }

        BackendError::Command(message)
    }
}

fn to_locator(selector: &FieldSelector) -> Locator<'_> {
    match selector {
        FieldSelector::XPath(s) => Locator::XPath(s),
        FieldSelector::Css(s) => Locator::Css(s),
    }
}

impl RenderingBackend for WebDriverBackend {
    async fn navigate(&mut self, url: &str) -> Result<(), BackendError> {
        if self.session_lost {
            self.reconnect().await?;
        }

        let loaded = self.client.goto(url).await;
        match loaded {
            Ok(()) => Ok(()),
            Err(e) => match self.classify(e, None) {
                BackendError::Command(reason) => Err(BackendError::Navigation {
                    url: url.to_string(),
                    reason,
                }),
                other => {
                    ::log::warn!("Lost session while accessing {}", url);
                    Err(other)
                }
            },
        }
    }

    async fn wait_for_elements(
        &mut self,
        selector: &FieldSelector,
        timeout: Duration,
    ) -> Result<Vec<PageElement>, BackendError> {
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(to_locator(selector))
            .await;
        if let Err(e) = waited {
            return Err(self.classify(e, Some(selector)));
        }

        let found = self.client.find_all(to_locator(selector)).await;
        let found = match found {
            Ok(found) => found,
            Err(e) => return Err(self.classify(e, Some(selector))),
        };

        let mut elements = Vec::with_capacity(found.len());
        for element in found {
            let text = element.text().await;
            let href = element.attr("href").await;
            match (text, href) {
                (Ok(text), Ok(href)) => elements.push(PageElement { text, href }),
                (Err(e), _) | (_, Err(e)) => return Err(self.classify(e, Some(selector))),
            }
        }

        Ok(elements)
    }
}
