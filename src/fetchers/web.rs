use crate::config::FinderConfig;
use crate::error::FetchError;
use crate::fetchers::PageFetcher;
use crate::parsers::{self, PageLinks};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// WebDriver servers tried when the configured one does not answer
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Page fetcher that renders pages in a browser driven over WebDriver
///
/// The browser session is opened lazily on the first fetch and reused for the
/// rest of the run. A lost session is reconnected once per page.
pub struct WebDriverFetcher {
    webdriver_url: String,
    page_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: impl Into<String>, page_timeout_secs: u64) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            page_timeout: Duration::from_secs(page_timeout_secs),
            client: Mutex::new(None),
        }
    }

    pub fn from_config(config: &FinderConfig) -> Self {
        Self::new(&config.webdriver_url, config.page_timeout_secs)
    }

    /// Ends the browser session, if one was opened
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    /// Loads the page and returns its source with the URL the browser ended up on
    async fn page_source(&self, url: &Url) -> Result<(String, Url), FetchError> {
        let started = Instant::now();
        let mut guard = self.client.lock().await;
        let mut reconnected = false;

        loop {
            let client = match guard.as_ref() {
                Some(client) => client.clone(),
                None => {
                    let client = connect_to_webdriver(&self.webdriver_url).await?;
                    *guard = Some(client.clone());
                    client
                }
            };

            match timeout(self.page_timeout, load(&client, url)).await {
                Ok(Ok(page)) => {
                    ::log::debug!(
                        "Loaded {} in {:.2} seconds",
                        url,
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(page);
                }
                Ok(Err(e)) if !reconnected && is_lost_session(&e) => {
                    ::log::warn!("Lost WebDriver session while loading {}, reconnecting", url);
                    *guard = None;
                    reconnected = true;
                }
                Ok(Err(e)) => {
                    ::log::error!("Failed to load {}: {}", url, e);
                    return Err(FetchError::Navigation {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    ::log::error!("Timeout loading: {}", url);
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                        secs: self.page_timeout.as_secs(),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch_links(&self, url: &Url) -> Result<PageLinks, FetchError> {
        let (html, base) = self.page_source(url).await?;
        let links = parsers::html::extract_links(&html, &base);
        ::log::info!("Found {} links in {}", links.len(), url);
        Ok(links)
    }

    async fn fetch_markdown(&self, url: &Url) -> Result<String, FetchError> {
        let (html, base) = self.page_source(url).await?;
        let markdown = parsers::markdown::render(&html, &base);
        ::log::info!("Rendered {} characters of markdown for {}", markdown.len(), url);
        Ok(markdown)
    }
}

/// Navigates and reads the rendered source
async fn load(client: &Client, url: &Url) -> Result<(String, Url), fantoccini::error::CmdError> {
    client.goto(url.as_str()).await?;
    let source = client.source().await?;

    // Links resolve against the post-redirect location
    let base = match client.current_url().await {
        Ok(current) => Url::parse(current.as_str()).unwrap_or_else(|_| url.clone()),
        Err(_) => url.clone(),
    };

    Ok((source, base))
}

fn is_lost_session(error: &fantoccini::error::CmdError) -> bool {
    let message = error.to_string();
    message.contains("Unable to find session") || message.contains("invalid session id")
}

/// Connects to the WebDriver instance, falling back to common local ports
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, FetchError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );

    let mut tried = vec![webdriver_url];
    tried.extend(FALLBACK_WEBDRIVER_URLS.iter().filter(|u| **u != webdriver_url));
    Err(FetchError::Connect(tried.join(", ")))
}
