use crate::error::FetchError;
use crate::parsers::PageLinks;
use async_trait::async_trait;
use url::Url;

/// A service that renders a page and hands back either its links or its readable text
///
/// Implementations report every transport, DNS, timeout or render problem as a
/// `FetchError` and never panic past this boundary.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Internal and external links found on the page
    async fn fetch_links(&self, url: &Url) -> Result<PageLinks, FetchError>;

    /// The page converted to markdown
    async fn fetch_markdown(&self, url: &Url) -> Result<String, FetchError>;
}
