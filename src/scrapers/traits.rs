use async_trait::async_trait;

/// Where search result pages come from.
/// Lets the scraper run against the live site or a fixture.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url`. `None` means no usable content; callers
    /// treat it the same as a page without listings.
    async fn fetch_page(&self, url: &str) -> Option<String>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}
