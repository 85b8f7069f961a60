use anyhow::Result;
use tracing::{debug, info, warn};

use super::fetch::HttpFetcher;
use super::parse::{parse_listings, parse_summary};
use super::traits::PageSource;
use super::types::Query;
use crate::error::LayoutError;
use crate::models::{AnalyticsResult, ReportingResult};

/// Morizon search scraper
pub struct MorizonScraper<S = HttpFetcher> {
    source: S,
}

impl MorizonScraper<HttpFetcher> {
    /// Create a scraper that reads the live site
    pub fn new() -> Result<Self> {
        Ok(Self::with_source(HttpFetcher::new()?))
    }
}

impl<S: PageSource> MorizonScraper<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Page content for `query`; an unavailable page reads as empty
    async fn page(&self, query: &Query) -> String {
        let url = query.url();
        match self.source.fetch_page(&url).await {
            Some(body) => body,
            None => {
                warn!(
                    "No content from {} for {} - treating as no listings",
                    self.source.source_name(),
                    query.label()
                );
                String::new()
            }
        }
    }

    /// Average prices and offer count for one search
    pub async fn read_for_analytics(&self, query: &Query) -> Result<AnalyticsResult, LayoutError> {
        let html = self.page(query).await;
        let summary = parse_summary(&html)?;
        debug!("Parsed summary for {}: {:?}", query.label(), summary);

        Ok(AnalyticsResult {
            city: query.city.clone(),
            district: query.district.clone(),
            offer_type: query.offer_type.clone(),
            filters: query.filters.clone(),
            average_price: summary.average_price,
            average_price_per_squared_meter: summary.average_price_per_squared_meter,
            offers_amount: summary.offers_amount,
        })
    }

    /// Individual listings for one search, in page order
    pub async fn read_for_reporting(
        &self,
        query: &Query,
    ) -> Result<Vec<ReportingResult>, LayoutError> {
        let html = self.page(query).await;
        let listings = parse_listings(&html)?;
        info!("Found {} listings for {}", listings.len(), query.label());
        Ok(listings)
    }
}
