//! Sequential drivers for the two query groups.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, info_span, warn, Instrument};

use crate::metrics::{InfluxPublisher, PublishOutcome};
use crate::models::AnalyticsResult;
use crate::report::{Report, ReportSection};
use crate::scrapers::{MorizonScraper, PageSource, Query};

/// Scrape every analytics query in order, log the results and publish them
/// when a publisher is available.
pub async fn process_analytics_queries<S: PageSource>(
    scraper: &MorizonScraper<S>,
    queries: &[Query],
    publisher: Option<&InfluxPublisher>,
) -> Result<Vec<AnalyticsResult>> {
    let mut results = Vec::with_capacity(queries.len());
    for query in queries {
        let span = info_span!("analytics", city = %query.city, district = ?query.district);
        let result = scraper
            .read_for_analytics(query)
            .instrument(span)
            .await
            .with_context(|| format!("Failed to read analytics for {}", query.label()))?;
        results.push(result);
    }

    info!("Results:");
    for result in &results {
        info!("{}", result.dump());
    }

    let Some(publisher) = publisher else {
        warn!("No InfluxDB publisher available - results publication will be skipped");
        return Ok(results);
    };

    info!("Publishing results");
    let mut published = 0;
    for result in &results {
        for point in result.data_points() {
            if publisher.publish(&point).await == PublishOutcome::Published {
                published += 1;
            }
        }
    }
    info!("Published {} measurements", published);

    Ok(results)
}

/// Scrape every reporting query in order into a report stamped `timestamp`
pub async fn process_reporting_queries<S: PageSource>(
    scraper: &MorizonScraper<S>,
    queries: &[Query],
    timestamp: NaiveDateTime,
) -> Result<Report> {
    let mut sections = Vec::with_capacity(queries.len());
    for query in queries {
        let span = info_span!("reporting", city = %query.city, district = ?query.district);
        let listings = scraper
            .read_for_reporting(query)
            .instrument(span)
            .await
            .with_context(|| format!("Failed to read listings for {}", query.label()))?;
        sections.push(ReportSection {
            query: query.clone(),
            listings,
        });
    }

    Ok(Report::new(timestamp, sections))
}
