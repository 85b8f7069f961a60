use anyhow::Context;
use chrono::Local;
use morizon_scout::config::{self, AppConfig};
use morizon_scout::metrics::InfluxPublisher;
use morizon_scout::pipeline::{process_analytics_queries, process_reporting_queries};
use morizon_scout::scrapers::MorizonScraper;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Morizon Scout");

    let config_path = config::config_path();
    info!("Configuration file path: {}", config_path.display());

    let mut configuration = AppConfig::load(&config_path)?;
    configuration
        .influx
        .apply_env_overrides(|name| std::env::var(name).ok())?;
    info!(
        "Configuration:\n{}",
        configuration
            .redacted_json()
            .context("Failed to serialize configuration")?
    );

    let publisher = if configuration.influx.is_complete() {
        Some(InfluxPublisher::new(configuration.influx.clone())?)
    } else {
        warn!("InfluxDB configuration is not complete - results will not be published");
        None
    };

    let scraper = MorizonScraper::new()?;

    let analytics = &configuration.queries.analytics;
    info!("Processing analytics queries");
    info!("There are {} analytics queries defined", analytics.len());
    process_analytics_queries(&scraper, analytics, publisher.as_ref()).await?;

    let reporting = &configuration.queries.reporting;
    info!("Processing reporting queries");
    info!("There are {} reporting queries defined", reporting.len());
    let report = process_reporting_queries(&scraper, reporting, Local::now().naive_local()).await?;

    let path = report.write_to(&config::reports_dir()).await?;
    info!(
        "💾 Saved report with {} listings to {}",
        report.listing_count(),
        path.display()
    );

    Ok(())
}
