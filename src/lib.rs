//! Morizon listing scraper: average prices to InfluxDB, individual listings
//! to an HTML report.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scrapers;

pub use config::AppConfig;
pub use error::{ConfigError, LayoutError};
pub use metrics::{DataPoint, InfluxPublisher, PublishOutcome};
pub use models::{AnalyticsResult, ParamValue, ReportingResult};
pub use report::{Report, ReportSection};
pub use scrapers::{MorizonScraper, PageSource, Query};
