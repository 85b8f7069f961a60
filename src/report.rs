//! HTML report of individual listings.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};
use std::path::{Path, PathBuf};

use crate::models::ReportingResult;
use crate::scrapers::types::Query;

/// Listings found for one reporting query
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub query: Query,
    pub listings: Vec<ReportingResult>,
}

/// One run's worth of reporting results
#[derive(Debug, Clone)]
pub struct Report {
    pub timestamp: NaiveDateTime,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(timestamp: NaiveDateTime, sections: Vec<ReportSection>) -> Self {
        Self {
            timestamp,
            sections,
        }
    }

    pub fn listing_count(&self) -> usize {
        self.sections.iter().map(|s| s.listings.len()).sum()
    }

    /// Render the whole document. Listings are numbered from 1 across all
    /// sections.
    pub fn render(&self) -> String {
        let mut html = format!(
            "<h1>Report {} ({:02}:{:02})</h1>",
            self.timestamp.format("%d.%m.%Y"),
            self.timestamp.hour(),
            self.timestamp.minute()
        );

        let mut number = 1;
        for section in &self.sections {
            html.push_str(&section.query.to_html());
            for listing in &section.listings {
                html.push_str(&listing.to_html(number));
                number += 1;
            }
            html.push_str("<hr/>");
        }
        html
    }

    /// `report__YYYY_MM_DD__HH_MM.html`
    pub fn file_name(&self) -> String {
        self.timestamp
            .format("report__%Y_%m_%d__%H_%M.html")
            .to_string()
    }

    /// Write the rendered report into `dir`, creating it if needed
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.render())
            .await
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(path)
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
