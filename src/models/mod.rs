use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::DataPoint;
use crate::report::escape_html;
use crate::scrapers::types::Filters;

/// Measurement field names published for every analytics result
pub const FIELD_AVERAGE_PRICE: &str = "average_price";
pub const FIELD_AVERAGE_PRICE_PER_SQUARED_METER: &str = "average_price_per_squared_meter";
pub const FIELD_OFFERS_AMOUNT: &str = "offers_amount";

/// A configured scalar: filter values and tag values can be written as
/// booleans, integers, floats or strings in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Zero, `false` and the empty string count as "not set"
    pub fn is_set(&self) -> bool {
        match self {
            ParamValue::Bool(b) => *b,
            ParamValue::Number(n) => *n != 0,
            ParamValue::Float(x) => *x != 0.0,
            ParamValue::Text(s) => !s.is_empty(),
        }
    }
}

/// Booleans render as the site's `1`/`0` flags
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Aggregate statistics read from one search results page.
///
/// `None` averages mean the page had no location summary at all, which is
/// different from a summary that reports zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsResult {
    pub city: String,
    pub district: Option<String>,
    pub offer_type: String,
    pub filters: Filters,
    pub average_price: Option<u64>,
    pub average_price_per_squared_meter: Option<u64>,
    pub offers_amount: u64,
}

impl AnalyticsResult {
    /// One-line human readable summary used in the log
    pub fn dump(&self) -> String {
        let district = match self.district.as_deref() {
            Some(d) if !d.is_empty() => format!(" [{}]", d),
            _ => String::new(),
        };
        format!(
            "{} {}{}: {} zł ({} zł/m2) [{}]",
            self.offer_type,
            self.city,
            district,
            display_or_na(self.average_price),
            display_or_na(self.average_price_per_squared_meter),
            self.offers_amount
        )
    }

    /// Dimensional tags attached to every published measurement.
    ///
    /// Every declared filter is present, unset ones carry the `null` sentinel
    /// so series stay comparable across configuration changes.
    pub fn tags(&self) -> Vec<(String, Option<String>)> {
        let mut tags = vec![
            ("city".to_string(), Some(self.city.clone())),
            ("district".to_string(), self.district.clone()),
        ];
        for (name, value) in self.filters.iter() {
            let value = value.filter(|v| v.is_set()).map(ToString::to_string);
            tags.push((name.to_string(), value));
        }
        tags
    }

    /// The measurements to publish. Absent averages produce no point at all.
    pub fn data_points(&self) -> Vec<DataPoint> {
        let fields = [
            (FIELD_AVERAGE_PRICE, self.average_price),
            (
                FIELD_AVERAGE_PRICE_PER_SQUARED_METER,
                self.average_price_per_squared_meter,
            ),
            (FIELD_OFFERS_AMOUNT, Some(self.offers_amount)),
        ];

        let tags = self.tags();
        fields
            .into_iter()
            .filter_map(|(field, value)| {
                let value = value?;
                let point = tags.iter().fold(
                    DataPoint::new(&self.offer_type, field, value as f64),
                    |point, (key, tag)| point.with_tag(key, tag.as_deref()),
                );
                Some(point)
            })
            .collect()
    }
}

fn display_or_na(value: Option<u64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// A single listing row found on a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingResult {
    pub url: String,
    pub title: String,
    pub price: String,
}

impl ReportingResult {
    pub fn new(url: impl Into<String>, title: &str, price: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: normalize_title(title),
            price: price.into(),
        }
    }

    pub fn dump(&self) -> String {
        format!("{} - {} zł ({})", self.title, self.price, self.url)
    }

    /// Render as a numbered report block. `number` runs across the whole
    /// report, not per query.
    pub fn to_html(&self, number: usize) -> String {
        let url = escape_html(&self.url);
        format!(
            "<div class=\"listing\"><h3>{}. {}</h3><p>Price: {} zł</p><p><a href=\"{}\">{}</a></p></div>",
            number,
            escape_html(&self.title),
            escape_html(&self.price),
            url,
            url
        )
    }
}

/// Strip surrounding whitespace and non-breaking spaces from a listing title
fn normalize_title(title: &str) -> String {
    title
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
