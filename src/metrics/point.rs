/// Tag value written when a tag has no value
pub const NULL_TAG_VALUE: &str = "null";

/// A single field/value measurement destined for InfluxDB
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub measurement: String,
    pub field: String,
    pub value: f64,
    /// Epoch timestamp in the publisher's precision, `None` = now
    pub timestamp: Option<i64>,
    pub tags: Vec<(String, String)>,
}

impl DataPoint {
    pub fn new(measurement: impl Into<String>, field: impl Into<String>, value: f64) -> Self {
        Self {
            measurement: measurement.into(),
            field: field.into(),
            value,
            timestamp: None,
            tags: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a tag. Missing or empty values become [`NULL_TAG_VALUE`].
    pub fn with_tag(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        let value = match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => NULL_TAG_VALUE.to_string(),
        };
        self.tags.push((key.into(), value));
        self
    }

    /// Encode as a single line-protocol record.
    ///
    /// `default_tags` come first, followed by the point's own tags. With no
    /// tags at all the tag segment is omitted entirely.
    pub fn to_line(&self, default_tags: &[(String, String)], timestamp: i64) -> String {
        let tags = default_tags
            .iter()
            .chain(self.tags.iter())
            .map(|(k, v)| format!("{}={}", escape_tag(k), escape_tag(v)))
            .collect::<Vec<_>>()
            .join(",");

        let mut line = escape_measurement(&self.measurement);
        if !tags.is_empty() {
            line.push(',');
            line.push_str(&tags);
        }
        format!(
            "{} {}={} {}",
            line,
            escape_tag(&self.field),
            self.value,
            timestamp
        )
    }
}

fn escape_measurement(value: &str) -> String {
    value.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_tags_precede_point_tags() {
        let point = DataPoint::new("mieszkania", "average_price", 500000.0).with_tag("b", Some("2"));
        assert_eq!(
            point.to_line(&tags(&[("a", "1")]), 1_700_000_000),
            "mieszkania,a=1,b=2 average_price=500000 1700000000"
        );
    }

    #[test]
    fn missing_tag_values_render_null() {
        let point = DataPoint::new("m", "f", 1.0)
            .with_tag("district", None)
            .with_tag("floor_from", Some(""));
        assert_eq!(point.to_line(&[], 5), "m,district=null,floor_from=null f=1 5");
    }

    #[test]
    fn empty_tag_set_is_dropped() {
        let point = DataPoint::new("m", "f", 12.5);
        assert_eq!(point.to_line(&[], 5), "m f=12.5 5");
    }

    #[test]
    fn special_characters_are_escaped() {
        let point = DataPoint::new("my m", "f", 3.0).with_tag("district", Some("Stare Miasto,x=y"));
        assert_eq!(
            point.to_line(&[], 1),
            "my\\ m,district=Stare\\ Miasto\\,x\\=y f=3 1"
        );
    }
}
