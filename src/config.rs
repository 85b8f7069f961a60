//! YAML configuration with environment variable overrides.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::metrics::Precision;
use crate::models::ParamValue;
use crate::scrapers::types::Query;

pub const CONFIG_PATH_ENV: &str = "MORIZON_ANALYZER_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const REPORTS_DIR_ENV: &str = "MORIZON_ANALYZER_REPORTS_DIR";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

pub const INFLUXDB_HOST_ENV: &str = "INFLUXDB_HOST";
pub const INFLUXDB_PORT_ENV: &str = "INFLUXDB_PORT";
pub const INFLUXDB_DB_ENV: &str = "INFLUXDB_DB";
pub const INFLUXDB_USER_ENV: &str = "INFLUXDB_USER";
pub const INFLUXDB_PASSWORD_ENV: &str = "INFLUXDB_PASSWORD";

pub const DEFAULT_INFLUX_PORT: u16 = 8086;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub influx: InfluxSettings,
    #[serde(default)]
    pub queries: QueryGroups,
}

/// Searches split by what they are used for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryGroups {
    /// Aggregate statistics, published to InfluxDB
    #[serde(default)]
    pub analytics: Vec<Query>,
    /// Individual listings, rendered into the HTML report
    #[serde(default)]
    pub reporting: Vec<Query>,
}

/// InfluxDB connection settings. Every field may be missing; an incomplete
/// set only disables publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxSettings {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub precision: Precision,
    /// Tags added to every published point, in configured order
    #[serde(default)]
    pub tags: IndexMap<String, ParamValue>,
}

fn default_port() -> Option<u16> {
    Some(DEFAULT_INFLUX_PORT)
}

impl Default for InfluxSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            database: None,
            user: None,
            password: None,
            precision: Precision::default(),
            tags: IndexMap::new(),
        }
    }
}

impl InfluxSettings {
    /// Override fields from the `INFLUXDB_*` variables. Unset or empty
    /// variables leave the configured value alone.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(host) = get(INFLUXDB_HOST_ENV) {
            self.host = Some(host);
        }
        if let Some(port) = get(INFLUXDB_PORT_ENV) {
            let parsed = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            self.port = Some(parsed);
        }
        if let Some(database) = get(INFLUXDB_DB_ENV) {
            self.database = Some(database);
        }
        if let Some(user) = get(INFLUXDB_USER_ENV) {
            self.user = Some(user);
        }
        if let Some(password) = get(INFLUXDB_PASSWORD_ENV) {
            self.password = Some(password);
        }
        Ok(())
    }

    /// Host and database are both required to publish anything
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.host) && present(&self.database)
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Pretty JSON for the startup log, with the password masked
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut redacted = self.clone();
        if redacted.influx.password.is_some() {
            redacted.influx.password = Some("***".to_string());
        }
        serde_json::to_string_pretty(&redacted)
    }
}

/// Configuration file path, from `MORIZON_ANALYZER_CONFIG_PATH` or the default
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Directory reports are written to
pub fn reports_dir() -> PathBuf {
    std::env::var(REPORTS_DIR_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONFIG: &str = r#"
influx:
  host: localhost
  database: morizon
  tags:
    source: morizon
    version: 2
queries:
  analytics:
    - city: warszawa
      district: mokotow
      filter_price_from: 300000
      filter_dict_building_type: "247"
    - city: krakow
      offer_type: domy
  reporting:
    - city: gdansk
      filter_with_price: 1
"#;

    #[test]
    fn parses_full_document() {
        let config = AppConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(config.influx.host.as_deref(), Some("localhost"));
        assert_eq!(config.influx.port, Some(8086));
        assert_eq!(config.influx.precision, Precision::Seconds);
        assert_eq!(config.influx.tags["version"], ParamValue::Number(2));

        let analytics = &config.queries.analytics;
        assert_eq!(analytics.len(), 2);
        assert_eq!(analytics[0].district.as_deref(), Some("mokotow"));
        assert_eq!(analytics[0].offer_type, "mieszkania");
        assert_eq!(
            analytics[0].filters.price_from,
            Some(ParamValue::Number(300000))
        );
        assert_eq!(
            analytics[0].filters.dict_building_type,
            Some(ParamValue::Text("247".to_string()))
        );
        assert_eq!(analytics[1].offer_type, "domy");
        assert_eq!(config.queries.reporting[0].city, "gdansk");
    }

    #[test]
    fn empty_document_sections_default() {
        let config = AppConfig::from_yaml("queries: {}").unwrap();
        assert!(config.queries.analytics.is_empty());
        assert!(config.queries.reporting.is_empty());
        assert!(!config.influx.is_complete());
    }

    #[test]
    fn query_without_city_is_rejected() {
        let err = AppConfig::from_yaml("queries:\n  analytics:\n    - district: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn float_and_bool_filters_are_accepted() {
        let config = AppConfig::from_yaml(
            "queries:\n  analytics:\n    - city: warszawa\n      filter_living_area_from: 40.5\n      filter_with_price: true\n      filter_floor_from: false\n",
        )
        .unwrap();
        let query = &config.queries.analytics[0];
        assert_eq!(query.filters.living_area_from, Some(ParamValue::Float(40.5)));
        assert_eq!(query.filters.with_price, Some(ParamValue::Bool(true)));
        assert_eq!(
            query.url(),
            "https://www.morizon.pl/mieszkania/warszawa/?ps%5Bliving_area_from%5D=40.5&ps%5Bwith_price%5D=1"
        );
    }

    #[test]
    fn misspelled_filter_is_rejected() {
        let err = AppConfig::from_yaml(
            "queries:\n  analytics:\n    - city: warszawa\n      filter_price_form: 300000\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("filter_price_form"));
    }

    #[test]
    fn precision_is_validated() {
        let config = AppConfig::from_yaml("influx:\n  precision: ms\n").unwrap();
        assert_eq!(config.influx.precision, Precision::Milliseconds);

        let err = AppConfig::from_yaml("influx:\n  precision: days\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_tags_keep_configured_order() {
        let config =
            AppConfig::from_yaml("influx:\n  tags:\n    zone: eu\n    app: scout\n    build: 3\n")
                .unwrap();
        let keys: Vec<_> = config.influx.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zone", "app", "build"]);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            (INFLUXDB_HOST_ENV, "influx.internal"),
            (INFLUXDB_PORT_ENV, "9999"),
            (INFLUXDB_USER_ENV, "scout"),
            (INFLUXDB_DB_ENV, ""),
        ]
        .into_iter()
        .collect();

        let mut settings = AppConfig::from_yaml(CONFIG).unwrap().influx;
        settings
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.host.as_deref(), Some("influx.internal"));
        assert_eq!(settings.port, Some(9999));
        assert_eq!(settings.user.as_deref(), Some("scout"));
        // empty variable keeps the configured database
        assert_eq!(settings.database.as_deref(), Some("morizon"));
        assert!(settings.is_complete());
    }

    #[test]
    fn invalid_port_override_is_an_error() {
        let mut settings = InfluxSettings::default();
        let err = settings
            .apply_env_overrides(|k| (k == INFLUXDB_PORT_ENV).then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "http"));
    }

    #[test]
    fn incomplete_without_database() {
        let settings = InfluxSettings {
            host: Some("localhost".to_string()),
            ..InfluxSettings::default()
        };
        assert!(!settings.is_complete());
    }

    #[test]
    fn redacts_password() {
        let mut config = AppConfig::default();
        config.influx.password = Some("hunter2".to_string());
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("***"));
    }
}
