use serde::{Deserialize, Serialize};

use crate::models::ParamValue;
use crate::report::escape_html;

pub const DEFAULT_MAIN_URL: &str = "https://www.morizon.pl";
pub const DEFAULT_OFFER_TYPE: &str = "mieszkania";

/// Search filters, each rendered as `ps[<name>]=<value>` when set.
///
/// Configuration keys carry a `filter_` prefix (`filter_price_from`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    /// Total price in zł (lower bound)
    #[serde(rename = "filter_price_from", skip_serializing_if = "Option::is_none")]
    pub price_from: Option<ParamValue>,
    /// Living area in m2 (lower bound)
    #[serde(rename = "filter_living_area_from", skip_serializing_if = "Option::is_none")]
    pub living_area_from: Option<ParamValue>,
    /// Number of rooms (lower bound)
    #[serde(rename = "filter_number_of_rooms_from", skip_serializing_if = "Option::is_none")]
    pub number_of_rooms_from: Option<ParamValue>,
    /// Floor (lower bound)
    #[serde(rename = "filter_floor_from", skip_serializing_if = "Option::is_none")]
    pub floor_from: Option<ParamValue>,
    /// Building type code, e.g. 247 for a tenement house
    #[serde(rename = "filter_dict_building_type", skip_serializing_if = "Option::is_none")]
    pub dict_building_type: Option<ParamValue>,
    /// Days since publication: 1, 3, 7, 30, 90 or 180
    #[serde(rename = "filter_date_filter", skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<ParamValue>,
    /// 1 = only offers with a price
    #[serde(rename = "filter_with_price", skip_serializing_if = "Option::is_none")]
    pub with_price: Option<ParamValue>,
}

impl Filters {
    /// Every declared filter in URL order, set or not
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&ParamValue>)> {
        [
            ("price_from", self.price_from.as_ref()),
            ("living_area_from", self.living_area_from.as_ref()),
            ("number_of_rooms_from", self.number_of_rooms_from.as_ref()),
            ("floor_from", self.floor_from.as_ref()),
            ("dict_building_type", self.dict_building_type.as_ref()),
            ("date_filter", self.date_filter.as_ref()),
            ("with_price", self.with_price.as_ref()),
        ]
        .into_iter()
    }

    /// Only the filters with a non-zero, non-empty value
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.iter()
            .filter_map(|(name, value)| value.filter(|v| v.is_set()).map(|v| (name, v)))
    }
}

/// One configured search on the listing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QueryDefinition")]
pub struct Query {
    pub city: String,
    pub district: Option<String>,
    pub offer_type: String,
    pub main_url: String,
    #[serde(flatten)]
    pub filters: Filters,
}

/// A query as written in the configuration file. Unknown keys are rejected
/// so a misspelled filter fails loudly instead of being dropped.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QueryDefinition {
    city: String,
    #[serde(default)]
    district: Option<String>,
    #[serde(default = "default_offer_type")]
    offer_type: String,
    #[serde(default = "default_main_url")]
    main_url: String,
    #[serde(default)]
    filter_price_from: Option<ParamValue>,
    #[serde(default)]
    filter_living_area_from: Option<ParamValue>,
    #[serde(default)]
    filter_number_of_rooms_from: Option<ParamValue>,
    #[serde(default)]
    filter_floor_from: Option<ParamValue>,
    #[serde(default)]
    filter_dict_building_type: Option<ParamValue>,
    #[serde(default)]
    filter_date_filter: Option<ParamValue>,
    #[serde(default)]
    filter_with_price: Option<ParamValue>,
}

impl From<QueryDefinition> for Query {
    fn from(definition: QueryDefinition) -> Self {
        Self {
            city: definition.city,
            district: definition.district,
            offer_type: definition.offer_type,
            main_url: definition.main_url,
            filters: Filters {
                price_from: definition.filter_price_from,
                living_area_from: definition.filter_living_area_from,
                number_of_rooms_from: definition.filter_number_of_rooms_from,
                floor_from: definition.filter_floor_from,
                dict_building_type: definition.filter_dict_building_type,
                date_filter: definition.filter_date_filter,
                with_price: definition.filter_with_price,
            },
        }
    }
}

fn default_offer_type() -> String {
    DEFAULT_OFFER_TYPE.to_string()
}

fn default_main_url() -> String {
    DEFAULT_MAIN_URL.to_string()
}

impl Query {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            district: None,
            offer_type: default_offer_type(),
            main_url: default_main_url(),
            filters: Filters::default(),
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_offer_type(mut self, offer_type: impl Into<String>) -> Self {
        self.offer_type = offer_type.into();
        self
    }

    pub fn with_main_url(mut self, main_url: impl Into<String>) -> Self {
        self.main_url = main_url.into();
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    fn district(&self) -> Option<&str> {
        self.district.as_deref().filter(|d| !d.is_empty())
    }

    /// Search results URL:
    /// `<main_url>/<offer_type>/<city>[/<district>]/?ps%5B<name>%5D=<value>&...`
    pub fn url(&self) -> String {
        let district = self.district().map(|d| format!("/{}", d)).unwrap_or_default();
        let filters = self
            .filters
            .active()
            .map(|(name, value)| format!("ps%5B{}%5D={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/{}/{}{}/?{}",
            self.main_url.trim_end_matches('/'),
            self.offer_type,
            self.city,
            district,
            filters
        )
    }

    /// Short label for logs, e.g. `mieszkania warszawa [mokotow]`
    pub fn label(&self) -> String {
        match self.district() {
            Some(d) => format!("{} {} [{}]", self.offer_type, self.city, d),
            None => format!("{} {}", self.offer_type, self.city),
        }
    }

    /// Heading block listing the search parameters, used in the report
    pub fn to_html(&self) -> String {
        let mut html = format!("<h2>{}</h2>", escape_html(&self.label()));

        let filters: String = self
            .filters
            .active()
            .map(|(name, value)| {
                format!(
                    "<li>{}: {}</li>",
                    name,
                    escape_html(&value.to_string())
                )
            })
            .collect();
        if !filters.is_empty() {
            html.push_str(&format!("<ul>{}</ul>", filters));
        }

        let url = escape_html(&self.url());
        html.push_str(&format!("<p><a href=\"{}\">{}</a></p>", url, url));
        html
    }
}
