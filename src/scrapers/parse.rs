//! Field extraction from morizon.pl search result pages.
//!
//! The page text is Polish and the numbers are locale formatted
//! (`500 000 zł`), so extraction splits on known phrases and then keeps
//! only the digits.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::error::LayoutError;
use crate::models::ReportingResult;

/// Prefix of the location summary link ("average price")
pub const TEXT_AVERAGE_PRICE: &str = "średnia cena";
/// Listing header reads `Znaleziono <n> ogłoszeń` ("found <n> listings")
pub const TEXT_LISTING_HEADER_BEGINNING: &str = "Znaleziono";
pub const TEXT_LISTING_HEADER_END: &str = "ogłosz";
const TEXT_CURRENCY: &str = "zł";

static LOCATION_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a#locationPageLink").expect("valid selector"));
static LISTING_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.listing-header__description").expect("valid selector"));
static PROPERTY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.property-url").expect("valid selector"));
static LISTING_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".single-result__title").expect("valid selector"));
static LISTING_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[itemprop="price"]"#).expect("valid selector"));

/// Aggregate numbers read from a results page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceSummary {
    /// `None` when the page has no location summary
    pub average_price: Option<u64>,
    pub average_price_per_squared_meter: Option<u64>,
    pub offers_amount: u64,
}

/// Keep only the decimal digits of `value` and parse them.
///
/// Deliberately lossy: separators and decimal points are dropped, so
/// `"12.5"` reads as 125. Anything unparsable is 0.
pub fn to_int(value: &str) -> u64 {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Read average prices and the offer count from a results page
pub fn parse_summary(html: &str) -> Result<PriceSummary, LayoutError> {
    let document = Html::parse_document(html);

    let (average_price, average_price_per_squared_meter) =
        match document.select(&LOCATION_LINK).next() {
            Some(link) => {
                let (price, per_area) = parse_location_link(&element_text(link))?;
                (Some(price), Some(per_area))
            }
            None => (None, None),
        };

    let offers_amount = document
        .select(&LISTING_HEADER)
        .last()
        .map(|p| parse_listing_header(&element_text(p)))
        .unwrap_or(0);

    Ok(PriceSummary {
        average_price,
        average_price_per_squared_meter,
        offers_amount,
    })
}

/// `średnia cena 500 000 zł (10 000 zł/m2)` -> (500000, 10000)
fn parse_location_link(text: &str) -> Result<(u64, u64), LayoutError> {
    let text = text.trim();
    let rest = text
        .strip_prefix(TEXT_AVERAGE_PRICE)
        .ok_or_else(|| LayoutError::UnexpectedSummaryText {
            expected: TEXT_AVERAGE_PRICE,
            text: text.to_string(),
        })?;

    let price = rest.split(TEXT_CURRENCY).next().unwrap_or_default();
    let (_, per_area) = rest
        .split_once('(')
        .ok_or_else(|| LayoutError::MissingPerAreaPrice(text.to_string()))?;
    let per_area = per_area.split(TEXT_CURRENCY).next().unwrap_or_default();

    Ok((to_int(price), to_int(per_area)))
}

/// `Znaleziono 42 ogłoszeń` -> 42
fn parse_listing_header(text: &str) -> u64 {
    let count = text
        .rsplit(TEXT_LISTING_HEADER_BEGINNING)
        .next()
        .unwrap_or_default()
        .split(TEXT_LISTING_HEADER_END)
        .next()
        .unwrap_or_default();
    to_int(count)
}

/// Read every listing on a results page, in page order
pub fn parse_listings(html: &str) -> Result<Vec<ReportingResult>, LayoutError> {
    let document = Html::parse_document(html);

    document
        .select(&PROPERTY_LINK)
        .enumerate()
        .map(|(index, link)| {
            let missing = |field| LayoutError::MissingListingField { index, field };

            let url = link.value().attr("href").ok_or_else(|| missing("href"))?;
            let title = link
                .select(&LISTING_TITLE)
                .next()
                .map(element_text)
                .ok_or_else(|| missing("title"))?;
            let price = link
                .select(&LISTING_PRICE)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .ok_or_else(|| missing("price"))?;

            Ok(ReportingResult::new(url, &title, price))
        })
        .collect()
}
