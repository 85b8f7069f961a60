pub mod fetch;
pub mod morizon;
pub mod parse;
pub mod traits;
pub mod types;

pub use fetch::HttpFetcher;
pub use morizon::MorizonScraper;
pub use traits::PageSource;
pub use types::{Filters, Query};
