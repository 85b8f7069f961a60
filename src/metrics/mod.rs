//! InfluxDB publication of analytics results.

pub mod point;
pub mod publisher;

pub use point::{DataPoint, NULL_TAG_VALUE};
pub use publisher::{InfluxPublisher, Precision, PublishOutcome, SkipReason};
