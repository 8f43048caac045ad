//! Shared helpers

pub mod datetime;

pub use datetime::{TimeZone, XmpDateTime};
