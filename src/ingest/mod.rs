//! Match ingestion
//!
//! Fetches tournament matches, runs role inference and persists the results.

pub mod driver;

pub use driver::{IngestReport, Ingestor};
