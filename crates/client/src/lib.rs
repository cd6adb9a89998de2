//! Dataset API client.
//!
//! Builds `/api/v1/datasets/<SOURCE>/<TABLE>.json` requests, performs a
//! single blocking GET and extracts the column names and data rows.
//!
//! No retries. No pagination. JSON responses only.

mod client;
mod dataset;

pub use client::{DatasetClient, FetchError, DEFAULT_TIMEOUT_SECS};
pub use dataset::Dataset;
