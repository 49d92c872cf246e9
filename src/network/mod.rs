//! HTTP networking module
//!
//! Provides the authenticated HTTP client used by the engine implementation.

mod client;

pub use client::{ApiRequest, HttpClient};
