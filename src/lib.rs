//! # Serving Console
//!
//! Console backend for LLM serving instances: lists deployed instances,
//! launches load tests against them, and drives monitoring dashboards
//! backed by a Prometheus-compatible metrics API.
//!
//! ## Architecture
//!
//! - **models**: Instance and load-test records from the serving API
//! - **window**: Default time window for dashboard range queries
//! - **store**: Dashboard state (lists, selection, time ranges)
//! - **client**: HTTP clients for the serving, metrics and pilot APIs
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod store;
pub mod window;

pub use models::*;
pub use window::{compute_window, compute_window_in, find_active, normalize, QueryWindow};
