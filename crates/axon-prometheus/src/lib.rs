//! Prometheus metrics backend for the axon provisioning path.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of
//! [`axon_core::MetricsBackend`] that exposes metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use axon_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: axon_core::MetricsHandle = Arc::new(metrics.clone());
//! // handle is injected into the cloud via `Cloud::with_metrics`.
//!
//! // Expose /metrics with your HTTP framework of choice:
//! // let families = metrics.gather();
//! // let encoder = prometheus::TextEncoder::new();
//! // encoder.encode(&families, &mut response_buffer)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `axon_provisions_started_total{path}` - Counter
//! - `axon_provisions_completed_total{path, outcome}` - Counter
//! - `axon_provision_duration_seconds{path}` - Histogram
//! - `axon_connect_outcomes_total{outcome}` - Counter
//!
//! This crate does NOT provide an HTTP server for the `/metrics` endpoint;
//! use the application's existing HTTP framework.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
