//! Application layer
//!
//! Orchestrates the infrastructure parsers and clients on top of the
//! caller-owned quotation session.

pub mod quote_pipeline;

pub use quote_pipeline::{BatchReport, FailedUrl, QuotePipeline};
