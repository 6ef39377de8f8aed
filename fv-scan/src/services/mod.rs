//! Service components for the scan ingestion pipeline

pub mod inference_client;
pub mod normalizer;
pub mod scan_pipeline;
pub mod stats_aggregator;
pub mod upload_staging;
