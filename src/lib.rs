//! Library exports for the churnlens tools, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// HR corpus schema, loading and splitting.
pub mod dataset;
/// Atomic file replacement.
pub mod fs_atomic;
/// Corpus statistics and risk tiers.
pub mod insights;
/// Tracing setup.
pub mod logging;
/// Encoders, scaler, classifier and the inference pipeline.
pub mod ml;
