//! npodesk runner — headless query orchestration and run artifacts.
//!
//! Drives the core wizard end-to-end from a TOML `QueryConfig` against any
//! `BackendGateway`, and persists the results as a run directory
//! (manifest, export payload, candidate preview, report).

pub mod artifacts;
pub mod config;
pub mod pipeline;
pub mod report;

pub use artifacts::{candidates_csv, load_manifest, save_artifacts, RunManifest, SCHEMA_VERSION};
pub use config::{ConfigError, QueryConfig};
pub use pipeline::{run_query, run_screening, PipelineError, QueryOutcome};
pub use report::generate_report;
