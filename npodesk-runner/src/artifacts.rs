//! Run artifacts — manifest, export payload, candidate preview, report.
//!
//! Each run gets a directory named `fy{year}_{timestamp}/` under the
//! output directory containing:
//! - `manifest.json` — schema-versioned run summary
//! - the export payload, under its backend-suggested filename
//! - `candidates.csv` — the screened candidate list with confirmation marks
//! - `summary.md` — human-readable report
//!
//! Manifests carry a `schema_version`; unknown versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use npodesk_core::export::ExportFormat;

use crate::config::QueryConfig;
use crate::pipeline::QueryOutcome;
use crate::report::generate_report;

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Persisted summary of one query run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: String,
    pub fiscal_year: i32,
    pub fiscal_month: Option<u32>,
    pub request_fingerprint: String,
    pub candidate_count: usize,
    pub confirmed_count: usize,
    pub fields: Vec<String>,
    pub format: ExportFormat,
    pub export_file: String,
    pub warnings: Vec<String>,
}

/// Save the full artifact set for a run. Returns the created directory.
pub fn save_artifacts(
    outcome: &QueryOutcome,
    config: &QueryConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!(
        "fy{}_{}",
        config.fiscal.year,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    // Export payload, under the backend's suggested name when it gave one.
    let export_file = outcome
        .payload
        .filename
        .clone()
        .unwrap_or_else(|| format!("export.{}", outcome.format.extension()));
    std::fs::write(run_dir.join(&export_file), &outcome.payload.bytes)?;

    // manifest.json
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Local::now().to_rfc3339(),
        fiscal_year: config.fiscal.year,
        fiscal_month: config.fiscal.month,
        request_fingerprint: outcome.request_fingerprint.clone(),
        candidate_count: outcome.candidates.len(),
        confirmed_count: outcome.confirmed.len(),
        fields: outcome.fields.clone(),
        format: outcome.format,
        export_file,
        warnings: outcome.warnings.clone(),
    };
    let json = serde_json::to_string_pretty(&manifest).context("manifest serialization")?;
    std::fs::write(run_dir.join("manifest.json"), json)?;

    // candidates.csv
    let preview = candidates_csv(outcome)?;
    std::fs::write(run_dir.join("candidates.csv"), preview)?;

    // summary.md
    std::fs::write(run_dir.join("summary.md"), generate_report(outcome, config))?;

    Ok(run_dir)
}

/// Load a run's manifest, rejecting unknown schema versions.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("failed to deserialize manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported manifest schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// The screened candidates as CSV, with a confirmation marker per row.
pub fn candidates_csv(outcome: &QueryOutcome) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ein",
        "name",
        "city",
        "state",
        "fiscal_year",
        "fiscal_month",
        "total_revenue",
        "confirmed",
    ])?;

    for org in &outcome.candidates {
        let confirmed = outcome.confirmed.iter().any(|e| e == &org.ein);
        wtr.write_record([
            org.ein.as_str(),
            org.name.as_str(),
            org.city.as_str(),
            org.state.as_str(),
            &org.fiscal_year.map(|y| y.to_string()).unwrap_or_default(),
            &org.fiscal_month.map(|m| m.to_string()).unwrap_or_default(),
            &org
                .total_revenue
                .map(|r| format!("{r:.2}"))
                .unwrap_or_default(),
            if confirmed { "yes" } else { "no" },
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
