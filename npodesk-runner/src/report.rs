//! Markdown run summaries.

use crate::config::QueryConfig;
use crate::pipeline::QueryOutcome;

/// Generate a Markdown report for one query run.
pub fn generate_report(outcome: &QueryOutcome, config: &QueryConfig) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Query Run Report\n\n");

    md.push_str("## Query\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Fiscal Year | {} |\n", config.fiscal.year));
    if let Some(month) = config.fiscal.month {
        md.push_str(&format!("| Ending Month | {month} |\n"));
    }
    let strategy = if config.search.is_some() {
        "explicit search"
    } else {
        "criteria screening"
    };
    md.push_str(&format!("| Strategy | {strategy} |\n"));
    if let Some(search) = &config.search {
        md.push_str(&format!(
            "| Search | {} {} term(s) |\n",
            search.terms.len(),
            search.term_type.label()
        ));
    }
    if let Some(filters) = &config.filters {
        let mut modules = Vec::new();
        if filters.geographic.is_some() {
            modules.push("geographic");
        }
        if filters.financial.is_some() {
            modules.push("financial");
        }
        if filters.operational.is_some() {
            modules.push("operational");
        }
        md.push_str(&format!(
            "| Active Modules | {} |\n",
            if modules.is_empty() {
                "none".to_string()
            } else {
                modules.join(", ")
            }
        ));
    }
    md.push_str(&format!(
        "| Request Fingerprint | `{}` |\n",
        outcome.request_fingerprint
    ));
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Candidates | {} |\n", outcome.candidates.len()));
    md.push_str(&format!("| Confirmed | {} |\n", outcome.confirmed.len()));
    md.push('\n');

    md.push_str("## Export\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Format | {} |\n", outcome.format));
    md.push_str(&format!("| Fields | {} |\n", outcome.fields.join(", ")));
    md.push_str(&format!(
        "| Payload Size | {} bytes |\n",
        outcome.payload.bytes.len()
    ));
    md.push('\n');

    if !outcome.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warning in &outcome.warnings {
            md.push_str(&format!("- {warning}\n"));
        }
        md.push('\n');
    }

    md
}
