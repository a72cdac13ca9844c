//! Query pipeline — one complete wizard pass driven from a config.
//!
//! Walks the wizard through all five steps against a gateway: resolve
//! options, select the fiscal period, apply the configured strategy,
//! screen, confirm, pick fields, export. Option-fetch failures are
//! collected as warnings and never abort the run; screening and export
//! failures do.

use thiserror::Error;
use tracing::info;

use npodesk_core::backend::{BackendError, BackendGateway, ExportPayload};
use npodesk_core::domain::Organization;
use npodesk_core::export::ExportFormat;
use npodesk_core::filters::ModuleKind;
use npodesk_core::options::{OptionKind, OptionResponse, OptionScope};
use npodesk_core::search::SearchMode;
use npodesk_core::wizard::{NoticeLevel, ScreeningOutcome, Wizard, WizardError};

use crate::config::QueryConfig;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("screening failed: {0}")]
    Screening(BackendError),

    #[error("field catalog unavailable: {0}")]
    Catalog(BackendError),

    #[error("export failed: {0}")]
    Export(BackendError),

    #[error("screening matched no organizations")]
    NoCandidates,
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Fingerprint of the screening request that produced the candidates.
    pub request_fingerprint: String,
    pub candidates: Vec<Organization>,
    pub confirmed: Vec<String>,
    pub fields: Vec<String>,
    pub format: ExportFormat,
    pub payload: ExportPayload,
    /// Non-fatal warnings surfaced along the way (option fetches, mostly).
    pub warnings: Vec<String>,
}

/// Run one query end-to-end. The gateway does all I/O; the wizard gates
/// every transition exactly as it would interactively.
pub fn run_query(
    config: &QueryConfig,
    gateway: &dyn BackendGateway,
) -> Result<QueryOutcome, PipelineError> {
    let mut wizard = Wizard::new();

    // Step 1: time selection.
    resolve_options(&mut wizard, gateway, OptionKind::FiscalYears);
    wizard.select_fiscal_year(config.fiscal.year)?;
    resolve_options(&mut wizard, gateway, OptionKind::FiscalMonths);
    if config.fiscal.month.is_some() {
        wizard.select_fiscal_month(config.fiscal.month)?;
    }
    wizard.advance()?;

    // Step 2: range filtering or explicit search.
    apply_strategy(&mut wizard, config, Some(gateway))?;

    let request = wizard.begin_screening()?;
    let fingerprint = request.fingerprint();
    info!(endpoint = request.endpoint(), "screening");
    let organizations = gateway
        .screen(&request)
        .map_err(PipelineError::Screening)?;
    let outcome = wizard.apply_screening(fingerprint.clone(), Ok(organizations));
    match outcome {
        ScreeningOutcome::Applied { candidates: 0 } => return Err(PipelineError::NoCandidates),
        ScreeningOutcome::Applied { candidates } => {
            info!(candidates, "screening applied");
        }
        // A headless run issues exactly one request, so the response can
        // be neither superseded nor (having mapped errors above) failed.
        ScreeningOutcome::Failed | ScreeningOutcome::Stale => unreachable!(),
    }
    wizard.advance()?;

    // Step 3: precise targeting.
    match &config.selection.eins {
        None => wizard.select_all_organizations(),
        Some(eins) => {
            for ein in eins {
                wizard.confirm_organization(ein)?;
            }
        }
    }
    wizard.advance()?;

    // Step 4: variable selection.
    let catalog = gateway.field_catalog().map_err(PipelineError::Catalog)?;
    wizard.apply_field_catalog(catalog);
    for field in &config.output.fields {
        wizard.set_field_selected(field, true)?;
    }
    wizard.advance()?;

    // Step 5: export.
    let export_request = wizard.assemble_export(config.output.format)?;
    info!(
        eins = export_request.eins.len(),
        fields = export_request.fields.len(),
        format = %export_request.format,
        "exporting"
    );
    let payload = gateway
        .export(&export_request)
        .map_err(PipelineError::Export)?;

    let warnings = wizard
        .notices()
        .filter(|n| n.level == NoticeLevel::Warning)
        .map(|n| n.message.clone())
        .collect();

    Ok(QueryOutcome {
        request_fingerprint: fingerprint.to_string(),
        candidates: wizard.selection().candidates().to_vec(),
        confirmed: export_request.eins.clone(),
        fields: export_request.fields.clone(),
        format: export_request.format,
        payload,
        warnings,
    })
}

/// Screen only — the candidate list without confirmation or export.
/// Used for previews.
pub fn run_screening(
    config: &QueryConfig,
    gateway: &dyn BackendGateway,
) -> Result<Vec<Organization>, PipelineError> {
    let mut wizard = Wizard::new();
    wizard.select_fiscal_year(config.fiscal.year)?;
    if config.fiscal.month.is_some() {
        wizard.select_fiscal_month(config.fiscal.month)?;
    }
    apply_strategy(&mut wizard, config, None)?;

    let request = wizard.begin_screening()?;
    gateway.screen(&request).map_err(PipelineError::Screening)
}

/// Configure the wizard's step-2 strategy: either the explicit search or
/// the filter modules. When a gateway is given, the state/city option
/// lists are resolved along the way so the values are validated against
/// them.
fn apply_strategy(
    wizard: &mut Wizard,
    config: &QueryConfig,
    gateway: Option<&dyn BackendGateway>,
) -> Result<(), WizardError> {
    if let Some(search) = &config.search {
        wizard.set_search_mode(SearchMode::Explicit);
        wizard.set_term_type(search.term_type);
        wizard.set_search_text(search.terms.join("\n"));
        return Ok(());
    }

    let Some(filters) = &config.filters else {
        return Ok(());
    };

    if let Some(geo) = &filters.geographic {
        wizard.set_module_enabled(ModuleKind::Geographic, true);
        if let Some(gateway) = gateway {
            resolve_options(wizard, gateway, OptionKind::States);
        }
        if geo.state.is_some() {
            wizard.set_state(geo.state.clone())?;
            if let Some(gateway) = gateway {
                resolve_options(wizard, gateway, OptionKind::Cities);
            }
        }
        if geo.city.is_some() {
            wizard.set_city(geo.city.clone())?;
        }
    }
    if let Some(fin) = &filters.financial {
        wizard.set_module_enabled(ModuleKind::Financial, true);
        wizard.set_revenue_range(fin.min_revenue, fin.max_revenue)?;
        wizard.set_assets_range(fin.min_assets, fin.max_assets)?;
    }
    if let Some(ops) = &filters.operational {
        wizard.set_module_enabled(ModuleKind::Operational, true);
        wizard.set_ilu_range(ops.min_ilu, ops.max_ilu)?;
        wizard.set_alu_range(ops.min_alu, ops.max_alu)?;
    }
    Ok(())
}

/// Resolve one option list, feeding success or failure back into the
/// wizard. Fetch failures become warnings there, never errors — a dead
/// options endpoint must not block a run.
fn resolve_options(wizard: &mut Wizard, gateway: &dyn BackendGateway, kind: OptionKind) {
    let scope = match wizard.begin_options_fetch(kind) {
        Ok(Some(scope)) => scope,
        // Already cached, or prerequisites missing (the later selection
        // call will surface that properly).
        Ok(None) | Err(_) => return,
    };

    let result = match &scope {
        OptionScope::Years => gateway.fiscal_years().map(OptionResponse::Years),
        OptionScope::Months { year } => {
            let year = *year;
            gateway
                .fiscal_months(year)
                .map(|months| OptionResponse::Months { year, months })
        }
        OptionScope::States { year } => {
            let year = *year;
            gateway
                .states(year)
                .map(|states| OptionResponse::States { year, states })
        }
        OptionScope::Cities { year, state } => {
            let year = *year;
            let state = state.clone();
            gateway
                .cities(year, &state)
                .map(|cities| OptionResponse::Cities {
                    year,
                    state,
                    cities,
                })
        }
    };

    match result {
        Ok(response) => {
            wizard.apply_options(response);
        }
        Err(error) => {
            wizard.apply_options_failure(&scope, &error);
        }
    }
}
