//! Wizard state machine — single owner of the query-building flow.
//!
//! Five linear steps: time selection, range filtering, precise targeting,
//! variable selection, export. The wizard owns every component (fiscal
//! selection, filter composer, search selector, option resolver, selection
//! set, field picks) and is the only thing that moves the step cursor.
//! Forward transitions are gated per step; backward transitions are free
//! and non-destructive.
//!
//! Staleness is tracked by request fingerprint rather than per-field dirty
//! flags: the candidates are current exactly when the fingerprint of the
//! request that produced them equals the fingerprint of the request the
//! wizard would compose right now. Any upstream edit — year, month, a
//! filter value, the search text — changes the composed request and
//! therefore invalidates the screening without any bookkeeping at the edit
//! sites. The same fingerprint tags in-flight screening responses so a
//! superseded request's result is discarded on arrival.

use std::collections::VecDeque;

use thiserror::Error;

use crate::backend::BackendError;
use crate::domain::{FieldCatalog, FieldDescriptor, FiscalSelection, Organization};
use crate::export::{ExportFormat, ExportRequest};
use crate::filters::{FilterComposer, FilterError, ModuleKind};
use crate::options::{ApplyOutcome, OptionKind, OptionResolver, OptionResponse, OptionScope};
use crate::screening::{RequestFingerprint, ScreeningRequest};
use crate::search::{SearchMode, SearchSelector, TermType};
use crate::selection::{SelectionError, SelectionSet};

/// The five wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    TimeSelection,
    RangeFiltering,
    PreciseTargeting,
    VariableSelection,
    Export,
}

impl WizardStep {
    pub fn index(self) -> usize {
        match self {
            WizardStep::TimeSelection => 0,
            WizardStep::RangeFiltering => 1,
            WizardStep::PreciseTargeting => 2,
            WizardStep::VariableSelection => 3,
            WizardStep::Export => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::TimeSelection => "Time Selection",
            WizardStep::RangeFiltering => "Range Filtering",
            WizardStep::PreciseTargeting => "Precise Targeting",
            WizardStep::VariableSelection => "Variable Selection",
            WizardStep::Export => "Data Export",
        }
    }

    /// The following step, if any. The sequence is linear — no skipping.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::TimeSelection => Some(WizardStep::RangeFiltering),
            WizardStep::RangeFiltering => Some(WizardStep::PreciseTargeting),
            WizardStep::PreciseTargeting => Some(WizardStep::VariableSelection),
            WizardStep::VariableSelection => Some(WizardStep::Export),
            WizardStep::Export => None,
        }
    }

    pub fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::TimeSelection => None,
            WizardStep::RangeFiltering => Some(WizardStep::TimeSelection),
            WizardStep::PreciseTargeting => Some(WizardStep::RangeFiltering),
            WizardStep::VariableSelection => Some(WizardStep::PreciseTargeting),
            WizardStep::Export => Some(WizardStep::VariableSelection),
        }
    }
}

/// Synchronous validation failures. These never reach the network and are
/// distinct from backend failures, which arrive through `apply_*` calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("select a fiscal year first")]
    YearRequired,

    #[error("FY {0} is not an available fiscal year")]
    YearUnavailable(i32),

    #[error("month {0} is not a calendar month")]
    MonthOutOfRange(u32),

    #[error("month {month} is not an available ending month for FY {year}")]
    MonthUnavailable { year: i32, month: u32 },

    #[error("'{0}' is not an available state for the selected fiscal year")]
    StateUnavailable(String),

    #[error("select a state before working with cities")]
    StateRequired,

    #[error("'{0}' is not an available city for the selected state")]
    CityUnavailable(String),

    #[error("enter at least one name or EIN to search for")]
    NoSearchTerms,

    #[error("screen the universe before targeting organizations")]
    ScreeningRequired,

    #[error("selections changed since the last screening; run it again")]
    ScreeningStale,

    #[error("confirm at least one organization")]
    EmptySelection,

    #[error("select at least one field to export")]
    NoFieldsSelected,

    #[error("the field catalog has not been loaded")]
    CatalogMissing,

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("already at the final step")]
    AtFinalStep,

    #[error("already at the first step")]
    AtFirstStep,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the presentation layer to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What happened to an arriving screening response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreeningOutcome {
    /// Candidates replaced.
    Applied { candidates: usize },
    /// The request failed; previous candidates are untouched.
    Failed,
    /// A newer request superseded this one; the response was dropped.
    Stale,
}

const NOTICE_CAP: usize = 50;

/// The wizard: step cursor plus every component it orchestrates.
pub struct Wizard {
    step: WizardStep,
    fiscal: FiscalSelection,
    filters: FilterComposer,
    search: SearchSelector,
    options: OptionResolver,
    selection: SelectionSet,
    catalog: Option<FieldCatalog>,
    selected_fields: Vec<String>,
    /// Fingerprint of the request whose results currently populate the
    /// candidate list.
    screened: Option<RequestFingerprint>,
    /// Fingerprint of the screening request currently in flight.
    pending_screening: Option<RequestFingerprint>,
    notices: VecDeque<Notice>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::TimeSelection,
            fiscal: FiscalSelection::new(),
            filters: FilterComposer::new(),
            search: SearchSelector::new(),
            options: OptionResolver::new(),
            selection: SelectionSet::new(),
            catalog: None,
            selected_fields: Vec::new(),
            screened: None,
            pending_screening: None,
            notices: VecDeque::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn fiscal(&self) -> &FiscalSelection {
        &self.fiscal
    }

    pub fn filters(&self) -> &FilterComposer {
        &self.filters
    }

    pub fn search(&self) -> &SearchSelector {
        &self.search
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn catalog(&self) -> Option<&FieldCatalog> {
        self.catalog.as_ref()
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.selected_fields
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    // ── Time selection ───────────────────────────────────────────────

    /// Select the reporting year. Validated against the resolved year list
    /// when one is cached; free-form otherwise (a failed option fetch must
    /// not lock the wizard). Changing the year drops the selected month.
    pub fn select_fiscal_year(&mut self, year: i32) -> Result<(), WizardError> {
        if let Some(years) = self.options.years() {
            if !years.contains(&year) {
                return Err(WizardError::YearUnavailable(year));
            }
        }
        self.fiscal.select_year(year);
        Ok(())
    }

    /// Select or clear the fiscal ending month, validated against the
    /// month list resolved for the current year when one is cached.
    pub fn select_fiscal_month(&mut self, month: Option<u32>) -> Result<(), WizardError> {
        let year = self.fiscal.year().ok_or(WizardError::YearRequired)?;
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(WizardError::MonthOutOfRange(m));
            }
            if let Some(months) = self.options.months(year) {
                if !months.contains(&m) {
                    return Err(WizardError::MonthUnavailable { year, month: m });
                }
            }
        }
        self.fiscal.select_month(month);
        Ok(())
    }

    // ── Filter modules ───────────────────────────────────────────────

    pub fn set_module_enabled(&mut self, kind: ModuleKind, enabled: bool) {
        self.filters.set_enabled(kind, enabled);
    }

    /// Set the state filter, validated against the resolved state list for
    /// the current year when one is cached.
    pub fn set_state(&mut self, state: Option<String>) -> Result<(), WizardError> {
        if let (Some(year), Some(value)) = (self.fiscal.year(), state.as_deref()) {
            if let Some(states) = self.options.states(year) {
                if !states.iter().any(|s| s.eq_ignore_ascii_case(value)) {
                    return Err(WizardError::StateUnavailable(value.to_string()));
                }
            }
        }
        self.filters.set_state(state)?;
        Ok(())
    }

    /// Set the city filter, validated against the resolved city list for
    /// the current year and state when one is cached.
    pub fn set_city(&mut self, city: Option<String>) -> Result<(), WizardError> {
        if let Some(value) = city.as_deref() {
            let state = self.filters.geographic().state.clone();
            if let (Some(year), Some(state)) = (self.fiscal.year(), state) {
                if let Some(cities) = self.options.cities(year, &state) {
                    if !cities.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                        return Err(WizardError::CityUnavailable(value.to_string()));
                    }
                }
            }
        }
        self.filters.set_city(city)?;
        Ok(())
    }

    pub fn set_revenue_range(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), WizardError> {
        self.filters.set_revenue_range(min, max)?;
        Ok(())
    }

    pub fn set_assets_range(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), WizardError> {
        self.filters.set_assets_range(min, max)?;
        Ok(())
    }

    pub fn set_ilu_range(&mut self, min: Option<u32>, max: Option<u32>) -> Result<(), WizardError> {
        self.filters.set_ilu_range(min, max)?;
        Ok(())
    }

    pub fn set_alu_range(&mut self, min: Option<u32>, max: Option<u32>) -> Result<(), WizardError> {
        self.filters.set_alu_range(min, max)?;
        Ok(())
    }

    // ── Search mode ──────────────────────────────────────────────────

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search.set_mode(mode);
    }

    pub fn set_term_type(&mut self, term_type: TermType) {
        self.search.set_term_type(term_type);
    }

    pub fn set_search_text(&mut self, raw: impl Into<String>) {
        self.search.set_raw_text(raw);
    }

    // ── Option resolution ────────────────────────────────────────────

    /// Work out which scope a fetch for `kind` would cover right now, and
    /// register it as pending. Returns `None` when the scope is already
    /// cached — the caller should skip the fetch and read the cache.
    pub fn begin_options_fetch(
        &mut self,
        kind: OptionKind,
    ) -> Result<Option<OptionScope>, WizardError> {
        let scope = self.option_scope(kind)?;
        if self.options.is_cached(&scope) {
            return Ok(None);
        }
        self.options.begin(scope.clone());
        Ok(Some(scope))
    }

    fn option_scope(&self, kind: OptionKind) -> Result<OptionScope, WizardError> {
        match kind {
            OptionKind::FiscalYears => Ok(OptionScope::Years),
            OptionKind::FiscalMonths => {
                let year = self.fiscal.year().ok_or(WizardError::YearRequired)?;
                Ok(OptionScope::Months { year })
            }
            OptionKind::States => {
                let year = self.fiscal.year().ok_or(WizardError::YearRequired)?;
                Ok(OptionScope::States { year })
            }
            OptionKind::Cities => {
                let year = self.fiscal.year().ok_or(WizardError::YearRequired)?;
                let state = self
                    .filters
                    .geographic()
                    .state
                    .clone()
                    .ok_or(WizardError::StateRequired)?;
                Ok(OptionScope::Cities { year, state })
            }
        }
    }

    /// Feed a completed option fetch back in. Superseded responses are
    /// discarded by the resolver. When a month list lands that no longer
    /// contains the selected month (picked free-form while the list was
    /// unavailable), the selection is dropped with a warning.
    pub fn apply_options(&mut self, response: OptionResponse) -> ApplyOutcome {
        let outcome = self.options.apply(response);
        if outcome == ApplyOutcome::Applied {
            if let (Some(year), Some(month)) = (self.fiscal.year(), self.fiscal.month()) {
                if let Some(months) = self.options.months(year) {
                    if !months.contains(&month) {
                        self.fiscal.select_month(None);
                        self.push_notice(
                            NoticeLevel::Warning,
                            format!("month {month} is not available for FY {year}; cleared"),
                        );
                    }
                }
            }
        }
        outcome
    }

    /// Record a failed option fetch: warning notice, nothing cached, the
    /// dependent selection stays usable (free-form).
    pub fn apply_options_failure(
        &mut self,
        scope: &OptionScope,
        error: &BackendError,
    ) -> ApplyOutcome {
        let outcome = self.options.fail(scope);
        if outcome == ApplyOutcome::Applied {
            self.push_notice(
                NoticeLevel::Warning,
                format!("could not load {scope}: {error}"),
            );
        }
        outcome
    }

    pub fn year_options(&self) -> Option<&[i32]> {
        self.options.years()
    }

    pub fn month_options(&self) -> Option<&[u32]> {
        self.options.months(self.fiscal.year()?)
    }

    pub fn state_options(&self) -> Option<&[String]> {
        self.options.states(self.fiscal.year()?)
    }

    pub fn city_options(&self) -> Option<&[String]> {
        let year = self.fiscal.year()?;
        let state = self.filters.geographic().state.as_deref()?;
        self.options.cities(year, state)
    }

    // ── Screening ────────────────────────────────────────────────────

    /// The request the wizard would send right now.
    pub fn current_screening_request(&self) -> Result<ScreeningRequest, WizardError> {
        let period = self.fiscal.period().ok_or(WizardError::YearRequired)?;
        match self.search.mode() {
            SearchMode::Criteria => Ok(ScreeningRequest::criteria(
                period,
                self.filters.serialize(),
            )),
            SearchMode::Explicit => {
                let terms = self.search.terms();
                if terms.is_empty() {
                    return Err(WizardError::NoSearchTerms);
                }
                Ok(ScreeningRequest::explicit(
                    period,
                    terms,
                    self.search.term_type(),
                ))
            }
        }
    }

    /// Validate and hand out the screening request, marking its fingerprint
    /// as the one in flight. An earlier in-flight request is superseded.
    pub fn begin_screening(&mut self) -> Result<ScreeningRequest, WizardError> {
        let request = self.current_screening_request()?;
        self.pending_screening = Some(request.fingerprint());
        Ok(request)
    }

    /// Feed a screening result back in, tagged with the fingerprint of the
    /// request that produced it.
    pub fn apply_screening(
        &mut self,
        fingerprint: RequestFingerprint,
        outcome: Result<Vec<Organization>, BackendError>,
    ) -> ScreeningOutcome {
        if self.pending_screening.as_ref() != Some(&fingerprint) {
            return ScreeningOutcome::Stale;
        }
        self.pending_screening = None;

        match outcome {
            Ok(organizations) => {
                let count = organizations.len();
                self.selection.load_candidates(organizations);
                self.screened = Some(fingerprint);
                self.push_notice(
                    NoticeLevel::Info,
                    format!("screening matched {count} organizations"),
                );
                ScreeningOutcome::Applied { candidates: count }
            }
            Err(error) => {
                // Previous candidates stay; retry is a manual re-submission.
                self.push_notice(NoticeLevel::Error, format!("screening failed: {error}"));
                ScreeningOutcome::Failed
            }
        }
    }

    /// Whether the candidate list reflects the request the wizard would
    /// compose right now.
    pub fn screening_is_current(&self) -> bool {
        match (&self.screened, self.current_screening_request()) {
            (Some(applied), Ok(request)) => applied == &request.fingerprint(),
            _ => false,
        }
    }

    // ── Precise targeting ────────────────────────────────────────────

    pub fn toggle_organization(&mut self, ein: &str) -> Result<bool, WizardError> {
        Ok(self.selection.toggle(ein)?)
    }

    pub fn confirm_organization(&mut self, ein: &str) -> Result<(), WizardError> {
        Ok(self.selection.confirm(ein)?)
    }

    pub fn select_all_organizations(&mut self) {
        self.selection.select_all();
    }

    pub fn clear_confirmed(&mut self) {
        self.selection.clear();
    }

    // ── Variable selection ───────────────────────────────────────────

    /// Install (or refresh) the field catalog. Selected fields that are no
    /// longer in the catalog are dropped with a warning.
    pub fn apply_field_catalog(&mut self, fields: Vec<FieldDescriptor>) {
        let catalog = FieldCatalog::new(fields);
        let before = self.selected_fields.len();
        self.selected_fields.retain(|name| catalog.contains(name));
        let dropped = before - self.selected_fields.len();
        if dropped > 0 {
            self.push_notice(
                NoticeLevel::Warning,
                format!("{dropped} selected fields left the catalog and were dropped"),
            );
        }
        self.catalog = Some(catalog);
    }

    pub fn set_field_selected(&mut self, name: &str, selected: bool) -> Result<(), WizardError> {
        let catalog = self.catalog.as_ref().ok_or(WizardError::CatalogMissing)?;
        if !catalog.contains(name) {
            return Err(WizardError::UnknownField(name.to_string()));
        }
        let pos = self.selected_fields.iter().position(|f| f == name);
        match (selected, pos) {
            (true, None) => self.selected_fields.push(name.to_string()),
            (false, Some(i)) => {
                self.selected_fields.remove(i);
            }
            _ => {}
        }
        Ok(())
    }

    /// Select every catalog field, in catalog order.
    pub fn select_all_fields(&mut self) -> Result<(), WizardError> {
        let catalog = self.catalog.as_ref().ok_or(WizardError::CatalogMissing)?;
        self.selected_fields = catalog.fields().iter().map(|f| f.name.clone()).collect();
        Ok(())
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Merge the confirmed selection, chosen fields, and format into the
    /// final request. Pure composition; the gateway does the I/O.
    pub fn assemble_export(&self, format: ExportFormat) -> Result<ExportRequest, WizardError> {
        if self.selection.confirmed().is_empty() {
            return Err(WizardError::EmptySelection);
        }
        if self.selected_fields.is_empty() {
            return Err(WizardError::NoFieldsSelected);
        }
        Ok(ExportRequest::assemble(
            self.selection.confirmed().to_vec(),
            self.selected_fields.clone(),
            format,
        ))
    }

    // ── Step transitions ─────────────────────────────────────────────

    /// Check the current step's forward gate without moving.
    pub fn can_advance(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::TimeSelection => {
                self.fiscal.year().ok_or(WizardError::YearRequired)?;
                Ok(())
            }
            WizardStep::RangeFiltering => {
                let request = self.current_screening_request()?;
                match &self.screened {
                    Some(applied) if applied == &request.fingerprint() => Ok(()),
                    Some(_) => Err(WizardError::ScreeningStale),
                    None => Err(WizardError::ScreeningRequired),
                }
            }
            WizardStep::PreciseTargeting => {
                if self.selection.confirmed().is_empty() {
                    Err(WizardError::EmptySelection)
                } else {
                    Ok(())
                }
            }
            WizardStep::VariableSelection => {
                if self.selected_fields.is_empty() {
                    Err(WizardError::NoFieldsSelected)
                } else {
                    Ok(())
                }
            }
            WizardStep::Export => Err(WizardError::AtFinalStep),
        }
    }

    /// Move forward one step if the gate allows it.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        self.can_advance()?;
        self.step = self.step.next().ok_or(WizardError::AtFinalStep)?;
        Ok(self.step)
    }

    /// Move back one step. Never clears forward-state data.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.step = self.step.prev().ok_or(WizardError::AtFirstStep)?;
        Ok(self.step)
    }

    /// Return to the first step and reset every component's state.
    /// Resolved option caches and the field catalog survive — they are
    /// fetched data, not user state — but in-flight fetches are dropped.
    pub fn restart(&mut self) {
        self.step = WizardStep::TimeSelection;
        self.fiscal.reset();
        self.filters.reset();
        self.search.reset();
        self.selection.reset();
        self.selected_fields.clear();
        self.screened = None;
        self.pending_screening = None;
        self.options.cancel_pending();
        self.notices.clear();
    }

    fn push_notice(&mut self, level: NoticeLevel, message: String) {
        self.notices.push_front(Notice { level, message });
        if self.notices.len() > NOTICE_CAP {
            self.notices.pop_back();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ModuleKind;

    fn org(ein: &str, name: &str) -> Organization {
        Organization {
            ein: ein.into(),
            name: name.into(),
            city: "LOS ANGELES".into(),
            state: "CA".into(),
            zip: None,
            address: None,
            fiscal_year: Some(2023),
            fiscal_month: Some(6),
            total_revenue: None,
            total_assets: None,
            ilu_count: None,
            alu_count: None,
        }
    }

    fn catalog_fields() -> Vec<FieldDescriptor> {
        ["ein", "campus", "city", "st", "part_i_summary_12_total_revenue_cy"]
            .into_iter()
            .map(|name| FieldDescriptor {
                name: name.into(),
                category: "All".into(),
                display_name: name.into(),
            })
            .collect()
    }

    /// Drive a wizard to PreciseTargeting with the given candidates.
    fn screened_wizard(candidates: Vec<Organization>) -> Wizard {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();
        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(candidates));
        w.advance().unwrap();
        w
    }

    #[test]
    fn steps_are_linear() {
        assert_eq!(WizardStep::TimeSelection.next(), Some(WizardStep::RangeFiltering));
        assert_eq!(WizardStep::Export.next(), None);
        assert_eq!(WizardStep::TimeSelection.prev(), None);
        assert_eq!(WizardStep::Export.prev(), Some(WizardStep::VariableSelection));
        assert_eq!(WizardStep::VariableSelection.index(), 3);
    }

    #[test]
    fn first_gate_needs_a_year() {
        let mut w = Wizard::new();
        assert_eq!(w.advance(), Err(WizardError::YearRequired));
        w.select_fiscal_year(2023).unwrap();
        assert_eq!(w.advance(), Ok(WizardStep::RangeFiltering));
    }

    #[test]
    fn second_gate_needs_applied_screening() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();
        assert_eq!(w.advance(), Err(WizardError::ScreeningRequired));

        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(vec![org("1", "A")]));
        assert!(w.screening_is_current());
        assert_eq!(w.advance(), Ok(WizardStep::PreciseTargeting));
    }

    #[test]
    fn upstream_edit_makes_screening_stale() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();
        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(vec![org("1", "A")]));
        w.advance().unwrap();

        // Back to the start, change the year, come forward again.
        w.back().unwrap();
        w.back().unwrap();
        w.select_fiscal_year(2022).unwrap();
        w.advance().unwrap();
        assert!(!w.screening_is_current());
        assert_eq!(w.advance(), Err(WizardError::ScreeningStale));

        // Re-screening under the new year unblocks the gate.
        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(vec![org("2", "B")]));
        assert_eq!(w.advance(), Ok(WizardStep::PreciseTargeting));
    }

    #[test]
    fn filter_edit_makes_screening_stale() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();
        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(vec![org("1", "A")]));
        assert!(w.screening_is_current());

        w.set_module_enabled(ModuleKind::Geographic, true);
        w.set_state(Some("CA".into())).unwrap();
        assert!(!w.screening_is_current());
    }

    #[test]
    fn superseded_screening_response_is_discarded() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();

        let first = w.begin_screening().unwrap();

        // User edits filters and re-issues before the first lands.
        w.set_module_enabled(ModuleKind::Financial, true);
        w.set_revenue_range(Some(1.0), None).unwrap();
        let second = w.begin_screening().unwrap();

        let outcome = w.apply_screening(first.fingerprint(), Ok(vec![org("1", "OLD")]));
        assert_eq!(outcome, ScreeningOutcome::Stale);
        assert_eq!(w.selection().candidate_count(), 0);

        let outcome = w.apply_screening(second.fingerprint(), Ok(vec![org("2", "NEW")]));
        assert_eq!(outcome, ScreeningOutcome::Applied { candidates: 1 });
        assert_eq!(w.selection().candidates()[0].ein, "2");
    }

    #[test]
    fn screening_failure_preserves_candidates() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.advance().unwrap();
        let request = w.begin_screening().unwrap();
        w.apply_screening(request.fingerprint(), Ok(vec![org("1", "A")]));

        // A retry of the same request fails; the old candidates stay.
        let request = w.begin_screening().unwrap();
        let outcome = w.apply_screening(
            request.fingerprint(),
            Err(BackendError::Other("boom".into())),
        );
        assert_eq!(outcome, ScreeningOutcome::Failed);
        assert_eq!(w.selection().candidate_count(), 1);
        assert!(w
            .notices()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("boom")));
    }

    #[test]
    fn explicit_mode_needs_terms() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        w.set_search_mode(SearchMode::Explicit);
        assert_eq!(w.begin_screening().unwrap_err(), WizardError::NoSearchTerms);

        w.set_term_type(TermType::Ein);
        w.set_search_text("12-3456789\n98-7654321");
        let request = w.begin_screening().unwrap();
        match request {
            ScreeningRequest::Explicit(body) => {
                assert_eq!(body.search_terms, vec!["12-3456789", "98-7654321"]);
            }
            other => panic!("expected explicit request, got {other:?}"),
        }
    }

    #[test]
    fn third_gate_needs_confirmed_selection() {
        let mut w = screened_wizard(vec![org("1", "A"), org("2", "B")]);
        assert_eq!(w.step(), WizardStep::PreciseTargeting);
        assert_eq!(w.advance(), Err(WizardError::EmptySelection));

        // Exactly one confirmed entity is enough.
        w.toggle_organization("1").unwrap();
        assert_eq!(w.advance(), Ok(WizardStep::VariableSelection));
    }

    #[test]
    fn fourth_gate_needs_fields() {
        let mut w = screened_wizard(vec![org("1", "A")]);
        w.select_all_organizations();
        w.advance().unwrap();

        assert_eq!(w.advance(), Err(WizardError::NoFieldsSelected));
        w.apply_field_catalog(catalog_fields());
        w.set_field_selected("ein", true).unwrap();
        assert_eq!(w.advance(), Ok(WizardStep::Export));
        assert_eq!(w.advance(), Err(WizardError::AtFinalStep));
    }

    #[test]
    fn field_selection_validates_against_catalog() {
        let mut w = Wizard::new();
        assert_eq!(
            w.set_field_selected("ein", true),
            Err(WizardError::CatalogMissing)
        );
        w.apply_field_catalog(catalog_fields());
        assert_eq!(
            w.set_field_selected("bogus", true),
            Err(WizardError::UnknownField("bogus".into()))
        );
        w.set_field_selected("ein", true).unwrap();
        w.set_field_selected("ein", true).unwrap(); // idempotent
        assert_eq!(w.selected_fields(), ["ein"]);
        w.set_field_selected("ein", false).unwrap();
        assert!(w.selected_fields().is_empty());
    }

    #[test]
    fn assemble_export_merges_selection_and_fields() {
        let mut w = screened_wizard(vec![org("1", "A"), org("2", "B")]);
        w.select_all_organizations();
        w.advance().unwrap();
        w.apply_field_catalog(catalog_fields());
        w.set_field_selected("ein", true).unwrap();
        w.set_field_selected("campus", true).unwrap();
        w.advance().unwrap();

        let request = w.assemble_export(ExportFormat::Csv).unwrap();
        assert_eq!(request.eins, ["1", "2"]);
        assert_eq!(request.fields, ["ein", "campus"]);
        assert_eq!(request.format, ExportFormat::Csv);
    }

    #[test]
    fn restart_clears_all_component_state() {
        let mut w = screened_wizard(vec![org("1", "A")]);
        w.select_all_organizations();
        w.set_search_text("leftover text");
        w.advance().unwrap();
        w.apply_field_catalog(catalog_fields());
        w.set_field_selected("ein", true).unwrap();
        w.advance().unwrap();
        assert_eq!(w.step(), WizardStep::Export);

        w.restart();
        assert_eq!(w.step(), WizardStep::TimeSelection);
        assert_eq!(w.fiscal().year(), None);
        assert!(!w.filters().any_enabled());
        assert!(w.search().raw_text().is_empty());
        assert_eq!(w.selection().candidate_count(), 0);
        assert_eq!(w.selection().confirmed_count(), 0);
        assert!(w.selected_fields().is_empty());
        assert!(!w.screening_is_current());
    }

    #[test]
    fn month_validated_against_resolved_list() {
        let mut w = Wizard::new();
        assert_eq!(
            w.select_fiscal_month(Some(6)),
            Err(WizardError::YearRequired)
        );
        w.select_fiscal_year(2023).unwrap();
        assert_eq!(
            w.select_fiscal_month(Some(13)),
            Err(WizardError::MonthOutOfRange(13))
        );

        w.begin_options_fetch(OptionKind::FiscalMonths).unwrap();
        w.apply_options(OptionResponse::Months {
            year: 2023,
            months: vec![6, 12],
        });
        assert_eq!(
            w.select_fiscal_month(Some(9)),
            Err(WizardError::MonthUnavailable {
                year: 2023,
                month: 9
            })
        );
        assert_eq!(w.select_fiscal_month(Some(6)), Ok(()));
    }

    #[test]
    fn late_month_list_clears_invalid_free_form_month() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        // No list cached yet: free-form selection is allowed.
        w.select_fiscal_month(Some(9)).unwrap();

        w.begin_options_fetch(OptionKind::FiscalMonths).unwrap();
        w.apply_options(OptionResponse::Months {
            year: 2023,
            months: vec![6, 12],
        });
        assert_eq!(w.fiscal().month(), None);
        assert!(w.notices().any(|n| n.level == NoticeLevel::Warning));
    }

    #[test]
    fn option_failure_is_nonfatal() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        let scope = w
            .begin_options_fetch(OptionKind::FiscalMonths)
            .unwrap()
            .unwrap();
        w.apply_options_failure(&scope, &BackendError::Other("down".into()));

        assert!(w.notices().any(|n| n.level == NoticeLevel::Warning));
        // Selection stays free-form and the wizard still advances.
        w.select_fiscal_month(Some(3)).unwrap();
        assert_eq!(w.advance(), Ok(WizardStep::RangeFiltering));
    }

    #[test]
    fn cached_options_skip_refetch() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        let scope = w
            .begin_options_fetch(OptionKind::FiscalMonths)
            .unwrap()
            .unwrap();
        assert_eq!(scope, OptionScope::Months { year: 2023 });
        w.apply_options(OptionResponse::Months {
            year: 2023,
            months: vec![6],
        });

        assert_eq!(w.begin_options_fetch(OptionKind::FiscalMonths).unwrap(), None);
    }

    #[test]
    fn cities_scope_requires_state() {
        let mut w = Wizard::new();
        w.select_fiscal_year(2023).unwrap();
        assert_eq!(
            w.begin_options_fetch(OptionKind::Cities),
            Err(WizardError::StateRequired)
        );

        w.set_module_enabled(ModuleKind::Geographic, true);
        w.set_state(Some("CA".into())).unwrap();
        let scope = w.begin_options_fetch(OptionKind::Cities).unwrap().unwrap();
        assert_eq!(
            scope,
            OptionScope::Cities {
                year: 2023,
                state: "CA".into()
            }
        );
    }

    #[test]
    fn year_validated_against_resolved_list() {
        let mut w = Wizard::new();
        w.begin_options_fetch(OptionKind::FiscalYears).unwrap();
        w.apply_options(OptionResponse::Years(vec![2022, 2023]));

        assert_eq!(
            w.select_fiscal_year(1999),
            Err(WizardError::YearUnavailable(1999))
        );
        assert_eq!(w.select_fiscal_year(2023), Ok(()));
    }

    #[test]
    fn back_is_nondestructive() {
        let mut w = screened_wizard(vec![org("1", "A")]);
        w.select_all_organizations();
        w.back().unwrap();
        assert_eq!(w.step(), WizardStep::RangeFiltering);
        // Nothing was cleared by going back.
        assert_eq!(w.selection().confirmed_count(), 1);
        assert!(w.screening_is_current());
        // Coming forward again needs no re-screen since nothing changed.
        assert_eq!(w.advance(), Ok(WizardStep::PreciseTargeting));
    }

    #[test]
    fn back_from_first_step_errors() {
        let mut w = Wizard::new();
        assert_eq!(w.back(), Err(WizardError::AtFirstStep));
    }
}
