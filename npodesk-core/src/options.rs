//! Dependent option lists — scope-keyed resolution with stale-response discard.
//!
//! Years, months, states, and cities are resolved from the backend, each
//! scoped by the selections above it (months/states by year, cities by year
//! and state). Lists are cached under their full scope key, so navigating
//! back and forth never refetches an unchanged scope. At most one fetch per
//! option kind is considered "pending"; starting a fetch for a new scope
//! supersedes the old one, and the superseded response is discarded when it
//! arrives — last-request-wins is decided by scope identity, not by arrival
//! order.

use std::collections::HashMap;
use std::fmt;

/// The four kinds of option lists the wizard depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    FiscalYears,
    FiscalMonths,
    States,
    Cities,
}

impl OptionKind {
    pub fn label(self) -> &'static str {
        match self {
            OptionKind::FiscalYears => "fiscal years",
            OptionKind::FiscalMonths => "fiscal months",
            OptionKind::States => "states",
            OptionKind::Cities => "cities",
        }
    }
}

/// The minimal key an option fetch is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionScope {
    Years,
    Months { year: i32 },
    States { year: i32 },
    Cities { year: i32, state: String },
}

impl OptionScope {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionScope::Years => OptionKind::FiscalYears,
            OptionScope::Months { .. } => OptionKind::FiscalMonths,
            OptionScope::States { .. } => OptionKind::States,
            OptionScope::Cities { .. } => OptionKind::Cities,
        }
    }
}

impl fmt::Display for OptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionScope::Years => write!(f, "fiscal years"),
            OptionScope::Months { year } => write!(f, "fiscal months for FY {year}"),
            OptionScope::States { year } => write!(f, "states for FY {year}"),
            OptionScope::Cities { year, state } => {
                write!(f, "cities for FY {year} in {state}")
            }
        }
    }
}

/// A completed option fetch, tagged with the scope it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionResponse {
    Years(Vec<i32>),
    Months {
        year: i32,
        months: Vec<u32>,
    },
    States {
        year: i32,
        states: Vec<String>,
    },
    Cities {
        year: i32,
        state: String,
        cities: Vec<String>,
    },
}

impl OptionResponse {
    pub fn scope(&self) -> OptionScope {
        match self {
            OptionResponse::Years(_) => OptionScope::Years,
            OptionResponse::Months { year, .. } => OptionScope::Months { year: *year },
            OptionResponse::States { year, .. } => OptionScope::States { year: *year },
            OptionResponse::Cities { year, state, .. } => OptionScope::Cities {
                year: *year,
                state: state.clone(),
            },
        }
    }
}

/// Whether an arriving response was accepted or superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer fetch for this kind superseded the request; the response was
    /// dropped without touching the cache.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
enum CachedList {
    Years(Vec<i32>),
    Months(Vec<u32>),
    Names(Vec<String>),
}

/// Scope-keyed cache plus the pending-fetch bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct OptionResolver {
    cache: HashMap<OptionScope, CachedList>,
    pending: HashMap<OptionKind, OptionScope>,
}

impl OptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cached(&self, scope: &OptionScope) -> bool {
        self.cache.contains_key(scope)
    }

    /// Register a fetch for `scope` as in flight. Any earlier pending fetch
    /// of the same kind is superseded.
    pub fn begin(&mut self, scope: OptionScope) {
        self.pending.insert(scope.kind(), scope);
    }

    pub fn pending(&self, kind: OptionKind) -> Option<&OptionScope> {
        self.pending.get(&kind)
    }

    /// Apply a completed fetch. The response is accepted only if it matches
    /// the scope currently pending for its kind; anything else is stale and
    /// is dropped without touching the cache.
    pub fn apply(&mut self, response: OptionResponse) -> ApplyOutcome {
        let scope = response.scope();
        if self.pending.get(&scope.kind()) != Some(&scope) {
            return ApplyOutcome::Stale;
        }
        self.pending.remove(&scope.kind());

        let cached = match response {
            OptionResponse::Years(years) => CachedList::Years(years),
            OptionResponse::Months { months, .. } => CachedList::Months(months),
            OptionResponse::States { states, .. } => CachedList::Names(states),
            OptionResponse::Cities { cities, .. } => CachedList::Names(cities),
        };
        self.cache.insert(scope, cached);
        ApplyOutcome::Applied
    }

    /// Record a failed fetch. Clears the pending slot if it still belongs to
    /// this scope and caches nothing, so the scope can be retried later and
    /// the selection it feeds stays free-form in the meantime.
    pub fn fail(&mut self, scope: &OptionScope) -> ApplyOutcome {
        if self.pending.get(&scope.kind()) != Some(scope) {
            return ApplyOutcome::Stale;
        }
        self.pending.remove(&scope.kind());
        ApplyOutcome::Applied
    }

    pub fn years(&self) -> Option<&[i32]> {
        match self.cache.get(&OptionScope::Years)? {
            CachedList::Years(years) => Some(years),
            _ => None,
        }
    }

    pub fn months(&self, year: i32) -> Option<&[u32]> {
        match self.cache.get(&OptionScope::Months { year })? {
            CachedList::Months(months) => Some(months),
            _ => None,
        }
    }

    pub fn states(&self, year: i32) -> Option<&[String]> {
        match self.cache.get(&OptionScope::States { year })? {
            CachedList::Names(states) => Some(states),
            _ => None,
        }
    }

    pub fn cities(&self, year: i32, state: &str) -> Option<&[String]> {
        let scope = OptionScope::Cities {
            year,
            state: state.to_string(),
        };
        match self.cache.get(&scope)? {
            CachedList::Names(cities) => Some(cities),
            _ => None,
        }
    }

    /// Drop pending fetches but keep the cache. Used on wizard restart:
    /// resolved lists stay valid, in-flight requests do not.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }
}
