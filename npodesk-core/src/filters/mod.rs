//! Independently toggleable filter modules and their composer.
//!
//! Each screening dimension (geographic, financial, operational) is a
//! module the user can switch on or off. A disabled module holds default
//! (empty) values and is omitted from the serialized request entirely — the
//! backend treats absence-of-key as "no constraint", which is not the same
//! as a key with null members.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod financial;
pub mod geo;
pub mod operational;

pub use financial::FinancialFilterValues;
pub use geo::GeoFilterValues;
pub use operational::OperationalFilterValues;

/// The three toggleable screening dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Geographic,
    Financial,
    Operational,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::Geographic,
        ModuleKind::Financial,
        ModuleKind::Operational,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Geographic => "geographic",
            ModuleKind::Financial => "financial",
            ModuleKind::Operational => "operational",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from filter mutations that violate module rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("the {0} filter module is disabled")]
    ModuleDisabled(ModuleKind),

    #[error("a city can only be set once a state is selected")]
    CityWithoutState,
}

/// Enable/disable wrapper around one module's values.
///
/// Invariant: a disabled module's values are always `T::default()`.
/// Disabling resets atomically; there is no way to edit a disabled module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterModule<T: Default> {
    enabled: bool,
    values: T,
}

impl<T: Default> FilterModule<T> {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    /// Values for serialization — present only while the module is enabled.
    pub fn active_values(&self) -> Option<&T> {
        self.enabled.then_some(&self.values)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.values = T::default();
        }
        self.enabled = enabled;
    }

    fn values_mut(&mut self) -> Option<&mut T> {
        self.enabled.then_some(&mut self.values)
    }
}

/// The enabled modules' values, shaped for the screening request body.
///
/// Disabled modules are absent keys, not nulls (`skip_serializing_if`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_filters: Option<GeoFilterValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_filters: Option<FinancialFilterValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_filters: Option<OperationalFilterValues>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.geo_filters.is_none()
            && self.financial_filters.is_none()
            && self.operational_filters.is_none()
    }
}

/// Holds all three modules and serializes the active ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterComposer {
    geographic: FilterModule<GeoFilterValues>,
    financial: FilterModule<FinancialFilterValues>,
    operational: FilterModule<OperationalFilterValues>,
}

impl FilterComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Geographic => self.geographic.enabled(),
            ModuleKind::Financial => self.financial.enabled(),
            ModuleKind::Operational => self.operational.enabled(),
        }
    }

    pub fn any_enabled(&self) -> bool {
        ModuleKind::ALL.iter().any(|&k| self.is_enabled(k))
    }

    /// Toggle a module. Disabling resets that module's values to defaults.
    pub fn set_enabled(&mut self, kind: ModuleKind, enabled: bool) {
        match kind {
            ModuleKind::Geographic => self.geographic.set_enabled(enabled),
            ModuleKind::Financial => self.financial.set_enabled(enabled),
            ModuleKind::Operational => self.operational.set_enabled(enabled),
        }
    }

    pub fn geographic(&self) -> &GeoFilterValues {
        self.geographic.values()
    }

    pub fn financial(&self) -> &FinancialFilterValues {
        self.financial.values()
    }

    pub fn operational(&self) -> &OperationalFilterValues {
        self.operational.values()
    }

    /// Set or clear the state. Changing (or clearing) the state drops any
    /// selected city — a city belongs to the state it was chosen under.
    pub fn set_state(&mut self, state: Option<String>) -> Result<(), FilterError> {
        let geo = self
            .geographic
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Geographic))?;
        if geo.state != state {
            geo.city = None;
        }
        geo.state = state;
        Ok(())
    }

    /// Set or clear the city. Requires a state to already be selected.
    pub fn set_city(&mut self, city: Option<String>) -> Result<(), FilterError> {
        let geo = self
            .geographic
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Geographic))?;
        if city.is_some() && geo.state.is_none() {
            return Err(FilterError::CityWithoutState);
        }
        geo.city = city;
        Ok(())
    }

    pub fn set_revenue_range(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), FilterError> {
        let fin = self
            .financial
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Financial))?;
        fin.min_revenue = min;
        fin.max_revenue = max;
        Ok(())
    }

    pub fn set_assets_range(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), FilterError> {
        let fin = self
            .financial
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Financial))?;
        fin.min_assets = min;
        fin.max_assets = max;
        Ok(())
    }

    pub fn set_ilu_range(
        &mut self,
        min: Option<u32>,
        max: Option<u32>,
    ) -> Result<(), FilterError> {
        let ops = self
            .operational
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Operational))?;
        ops.min_ilu = min;
        ops.max_ilu = max;
        Ok(())
    }

    pub fn set_alu_range(
        &mut self,
        min: Option<u32>,
        max: Option<u32>,
    ) -> Result<(), FilterError> {
        let ops = self
            .operational
            .values_mut()
            .ok_or(FilterError::ModuleDisabled(ModuleKind::Operational))?;
        ops.min_alu = min;
        ops.max_alu = max;
        Ok(())
    }

    /// Snapshot the enabled modules for a screening request.
    pub fn serialize(&self) -> FilterSet {
        FilterSet {
            geo_filters: self.geographic.active_values().cloned(),
            financial_filters: self.financial.active_values().cloned(),
            operational_filters: self.operational.active_values().cloned(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
