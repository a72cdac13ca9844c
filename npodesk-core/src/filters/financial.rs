//! Financial-scale filter values: revenue and asset ranges.

use serde::{Deserialize, Serialize};

/// Open-ended revenue/asset ranges, in dollars.
///
/// Bounds are independent; the backend arbitrates inverted ranges (they
/// simply match nothing), so no min/max ordering is enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFilterValues {
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
    pub min_assets: Option<f64>,
    pub max_assets: Option<f64>,
}

impl FinancialFilterValues {
    pub fn is_empty(&self) -> bool {
        self.min_revenue.is_none()
            && self.max_revenue.is_none()
            && self.min_assets.is_none()
            && self.max_assets.is_none()
    }
}
