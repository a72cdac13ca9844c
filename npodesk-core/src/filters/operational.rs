//! Operational-scale filter values: living-unit count ranges.

use serde::{Deserialize, Serialize};

/// Ranges over independent (ILU) and assisted (ALU) living unit counts.
///
/// Counts are non-negative by construction (`u32`). As with the financial
/// module, inverted ranges are left to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalFilterValues {
    pub min_ilu: Option<u32>,
    pub max_ilu: Option<u32>,
    pub min_alu: Option<u32>,
    pub max_alu: Option<u32>,
}

impl OperationalFilterValues {
    pub fn is_empty(&self) -> bool {
        self.min_ilu.is_none()
            && self.max_ilu.is_none()
            && self.min_alu.is_none()
            && self.max_alu.is_none()
    }
}
