//! Field catalog — the exportable columns of the dataset, grouped by category.
//!
//! The catalog is served by the backend (`GET /api/fields`) so the set of
//! exportable variables can evolve with the dataset without a client
//! release. The wizard validates the user's field picks against it.

use serde::{Deserialize, Serialize};

/// One exportable dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dataset column name — the key used in export requests.
    pub name: String,
    /// Presentation grouping (e.g. "Identification", "Financial").
    pub category: String,
    /// Human-readable label.
    pub display_name: String,
}

/// The full set of exportable fields, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for f in &self.fields {
            if !seen.contains(&f.category.as_str()) {
                seen.push(f.category.as_str());
            }
        }
        seen
    }

    /// Fields belonging to one category, in catalog order.
    pub fn fields_in(&self, category: &str) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }
}
