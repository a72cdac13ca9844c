//! Domain types: fiscal periods, organizations, and the field catalog.

pub mod fiscal;
pub mod fields;
pub mod organization;

pub use fiscal::{month_name, FiscalPeriod, FiscalSelection};
pub use fields::{FieldCatalog, FieldDescriptor};
pub use organization::Organization;
