use uuid::Uuid;

// Core CRM entities
pub mod call_outcome;
pub mod calls;
pub mod company_settings;
pub mod employees;
pub mod lead_groups;
pub mod lead_status;
pub mod leads;
pub mod managers;
pub mod removed_leads;

// Call analysis entities
pub mod analyses;
pub mod analysis_status;
pub mod recordings;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
