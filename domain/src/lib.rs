//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters and partial updates within the domain layer.
pub use entity_api::{
    mutate::{IntoUpdateMap, UpdateMap},
    query::{IntoQueryFilterMap, QueryFilterMap},
};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    analyses, analysis_status, call_outcome, calls, company_settings, employees, lead_groups,
    lead_status, leads, managers, recordings, removed_leads, Id,
};

pub mod analysis;
pub mod call;
pub mod company_setting;
pub mod employee;
pub mod error;
pub mod follow_up;
pub mod lead;
pub mod lead_group;
pub mod manager;
pub mod session;
pub mod telephony;

pub mod gateway;

#[cfg(test)]
mod mocks;
