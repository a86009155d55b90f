//! Core invoice model, validation and tax aggregation.
//!
//! This module holds the canonical FatturaPA data model together with the
//! pure helpers every other module leans on: two-decimal money rendering,
//! the per-(rate, nature) tax summary, and the document validation pass.

mod builder;
pub mod countries;
pub mod currencies;
mod error;
pub mod money;
mod nature;
mod numbering;
pub mod summary;
mod types;
mod validation;

pub use builder::*;
pub use countries::{DOMESTIC_COUNTRY, is_known_country_code};
pub use error::*;
pub use money::{decimal_from_f64, format_amount, round2};
pub use nature::NatureCode;
pub use numbering::*;
pub use summary::{aggregate_tax, apply_summary, document_totals, verify_summary};
pub use types::*;
pub use validation::*;
