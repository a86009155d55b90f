//! Tax identifier normalization.
//!
//! Splits VAT numbers into the `IdPaese` / `IdCodice` pair FatturaPA
//! requires, normalizes fiscal codes, and optionally verifies Italian
//! check digits.
//!
//! # Example
//!
//! ```
//! use fattura::vat::split_vat;
//!
//! let id = split_vat("IT05056450157", "IT").unwrap();
//! assert_eq!(id.country, "IT");
//! assert_eq!(id.number, "05056450157");
//!
//! // No prefix: the party's declared country is used.
//! assert_eq!(split_vat("05056450157", "it").unwrap().country, "IT");
//! ```

mod format;
mod split;

pub use format::{VatFormatError, check_fiscal_code, check_vat_format, is_valid_partita_iva};
pub use split::{normalize_fiscal_code, split_vat};
