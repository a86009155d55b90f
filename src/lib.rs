//! # fattura
//!
//! Italian electronic invoicing: turns a confirmed sale into a FatturaPA
//! FPR12 XML document ready for the SDI exchange system.
//!
//! All monetary values use [`rust_decimal::Decimal`]; binary floats from the
//! store are converted once, at the mapping boundary. Every number in the
//! output is rendered with exactly two decimals, rounded half away from zero.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fattura::core::*;
//! use rust_decimal_macros::dec;
//!
//! let doc = DocumentBuilder::new("FT-1", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .progressive_number("00001")
//!     .supplier(PartyBuilder::company("Rossi Srl", AddressBuilder::new("Via Roma 1", "20121", "Milano", "IT").build())
//!         .vat_id("IT", "05056450157").tax_regime("RF01").build())
//!     .customer(PartyBuilder::company("Bianchi SpA", AddressBuilder::new("Corso Italia 1", "00184", "Roma", "IT").build())
//!         .vat_id("IT", "09876543217").build())
//!     .add_line(InvoiceLineBuilder::new("Consulenza", dec!(10), dec!(150)).build())
//!     .add_line(InvoiceLineBuilder::new("Libro", dec!(1), dec!(20)).exempt(NatureCode::N2_2).build())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(doc.tax_summary.len(), 2);
//! assert_eq!(doc.general.total, Some(dec!(1850.00)));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Document model, money formatting, tax summary, VAT ids, sale mapping, config |
//! | `fatturapa` (default) | FPR12 XML serializer, attachment embedding, generation pipeline |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod config;

#[cfg(feature = "core")]
pub mod sale;

#[cfg(feature = "core")]
pub mod vat;

#[cfg(feature = "fatturapa")]
pub mod fatturapa;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
