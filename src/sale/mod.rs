//! Stored sale records and their mapping onto the invoice model.
//!
//! ```
//! use fattura::config::CodecConfig;
//! use fattura::sale::{SaleAggregate, map_sale};
//!
//! let aggregate: SaleAggregate = serde_json::from_str(r#"{
//!     "sale": {"saleId": "s-1", "saleNumber": 1, "saleDate": "2024-06-15", "status": "confirmed"},
//!     "lines": [{"productDescription": "Consulenza", "quantity": 1.0, "unitPrice": 100.0, "taxRate": 22.0}],
//!     "buyer": {"companyName": "Bianchi SpA", "vatNumber": "09876543217", "address": "Corso Italia 1",
//!               "postalCode": "00184", "city": "Roma"},
//!     "producer": {"companyName": "Rossi Srl", "vatNumber": "IT05056450157", "address": "Via Roma 1",
//!                  "postalCode": "20121", "city": "Milano"}
//! }"#).unwrap();
//!
//! let doc = map_sale(&aggregate, &CodecConfig::default(), "00001").unwrap();
//! assert_eq!(doc.supplier.vat_id.unwrap().number, "05056450157");
//! ```

mod mapper;
mod records;

pub use mapper::{check_preconditions, map_sale, parse_payment_method};
pub(crate) use mapper::map_checked;
pub use records::{
    Buyer, PartyRecord, Producer, Sale, SaleAggregate, SaleDocType, SaleLine, SaleStatus,
};
