//! FatturaPA FPR12 generation.
//!
//! Turns a [`SaleAggregate`](crate::sale::SaleAggregate) into the XML the
//! SDI accepts for invoices between private parties.
//!
//! # Example
//!
//! ```
//! use fattura::config::CodecConfig;
//! use fattura::fatturapa;
//! use fattura::sale::SaleAggregate;
//!
//! let aggregate: SaleAggregate = serde_json::from_str(r#"{
//!     "sale": {"saleId": "s-1", "saleNumber": 42, "saleDate": "2024-06-15", "status": "confirmed"},
//!     "lines": [{"productDescription": "Consulenza", "quantity": 1.0, "unitPrice": 100.0, "taxRate": 22.0}],
//!     "buyer": {"companyName": "Bianchi SpA", "vatNumber": "09876543217", "address": "Corso Italia 1",
//!               "postalCode": "00184", "city": "Roma", "province": "RM"},
//!     "producer": {"companyName": "Rossi Srl", "vatNumber": "IT05056450157", "address": "Via Roma 1",
//!                  "postalCode": "20121", "city": "Milano", "province": "MI"}
//! }"#).unwrap();
//!
//! let invoice = fatturapa::generate(&aggregate, &[], &CodecConfig::default(), "00001").unwrap();
//! assert_eq!(invoice.file_name, "IT05056450157_00001.xml");
//! let xml = String::from_utf8(invoice.xml).unwrap();
//! assert!(xml.contains("<ImportoTotaleDocumento>122.00</ImportoTotaleDocumento>"));
//! ```

mod attachments;
mod pipeline;
mod writer;
pub(crate) mod xml_utils;

pub use attachments::{embed, encode_attachment};
pub use pipeline::{GeneratedInvoice, Generation, GenerationStage, generate};
pub use writer::{XmlOptions, to_fatturapa_xml, to_fatturapa_xml_with};

/// `xsi:schemaLocation` of the FatturaPA 1.2 schema.
pub const FPR12_SCHEMA_LOCATION: &str = "http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2 http://www.fatturapa.gov.it/export/fatturazione/sdi/fatturapa/v1.2/Schema_del_file_xml_FatturaPA_versione_1.2.xsd";

/// Namespace URIs declared on the root element.
pub mod ns {
    pub const FATTURA: &str = "http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2";
    pub const DS: &str = "http://www.w3.org/2000/09/xmldsig#";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}
