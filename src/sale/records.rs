//! Sale, line and party records as they come out of the key-value store.
//!
//! Keys are camelCase. Amounts are binary floats; they are converted to
//! decimals by the mapper, never used for arithmetic here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Draft,
    Confirmed,
    Invoiced,
    Paid,
    Cancelled,
}

impl SaleStatus {
    /// Whether a sale in this state may be turned into an invoice.
    pub fn is_invoiceable(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Invoiced | Self::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Kind of document the sale is issued as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleDocType {
    #[default]
    Invoice,
    CreditNote,
    DebitNote,
    FeeNote,
}

/// Sale header record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub sale_id: String,
    #[serde(default)]
    pub sale_number: u64,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub doc_type: SaleDocType,
    pub sale_date: NaiveDate,
    pub status: SaleStatus,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub co_bank_iban: Option<String>,
    #[serde(default)]
    pub co_bank_description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub printed_note: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub po_date: Option<NaiveDate>,
    #[serde(default)]
    pub dn_number: Option<String>,
    #[serde(default)]
    pub dn_date: Option<NaiveDate>,
    #[serde(default)]
    pub dn_number2: Option<String>,
    #[serde(default)]
    pub dn_date2: Option<NaiveDate>,
    #[serde(default)]
    pub dn_number3: Option<String>,
    #[serde(default)]
    pub dn_date3: Option<NaiveDate>,
    /// Legal reference printed for exempt lines.
    #[serde(default)]
    pub vat_off: Option<String>,
}

impl Sale {
    /// The number printed on the invoice: `invoiceNumber` if set, else `saleNumber`.
    pub fn document_number(&self) -> String {
        self.invoice_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.sale_number.to_string())
    }

    /// Delivery-note slots that carry a number, in slot order.
    pub fn delivery_notes(&self) -> impl Iterator<Item = (&str, Option<NaiveDate>)> {
        [
            (&self.dn_number, self.dn_date),
            (&self.dn_number2, self.dn_date2),
            (&self.dn_number3, self.dn_date3),
        ]
        .into_iter()
        .filter_map(|(number, date)| {
            let number = number.as_deref()?.trim();
            (!number.is_empty()).then_some((number, date))
        })
    }
}

fn default_quantity() -> f64 {
    1.0
}

fn default_tax_rate() -> f64 {
    22.0
}

/// One line of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Stored ordering key; the invoice renumbers lines from 1.
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub product_description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    /// Discount percentage.
    #[serde(default)]
    pub discount: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default)]
    pub nature_code: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
}

fn default_country() -> String {
    "IT".to_string()
}

/// Buyer or producer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRecord {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    #[serde(default)]
    pub fiscal_code: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub street_number: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub pec: Option<String>,
    /// SDI destination code.
    #[serde(default)]
    pub sdi: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// RegimeFiscale; only read for producers.
    #[serde(default)]
    pub tax_regime: Option<String>,
}

pub type Buyer = PartyRecord;
pub type Producer = PartyRecord;

/// Everything needed to invoice one sale, fetched by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAggregate {
    pub sale: Sale,
    #[serde(default)]
    pub lines: Vec<SaleLine>,
    pub buyer: Buyer,
    pub producer: Producer,
}

/// Trimmed value, `None` when empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
