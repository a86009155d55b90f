use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::{FatturaError, ValidationError, collapse_errors};
use super::money::round2;
use super::nature::NatureCode;
use super::summary;
use super::types::*;
use super::validation::{self, FALLBACK_DESTINATION_CODE};

/// Builder for [`InvoiceDocument`].
///
/// ```
/// use fattura::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let supplier = PartyBuilder::company("Rossi Srl", AddressBuilder::new("Via Roma", "20121", "Milano", "IT").province("MI").build())
///     .vat_id("IT", "01234567890")
///     .tax_regime("RF01")
///     .build();
/// let customer = PartyBuilder::company("Bianchi SpA", AddressBuilder::new("Corso Italia", "00184", "Roma", "IT").build())
///     .vat_id("IT", "09876543210")
///     .build();
///
/// let doc = DocumentBuilder::new("42", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .progressive_number("00001")
///     .supplier(supplier)
///     .customer(customer)
///     .add_line(InvoiceLineBuilder::new("Consulenza", dec!(1), dec!(100)).tax_rate(dec!(22)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(doc.general.total, Some(dec!(122)));
/// ```
pub struct DocumentBuilder {
    number: String,
    date: NaiveDate,
    document_type: DocumentType,
    currency: String,
    transmitter: Option<VatId>,
    progressive_number: String,
    destination_code: String,
    transmitter_email: Option<String>,
    recipient_pec: Option<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    reasons: Vec<String>,
    purchase_order: Option<DocumentReference>,
    delivery_notes: Vec<DocumentReference>,
    lines: Vec<InvoiceLine>,
    payment: Option<PaymentTerms>,
    legal_reference: Option<String>,
}

impl DocumentBuilder {
    pub fn new(number: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            date,
            document_type: DocumentType::Invoice,
            currency: "EUR".to_string(),
            transmitter: None,
            progressive_number: String::new(),
            destination_code: FALLBACK_DESTINATION_CODE.to_string(),
            transmitter_email: None,
            recipient_pec: None,
            supplier: None,
            customer: None,
            reasons: Vec::new(),
            purchase_order: None,
            delivery_notes: Vec::new(),
            lines: Vec::new(),
            payment: None,
            legal_reference: None,
        }
    }

    pub fn document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Transmitter id; defaults to the supplier's VAT number.
    pub fn transmitter(mut self, id: VatId) -> Self {
        self.transmitter = Some(id);
        self
    }

    pub fn progressive_number(mut self, code: impl Into<String>) -> Self {
        self.progressive_number = code.into();
        self
    }

    pub fn destination_code(mut self, code: impl Into<String>) -> Self {
        self.destination_code = code.into();
        self
    }

    pub fn transmitter_email(mut self, email: impl Into<String>) -> Self {
        self.transmitter_email = Some(email.into());
        self
    }

    pub fn recipient_pec(mut self, pec: impl Into<String>) -> Self {
        self.recipient_pec = Some(pec.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    /// Add a `Causale` entry.
    pub fn reason(mut self, text: impl Into<String>) -> Self {
        self.reasons.push(text.into());
        self
    }

    pub fn purchase_order(mut self, id: impl Into<String>, date: Option<NaiveDate>) -> Self {
        self.purchase_order = Some(DocumentReference {
            id: id.into(),
            date,
        });
        self
    }

    pub fn delivery_note(mut self, id: impl Into<String>, date: Option<NaiveDate>) -> Self {
        self.delivery_notes.push(DocumentReference {
            id: id.into(),
            date,
        });
        self
    }

    /// Add a line; its number is reassigned to keep the sequence contiguous.
    pub fn add_line(mut self, mut line: InvoiceLine) -> Self {
        line.line_number = self.lines.len() as u32 + 1;
        self.lines.push(line);
        self
    }

    pub fn payment(mut self, payment: PaymentTerms) -> Self {
        self.payment = Some(payment);
        self
    }

    /// `RiferimentoNormativo` for zero-rate summary entries.
    pub fn legal_reference(mut self, text: impl Into<String>) -> Self {
        self.legal_reference = Some(text.into());
        self
    }

    /// Build the document, aggregate taxes and run validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<InvoiceDocument, FatturaError> {
        let legal_reference = self.legal_reference.clone();
        let mut doc = self.build_unchecked()?;
        summary::apply_summary(&mut doc, legal_reference.as_deref())?;
        collapse_errors(validation::validate_document(&doc))?;
        summary::verify_summary(&doc.lines, &doc.tax_summary)?;
        Ok(doc)
    }

    /// Build without aggregation or validation.
    pub fn build_unchecked(self) -> Result<InvoiceDocument, FatturaError> {
        let supplier = self.supplier.ok_or_else(|| {
            FatturaError::Validation(ValidationError::new(
                "supplier",
                "supplier is required",
            ))
        })?;
        let customer = self.customer.ok_or_else(|| {
            FatturaError::Validation(ValidationError::new(
                "customer",
                "customer is required",
            ))
        })?;
        let transmitter = self
            .transmitter
            .or_else(|| supplier.vat_id.clone())
            .ok_or_else(|| {
                FatturaError::Validation(ValidationError::new(
                    "header.transmitter",
                    "no transmitter id and the supplier has no VAT number",
                ))
            })?;

        Ok(InvoiceDocument {
            header: InvoiceHeader {
                transmitter,
                progressive_number: self.progressive_number,
                format: TransmissionFormat::Fpr12,
                destination_code: self.destination_code,
                transmitter_email: self.transmitter_email,
                recipient_pec: self.recipient_pec,
            },
            supplier,
            customer,
            general: GeneralData {
                document_type: self.document_type,
                currency: self.currency,
                date: self.date,
                number: self.number,
                total: None,
                reasons: self.reasons,
                purchase_order: self.purchase_order,
                delivery_notes: self.delivery_notes,
            },
            lines: self.lines,
            tax_summary: Vec::new(),
            payment: self.payment,
            attachments: Vec::new(),
        })
    }
}

/// Builder for [`Party`].
pub struct PartyBuilder {
    name: PartyName,
    vat_id: Option<VatId>,
    fiscal_code: Option<String>,
    address: Address,
    tax_regime: Option<String>,
    contact: Option<Contact>,
}

impl PartyBuilder {
    /// Party identified by a company name (`Denominazione`).
    pub fn company(name: impl Into<String>, address: Address) -> Self {
        Self::with_name(PartyName::Company(name.into()), address)
    }

    /// Party identified by first and last name (`Nome`, `Cognome`).
    pub fn person(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: Address,
    ) -> Self {
        Self::with_name(
            PartyName::Person {
                first_name: first_name.into(),
                last_name: last_name.into(),
            },
            address,
        )
    }

    fn with_name(name: PartyName, address: Address) -> Self {
        Self {
            name,
            vat_id: None,
            fiscal_code: None,
            address,
            tax_regime: None,
            contact: None,
        }
    }

    /// VAT id, already split into country and code.
    pub fn vat_id(mut self, country: impl Into<String>, number: impl Into<String>) -> Self {
        self.vat_id = Some(VatId {
            country: country.into(),
            number: number.into(),
        });
        self
    }

    pub fn fiscal_code(mut self, code: impl Into<String>) -> Self {
        self.fiscal_code = Some(code.into());
        self
    }

    pub fn tax_regime(mut self, code: impl Into<String>) -> Self {
        self.tax_regime = Some(code.into());
        self
    }

    pub fn contact(mut self, phone: Option<String>, email: Option<String>) -> Self {
        if phone.is_some() || email.is_some() {
            self.contact = Some(Contact { phone, email });
        }
        self
    }

    pub fn build(self) -> Party {
        Party {
            vat_id: self.vat_id,
            fiscal_code: self.fiscal_code,
            name: self.name,
            address: self.address,
            tax_regime: self.tax_regime,
            contact: self.contact,
        }
    }
}

/// Builder for [`Address`].
pub struct AddressBuilder {
    street: String,
    street_number: Option<String>,
    postal_code: String,
    city: String,
    province: Option<String>,
    country: String,
}

impl AddressBuilder {
    pub fn new(
        street: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            street_number: None,
            postal_code: postal_code.into(),
            city: city.into(),
            province: None,
            country: country.into(),
        }
    }

    pub fn street_number(mut self, number: impl Into<String>) -> Self {
        self.street_number = Some(number.into());
        self
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            street_number: self.street_number,
            postal_code: self.postal_code,
            city: self.city,
            province: self.province,
            country: self.country,
        }
    }
}

/// Builder for [`InvoiceLine`]. Defaults to the 22% ordinary rate.
pub struct InvoiceLineBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    item_code: Option<String>,
    unit: Option<String>,
    discount_percent: Option<Decimal>,
    tax_rate: Decimal,
    nature: Option<NatureCode>,
}

impl InvoiceLineBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            item_code: None,
            unit: None,
            discount_percent: None,
            tax_rate: Decimal::new(22, 0),
            nature: None,
        }
    }

    /// Rates are kept to the two decimals `AliquotaIVA` can carry.
    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = round2(rate);
        self
    }

    /// Zero rate with the given nature code.
    pub fn exempt(mut self, nature: NatureCode) -> Self {
        self.tax_rate = Decimal::ZERO;
        self.nature = Some(nature);
        self
    }

    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = Some(percent);
        self
    }

    pub fn item_code(mut self, code: impl Into<String>) -> Self {
        self.item_code = Some(code.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn build(self) -> InvoiceLine {
        InvoiceLine {
            line_number: 0,
            item_code: self.item_code,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_rate: self.tax_rate,
            nature: self.nature,
        }
    }
}
