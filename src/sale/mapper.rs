//! Sale records to [`InvoiceDocument`].

use tracing::debug;

use super::records::*;
use crate::config::CodecConfig;
use crate::core::countries::normalize_country_code;
use crate::core::*;
use crate::vat::{check_fiscal_code, check_vat_format, normalize_fiscal_code, split_vat};

/// Longest `Causale` entry.
const REASON_CHUNK: usize = 200;

/// Reject sales this codec cannot invoice.
///
/// Checks, in order: the sale is not a draft (nor cancelled), it has at
/// least one line and no more than `config.max_lines`, and both trading
/// parties are located in `config.domestic_country`.
pub fn check_preconditions(
    aggregate: &SaleAggregate,
    config: &CodecConfig,
) -> Result<(), FatturaError> {
    let sale = &aggregate.sale;
    if !sale.status.is_invoiceable() {
        return Err(ValidationError::new(
            "sale.status",
            format!("cannot invoice {} sale {}", sale.status.as_str(), sale.sale_id),
        )
        .into());
    }

    if aggregate.lines.is_empty() {
        return Err(ValidationError::new(
            "lines",
            format!("sale {} has no lines", sale.sale_id),
        )
        .into());
    }
    if aggregate.lines.len() > config.max_lines {
        return Err(ValidationError::new(
            "lines",
            format!(
                "sale {} has {} lines, more than the limit of {}",
                sale.sale_id,
                aggregate.lines.len(),
                config.max_lines
            ),
        )
        .into());
    }

    for (role, party) in [("producer", &aggregate.producer), ("buyer", &aggregate.buyer)] {
        let country = party.country.trim().to_ascii_uppercase();
        if country != config.domestic_country {
            return Err(ValidationError::new(
                format!("{role}.country"),
                format!(
                    "{role} country '{country}' is not {}: only domestic parties can be invoiced",
                    config.domestic_country
                ),
            )
            .into());
        }
    }
    Ok(())
}

/// Map a sale aggregate onto the document model.
///
/// Runs [`check_preconditions`] first. The returned document has its lines
/// numbered from 1 but no tax summary yet; see
/// [`apply_summary`](crate::core::apply_summary).
pub fn map_sale(
    aggregate: &SaleAggregate,
    config: &CodecConfig,
    progressive_number: &str,
) -> Result<InvoiceDocument, FatturaError> {
    check_preconditions(aggregate, config)?;
    map_checked(aggregate, config, progressive_number)
}

pub(crate) fn map_checked(
    aggregate: &SaleAggregate,
    config: &CodecConfig,
    progressive_number: &str,
) -> Result<InvoiceDocument, FatturaError> {
    let sale = &aggregate.sale;
    let supplier = map_party(&aggregate.producer, "producer", true, config)?;
    let customer = map_party(&aggregate.buyer, "buyer", false, config)?;

    let header = map_header(aggregate, &supplier, config, progressive_number)?;
    let general = map_general(sale, config);
    let lines = map_lines(&aggregate.lines)?;
    let payment = map_payment(sale)?;

    debug!(
        sale_id = %sale.sale_id,
        lines = lines.len(),
        supplier = %supplier.name.display_name(),
        customer = %customer.name.display_name(),
        "sale mapped"
    );

    Ok(InvoiceDocument {
        header,
        supplier,
        customer,
        general,
        lines,
        tax_summary: Vec::new(),
        payment,
        attachments: Vec::new(),
    })
}

fn map_party(
    record: &PartyRecord,
    role: &str,
    is_supplier: bool,
    config: &CodecConfig,
) -> Result<Party, FatturaError> {
    let country = normalize_country_code(&record.country).ok_or_else(|| {
        ValidationError::new(
            format!("{role}.country"),
            format!("unknown country code '{}'", record.country),
        )
    })?;

    let name = match (
        record.company_name.trim(),
        non_empty(&record.first_name),
        non_empty(&record.last_name),
    ) {
        (company, _, _) if !company.is_empty() => PartyName::Company(company.to_string()),
        (_, Some(first), Some(last)) => PartyName::Person {
            first_name: first.to_string(),
            last_name: last.to_string(),
        },
        _ => {
            return Err(ValidationError::new(
                format!("{role}.name"),
                "needs a company name or both first and last name",
            )
            .into());
        }
    };

    let vat_id = match non_empty(&record.vat_number) {
        Some(vat) => {
            let id = split_vat(vat, &country).map_err(|e| e.prefixed(role))?;
            if config.strict_vat_checksum {
                check_vat_format(&id).map_err(|e| {
                    ValidationError::new(format!("{role}.vat_number"), e.to_string())
                })?;
            }
            Some(id)
        }
        None => None,
    };

    let fiscal_code = non_empty(&record.fiscal_code).map(normalize_fiscal_code);
    if let (Some(cf), true) = (&fiscal_code, config.strict_vat_checksum) {
        check_fiscal_code(cf)
            .map_err(|e| ValidationError::new(format!("{role}.fiscal_code"), e.to_string()))?;
    }

    let address = Address {
        street: record.address.trim().to_string(),
        street_number: non_empty(&record.street_number).map(String::from),
        postal_code: record.postal_code.trim().to_string(),
        city: record.city.trim().to_string(),
        province: non_empty(&record.province).map(str::to_ascii_uppercase),
        country,
    };

    let (tax_regime, contact) = if is_supplier {
        let regime = non_empty(&record.tax_regime)
            .unwrap_or(&config.default_tax_regime)
            .to_ascii_uppercase();
        let phone = non_empty(&record.phone).map(String::from);
        let email = non_empty(&record.email).map(String::from);
        let contact = (phone.is_some() || email.is_some()).then_some(Contact { phone, email });
        (Some(regime), contact)
    } else {
        (None, None)
    };

    Ok(Party {
        vat_id,
        fiscal_code,
        name,
        address,
        tax_regime,
        contact,
    })
}

fn map_header(
    aggregate: &SaleAggregate,
    supplier: &Party,
    config: &CodecConfig,
    progressive_number: &str,
) -> Result<InvoiceHeader, FatturaError> {
    let (transmitter, transmitter_email) = match config.transmitter.as_deref() {
        Some(t) => (
            split_vat(t, &config.domestic_country).map_err(|e| e.prefixed("config.transmitter"))?,
            None,
        ),
        None => {
            let id = supplier.vat_id.clone().ok_or_else(|| {
                ValidationError::new(
                    "producer.vat_number",
                    "producer has no VAT number to transmit with",
                )
            })?;
            let email = supplier.contact.as_ref().and_then(|c| c.email.clone());
            (id, email)
        }
    };

    let buyer = &aggregate.buyer;
    let (destination_code, recipient_pec) = match non_empty(&buyer.sdi) {
        Some(code) if code != FALLBACK_DESTINATION_CODE => (code.to_ascii_uppercase(), None),
        _ => (
            FALLBACK_DESTINATION_CODE.to_string(),
            non_empty(&buyer.pec).map(String::from),
        ),
    };

    Ok(InvoiceHeader {
        transmitter,
        progressive_number: progressive_number.to_string(),
        format: TransmissionFormat::Fpr12,
        destination_code,
        transmitter_email,
        recipient_pec,
    })
}

fn map_general(sale: &Sale, config: &CodecConfig) -> GeneralData {
    let document_type = match sale.doc_type {
        SaleDocType::Invoice => DocumentType::Invoice,
        SaleDocType::CreditNote => DocumentType::CreditNote,
        SaleDocType::DebitNote => DocumentType::DebitNote,
        SaleDocType::FeeNote => DocumentType::FeeNote,
    };
    let currency = non_empty(&sale.currency)
        .unwrap_or(&config.default_currency)
        .to_ascii_uppercase();

    let reasons = [&sale.notes, &sale.printed_note]
        .into_iter()
        .filter_map(non_empty)
        .flat_map(|text| chunk_text(text, REASON_CHUNK))
        .collect();

    let purchase_order = non_empty(&sale.po_number).map(|id| DocumentReference {
        id: id.to_string(),
        date: sale.po_date,
    });
    // DataDDT is mandatory; an undated note is taken as shipped on the sale date.
    let delivery_notes = sale
        .delivery_notes()
        .map(|(id, date)| DocumentReference {
            id: id.to_string(),
            date: Some(date.unwrap_or(sale.sale_date)),
        })
        .collect();

    GeneralData {
        document_type,
        currency,
        date: sale.sale_date,
        number: sale.document_number(),
        total: None,
        reasons,
        purchase_order,
        delivery_notes,
    }
}

fn map_lines(records: &[SaleLine]) -> Result<Vec<InvoiceLine>, FatturaError> {
    let mut ordered: Vec<&SaleLine> = records.iter().collect();
    ordered.sort_by_key(|l| l.line_number);

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, record)| -> Result<InvoiceLine, FatturaError> {
            let line_number = i as u32 + 1;
            let field = format!("lines[{i}]");
            let nature = match non_empty(&record.nature_code) {
                Some(code) => Some(NatureCode::from_code(code).ok_or_else(|| {
                    ValidationError::new(
                        format!("{field}.nature"),
                        format!("unknown nature code '{code}' (line {line_number})"),
                    )
                })?),
                None => None,
            };
            let discount = decimal_from_f64(record.discount)?;
            let item_code = non_empty(&record.product_code).map(String::from);

            Ok(InvoiceLine {
                line_number,
                item_code,
                description: record.product_description.trim().to_string(),
                quantity: decimal_from_f64(record.quantity)?,
                unit: non_empty(&record.unit_of_measure).map(String::from),
                unit_price: decimal_from_f64(record.unit_price)?,
                discount_percent: (!discount.is_zero()).then_some(discount),
                tax_rate: round2(decimal_from_f64(record.tax_rate)?),
                nature,
            })
        })
        .collect()
}

fn map_payment(sale: &Sale) -> Result<Option<PaymentTerms>, FatturaError> {
    let iban = non_empty(&sale.co_bank_iban).map(|iban| {
        iban.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase()
    });

    let method = match non_empty(&sale.payment_method) {
        Some(raw) => parse_payment_method(raw).ok_or_else(|| {
            ValidationError::new(
                "sale.payment_method",
                format!("unknown payment method '{raw}'"),
            )
        })?,
        None if iban.is_some() => PaymentMethod::BankTransfer,
        None => return Ok(None),
    };

    Ok(Some(PaymentTerms {
        condition: PaymentCondition::Full,
        method,
        due_date: sale.payment_date,
        amount: None,
        institution: non_empty(&sale.co_bank_description).map(String::from),
        iban,
    }))
}

/// Parse a stored payment method: an `MPxx` code or a common alias.
pub fn parse_payment_method(raw: &str) -> Option<PaymentMethod> {
    let key: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();
    if let Some(method) = PaymentMethod::from_code(&key.to_ascii_uppercase()) {
        return Some(method);
    }

    let method = match key.trim_matches('_') {
        "cash" | "contanti" => PaymentMethod::Cash,
        "cheque" | "check" | "assegno" => PaymentMethod::Cheque,
        "bank_transfer" | "transfer" | "wire_transfer" | "bonifico" | "bonifico_bancario" => {
            PaymentMethod::BankTransfer
        }
        "card" | "credit_card" | "debit_card" | "carta" | "carta_di_credito" => {
            PaymentMethod::PaymentCard
        }
        "rid" => PaymentMethod::Rid,
        "riba" | "ri_ba" | "ricevuta_bancaria" => PaymentMethod::Riba,
        "mav" => PaymentMethod::Mav,
        "sepa" | "sdd" | "sepa_direct_debit" => PaymentMethod::SepaDirectDebit,
        "pagopa" => PaymentMethod::PagoPa,
        _ => return None,
    };
    Some(method)
}

/// Split text into trimmed chunks of at most `max` characters.
fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max)
        .map(|c| c.iter().collect::<String>().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn party(country: &str, vat: &str) -> PartyRecord {
        PartyRecord {
            company_name: "Rossi Srl".into(),
            first_name: None,
            last_name: None,
            vat_number: Some(vat.into()),
            fiscal_code: None,
            address: "Via Roma 1".into(),
            street_number: None,
            postal_code: "20121".into(),
            city: "Milano".into(),
            province: Some("mi".into()),
            country: country.into(),
            pec: None,
            sdi: None,
            email: None,
            phone: None,
            tax_regime: None,
        }
    }

    fn aggregate() -> SaleAggregate {
        SaleAggregate {
            sale: Sale {
                sale_id: "s-1".into(),
                sale_number: 42,
                invoice_number: None,
                doc_type: SaleDocType::Invoice,
                sale_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                status: SaleStatus::Confirmed,
                currency: None,
                payment_method: None,
                payment_terms: None,
                payment_date: None,
                co_bank_iban: None,
                co_bank_description: None,
                notes: None,
                printed_note: None,
                po_number: None,
                po_date: None,
                dn_number: None,
                dn_date: None,
                dn_number2: None,
                dn_date2: None,
                dn_number3: None,
                dn_date3: None,
                vat_off: None,
            },
            lines: vec![SaleLine {
                line_number: 1,
                product_code: None,
                product_description: "Consulenza".into(),
                quantity: 1.0,
                unit_price: 100.0,
                discount: 0.0,
                tax_rate: 22.0,
                nature_code: None,
                unit_of_measure: None,
            }],
            buyer: party("IT", "09876543217"),
            producer: party("IT", "IT05056450157"),
        }
    }

    #[test]
    fn maps_parties_and_header() {
        let doc = map_sale(&aggregate(), &CodecConfig::default(), "00001").unwrap();
        let supplier_vat = doc.supplier.vat_id.as_ref().unwrap();
        assert_eq!(supplier_vat.country, "IT");
        assert_eq!(supplier_vat.number, "05056450157");
        assert_eq!(doc.header.transmitter, *supplier_vat);
        assert_eq!(doc.header.destination_code, "0000000");
        assert_eq!(doc.supplier.tax_regime.as_deref(), Some("RF01"));
        assert_eq!(doc.supplier.address.province.as_deref(), Some("MI"));
        assert_eq!(doc.customer.tax_regime, None);
        assert_eq!(doc.general.number, "42");
        assert_eq!(doc.general.currency, "EUR");
        assert!(doc.tax_summary.is_empty());
    }

    #[test]
    fn draft_sale_rejected() {
        let mut agg = aggregate();
        agg.sale.status = SaleStatus::Draft;
        let err = map_sale(&agg, &CodecConfig::default(), "1").unwrap_err();
        assert!(err.to_string().contains("draft sale"), "{err}");
    }

    #[test]
    fn foreign_producer_rejected() {
        let mut agg = aggregate();
        agg.producer.country = "FR".into();
        let err = map_sale(&agg, &CodecConfig::default(), "1").unwrap_err();
        let v = err.as_validation().unwrap();
        assert_eq!(v.field, "producer.country");
        assert!(v.message.contains("domestic"));
    }

    #[test]
    fn lines_renumbered_in_stored_order() {
        let mut agg = aggregate();
        let mut second = agg.lines[0].clone();
        second.line_number = 10;
        second.product_description = "second".into();
        let mut first = agg.lines[0].clone();
        first.line_number = 3;
        first.product_description = "first".into();
        agg.lines = vec![second, first];
        let doc = map_sale(&agg, &CodecConfig::default(), "1").unwrap();
        let lines: Vec<_> = doc
            .lines
            .iter()
            .map(|l| (l.line_number, l.description.as_str()))
            .collect();
        assert_eq!(lines, vec![(1, "first"), (2, "second")]);
    }

    #[test]
    fn sdi_code_or_pec() {
        let mut agg = aggregate();
        agg.buyer.pec = Some("buyer@pec.it".into());
        let doc = map_sale(&agg, &CodecConfig::default(), "1").unwrap();
        assert_eq!(doc.header.destination_code, "0000000");
        assert_eq!(doc.header.recipient_pec.as_deref(), Some("buyer@pec.it"));

        agg.buyer.sdi = Some("abc1234".into());
        let doc = map_sale(&agg, &CodecConfig::default(), "1").unwrap();
        assert_eq!(doc.header.destination_code, "ABC1234");
        assert_eq!(doc.header.recipient_pec, None);
    }

    #[test]
    fn non_finite_amount_is_formatting_error() {
        let mut agg = aggregate();
        agg.lines[0].unit_price = f64::NAN;
        let err = map_sale(&agg, &CodecConfig::default(), "1").unwrap_err();
        assert!(matches!(err, FatturaError::Formatting(_)));
    }

    #[test]
    fn strict_checksum() {
        let mut agg = aggregate();
        agg.buyer.vat_number = Some("01234567890".into());
        assert!(map_sale(&agg, &CodecConfig::default(), "1").is_ok());
        let strict = CodecConfig {
            strict_vat_checksum: true,
            ..CodecConfig::default()
        };
        let err = map_sale(&agg, &strict, "1").unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "buyer.vat_number");
    }

    #[test]
    fn payment_and_references() {
        let mut agg = aggregate();
        agg.sale.payment_method = Some("Bonifico".into());
        agg.sale.co_bank_iban = Some("it60 x054 2811 1010 0000 0123 456".into());
        agg.sale.po_number = Some("PO-7".into());
        agg.sale.dn_number = Some("DDT-1".into());
        agg.lines[0].discount = 10.0;
        let doc = map_sale(&agg, &CodecConfig::default(), "1").unwrap();
        let payment = doc.payment.unwrap();
        assert_eq!(payment.method, PaymentMethod::BankTransfer);
        assert_eq!(payment.iban.as_deref(), Some("IT60X0542811101000000123456"));
        assert_eq!(doc.general.purchase_order.unwrap().id, "PO-7");
        assert_eq!(doc.general.delivery_notes[0].date, Some(agg.sale.sale_date));
        assert_eq!(doc.lines[0].discount_percent, Some(dec!(10)));
    }

    #[test]
    fn payment_aliases() {
        assert_eq!(parse_payment_method("MP12"), Some(PaymentMethod::Riba));
        assert_eq!(parse_payment_method("mp05"), Some(PaymentMethod::BankTransfer));
        assert_eq!(parse_payment_method("Ri.Ba."), Some(PaymentMethod::Riba));
        assert_eq!(parse_payment_method("credit card"), Some(PaymentMethod::PaymentCard));
        assert_eq!(parse_payment_method("barter"), None);
    }

    #[test]
    fn long_notes_chunked() {
        let text = "a".repeat(450);
        let chunks = chunk_text(&text, 200);
        assert_eq!(
            chunks.iter().map(String::len).collect::<Vec<_>>(),
            vec![200, 200, 50]
        );
    }
}
