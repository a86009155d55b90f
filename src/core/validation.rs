use super::countries::is_known_country_code;
use super::currencies::is_known_currency_code;
use super::error::ValidationError;
use super::types::*;

/// Destination code used when the recipient has no registered SDI channel.
pub const FALLBACK_DESTINATION_CODE: &str = "0000000";

/// Validate a mapped document against the FatturaPA field constraints.
/// Returns all validation errors found (not just the first).
pub fn validate_document(doc: &InvoiceDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_header(&doc.header, &mut errors);

    validate_party(&doc.supplier, "supplier", &mut errors);
    if doc.supplier.vat_id.is_none() {
        errors.push(ValidationError::new(
            "supplier.vat_id",
            "supplier must have a VAT number (IdFiscaleIVA)",
        ));
    }
    match doc.supplier.tax_regime.as_deref() {
        None => errors.push(ValidationError::new(
            "supplier.tax_regime",
            "supplier tax regime (RegimeFiscale) is required",
        )),
        Some(code) if !is_valid_tax_regime(code) => errors.push(ValidationError::new(
            "supplier.tax_regime",
            format!("unknown tax regime '{code}'"),
        )),
        Some(_) => {}
    }

    validate_party(&doc.customer, "customer", &mut errors);
    if doc.customer.vat_id.is_none() && doc.customer.fiscal_code.is_none() {
        errors.push(ValidationError::with_rule(
            "customer",
            "customer must have a VAT number or a fiscal code",
            "00417",
        ));
    }

    validate_general(&doc.general, &mut errors);

    if doc.lines.is_empty() {
        errors.push(ValidationError::new("lines", "document has no lines"));
    }
    for (i, line) in doc.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    for (i, att) in doc.attachments.iter().enumerate() {
        let prefix = format!("attachments[{i}]");
        if att.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{prefix}.name"),
                "attachment name must not be empty",
            ));
        }
        check_len(&att.name, 60, &format!("{prefix}.name"), &mut errors);
        if let Some(format) = &att.format {
            check_len(format, 10, &format!("{prefix}.format"), &mut errors);
        }
        if let Some(desc) = &att.description {
            check_len(desc, 100, &format!("{prefix}.description"), &mut errors);
        }
    }

    errors
}

/// Check whether `code` is a RegimeFiscale code (RF01–RF19, RF03 withdrawn).
pub fn is_valid_tax_regime(code: &str) -> bool {
    let Some(n) = code.strip_prefix("RF") else {
        return false;
    };
    code.len() == 4
        && n.chars().all(|c| c.is_ascii_digit())
        && matches!(n.parse::<u8>(), Ok(1..=19))
        && n != "03"
}

/// Check whether `code` is a usable progressive number (1–10 alphanumerics).
pub fn is_valid_progressive_number(code: &str) -> bool {
    (1..=10).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric())
}

fn validate_header(header: &InvoiceHeader, errors: &mut Vec<ValidationError>) {
    if !is_valid_progressive_number(&header.progressive_number) {
        errors.push(ValidationError::new(
            "header.progressive_number",
            format!(
                "progressive number '{}' must be 1-10 alphanumeric characters",
                header.progressive_number
            ),
        ));
    }

    let expected = header.format.destination_code_len();
    let code = &header.destination_code;
    if code.len() != expected || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::with_rule(
            "header.destination_code",
            format!(
                "destination code '{code}' must be {expected} alphanumeric characters for {}",
                header.format.code()
            ),
            "00427",
        ));
    }

    if header.recipient_pec.is_some() && code != FALLBACK_DESTINATION_CODE {
        errors.push(ValidationError::with_rule(
            "header.recipient_pec",
            "recipient PEC is only allowed with the fallback destination code",
            "00426",
        ));
    }

    validate_vat_id(&header.transmitter, "header.transmitter", errors);
}

fn validate_vat_id(id: &VatId, prefix: &str, errors: &mut Vec<ValidationError>) {
    if id.country.len() != 2 || !id.country.chars().all(|c| c.is_ascii_uppercase()) {
        errors.push(ValidationError::new(
            format!("{prefix}.country"),
            format!("country '{}' must be a 2-letter code", id.country),
        ));
    }
    if id.number.is_empty() || id.number.len() > 28 {
        errors.push(ValidationError::new(
            format!("{prefix}.number"),
            "VAT code must be 1-28 characters",
        ));
    }
}

fn validate_party(party: &Party, prefix: &str, errors: &mut Vec<ValidationError>) {
    if let Some(id) = &party.vat_id {
        validate_vat_id(id, &format!("{prefix}.vat_id"), errors);
    }

    if let Some(cf) = &party.fiscal_code {
        if !(11..=16).contains(&cf.len()) || !cf.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(ValidationError::new(
                format!("{prefix}.fiscal_code"),
                format!("fiscal code '{cf}' must be 11-16 alphanumeric characters"),
            ));
        }
    }

    match &party.name {
        PartyName::Company(name) => {
            if name.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("{prefix}.name"),
                    "company name must not be empty",
                ));
            }
            check_len(name, 80, &format!("{prefix}.name"), errors);
        }
        PartyName::Person {
            first_name,
            last_name,
        } => {
            for (field, value) in [("first_name", first_name), ("last_name", last_name)] {
                if value.trim().is_empty() {
                    errors.push(ValidationError::new(
                        format!("{prefix}.{field}"),
                        format!("{field} must not be empty"),
                    ));
                }
                check_len(value, 60, &format!("{prefix}.{field}"), errors);
            }
        }
    }

    validate_address(&party.address, &format!("{prefix}.address"), errors);
}

fn validate_address(address: &Address, prefix: &str, errors: &mut Vec<ValidationError>) {
    if address.street.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.street"),
            "street must not be empty",
        ));
    }
    check_len(&address.street, 60, &format!("{prefix}.street"), errors);

    if let Some(n) = &address.street_number {
        check_len(n, 8, &format!("{prefix}.street_number"), errors);
    }

    if address.city.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.city"),
            "city must not be empty",
        ));
    }
    check_len(&address.city, 60, &format!("{prefix}.city"), errors);

    let cap_ok = address.postal_code.len() == 5
        && address.postal_code.chars().all(|c| c.is_ascii_digit());
    if !cap_ok {
        errors.push(ValidationError::new(
            format!("{prefix}.postal_code"),
            format!(
                "postal code '{}' must be 5 digits",
                address.postal_code
            ),
        ));
    }

    if let Some(province) = &address.province {
        if province.len() != 2 || !province.chars().all(|c| c.is_ascii_uppercase()) {
            errors.push(ValidationError::new(
                format!("{prefix}.province"),
                format!("province '{province}' must be 2 uppercase letters"),
            ));
        }
    }

    if !is_known_country_code(&address.country) {
        errors.push(ValidationError::new(
            format!("{prefix}.country"),
            format!(
                "country code '{}' is not a known ISO 3166-1 alpha-2 code",
                address.country
            ),
        ));
    }
}

fn validate_general(general: &GeneralData, errors: &mut Vec<ValidationError>) {
    if general.currency.len() != 3 || !is_known_currency_code(&general.currency) {
        errors.push(ValidationError::new(
            "general.currency",
            format!("currency '{}' is not a known ISO 4217 code", general.currency),
        ));
    }

    if general.number.trim().is_empty() {
        errors.push(ValidationError::new(
            "general.number",
            "document number must not be empty",
        ));
    } else if !general.number.chars().any(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::with_rule(
            "general.number",
            "document number must contain at least one digit",
            "00425",
        ));
    }
    check_len(&general.number, 20, "general.number", errors);

    for (i, reason) in general.reasons.iter().enumerate() {
        check_len(reason, 200, &format!("general.reasons[{i}]"), errors);
    }

    if let Some(po) = &general.purchase_order {
        check_len(&po.id, 20, "general.purchase_order.id", errors);
    }
    for (i, dn) in general.delivery_notes.iter().enumerate() {
        check_len(&dn.id, 20, &format!("general.delivery_notes[{i}].id"), errors);
    }
}

fn validate_line(line: &InvoiceLine, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.line_number as usize != index + 1 {
        errors.push(ValidationError::new(
            format!("{prefix}.line_number"),
            format!(
                "line number {} breaks the 1-based sequence (expected {})",
                line.line_number,
                index + 1
            ),
        ));
    }

    check_len(&line.description, 1000, &format!("{prefix}.description"), errors);

    if let Some(code) = &line.item_code {
        check_len(code, 35, &format!("{prefix}.item_code"), errors);
    }
    if let Some(unit) = &line.unit {
        check_len(unit, 10, &format!("{prefix}.unit"), errors);
    }

    if line.quantity.is_sign_negative() && !line.quantity.is_zero() {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must not be negative",
        ));
    }

    if let Some(pct) = line.discount_percent {
        if pct.is_sign_negative() || pct > rust_decimal::Decimal::ONE_HUNDRED {
            errors.push(ValidationError::new(
                format!("{prefix}.discount_percent"),
                format!("discount {pct}% must be between 0 and 100"),
            ));
        }
    }
}

fn check_len(value: &str, max: usize, field: &str, errors: &mut Vec<ValidationError>) {
    let len = value.chars().count();
    if len > max {
        errors.push(ValidationError::new(
            field,
            format!("must be at most {max} characters, got {len}"),
        ));
    }
}
