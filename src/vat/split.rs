use crate::core::{ValidationError, VatId};

/// Split a VAT number into country code and code.
///
/// The input may carry a leading two-letter country prefix
/// ("IT05056450157") or not ("05056450157"); without one, the party's
/// `declared_country` is used. Whitespace is dropped and letters are
/// uppercased. The prefix is never repeated inside the code.
pub fn split_vat(full: &str, declared_country: &str) -> Result<VatId, ValidationError> {
    let cleaned: String = full
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let has_prefix = cleaned.len() >= 2 && cleaned.as_bytes()[..2].iter().all(u8::is_ascii_alphabetic);
    let (country, number) = if has_prefix {
        (cleaned[..2].to_string(), cleaned[2..].to_string())
    } else {
        (declared_country.trim().to_ascii_uppercase(), cleaned)
    };

    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "vat_number",
            format!("cannot determine the country of VAT number '{full}'"),
        ));
    }

    if number.is_empty() {
        return Err(ValidationError::new(
            "vat_number",
            format!("VAT number '{full}' has no code after the country prefix"),
        ));
    }

    let allowed = if country == "IT" {
        number.chars().all(|c| c.is_ascii_digit())
    } else {
        number.chars().all(|c| c.is_ascii_alphanumeric())
    };
    if !allowed {
        return Err(ValidationError::new(
            "vat_number",
            format!("VAT number '{full}' contains invalid characters for {country}"),
        ));
    }

    Ok(VatId { country, number })
}

/// Trim, drop inner whitespace and uppercase a fiscal code.
///
/// No structural check is made here; formats differ per country.
pub fn normalize_fiscal_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_number_is_not_double_counted() {
        let id = split_vat("IT05056450157", "IT").unwrap();
        assert_eq!(id.country, "IT");
        assert_eq!(id.number, "05056450157");
    }

    #[test]
    fn bare_number_uses_declared_country() {
        let id = split_vat(" 0505 6450 157 ", " it").unwrap();
        assert_eq!(id.country, "IT");
        assert_eq!(id.number, "05056450157");
    }

    #[test]
    fn lowercase_prefix() {
        let id = split_vat("it05056450157", "IT").unwrap();
        assert_eq!(id.to_string(), "IT05056450157");
    }

    #[test]
    fn empty_code_rejected() {
        assert!(split_vat("IT", "IT").is_err());
        assert!(split_vat("", "IT").is_err());
        assert!(split_vat("   ", "IT").is_err());
    }

    #[test]
    fn unknown_country_without_prefix() {
        assert!(split_vat("05056450157", "").is_err());
        assert!(split_vat("05056450157", "ITA").is_err());
    }

    #[test]
    fn italian_code_must_be_digits() {
        let err = split_vat("IT0505645015X", "IT").unwrap_err();
        assert!(err.message.contains("invalid characters"));
        assert!(split_vat("ATU12345678", "AT").is_ok());
    }

    #[test]
    fn fiscal_code_normalized() {
        assert_eq!(normalize_fiscal_code(" rssmra85t10a562s "), "RSSMRA85T10A562S");
        assert_eq!(normalize_fiscal_code("RSS MRA 85T10 A562S"), "RSSMRA85T10A562S");
    }
}
