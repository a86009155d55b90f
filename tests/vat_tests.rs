#![cfg(feature = "core")]

use fattura::core::VatId;
use fattura::vat::*;

fn vat(country: &str, number: &str) -> VatId {
    VatId {
        country: country.into(),
        number: number.into(),
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

#[test]
fn prefix_wins_over_declared_country() {
    let id = split_vat("SM12345", "IT").unwrap();
    assert_eq!(id.country, "SM");
    assert_eq!(id.number, "12345");
}

#[test]
fn declared_country_used_for_bare_number() {
    let id = split_vat("09876543217", "IT").unwrap();
    assert_eq!(id, vat("IT", "09876543217"));
}

#[test]
fn code_never_repeats_prefix() {
    for input in ["IT05056450157", "it05056450157", " IT 050 564 501 57 "] {
        let id = split_vat(input, "IT").unwrap();
        assert!(!id.number.starts_with("IT"), "{input} -> {id}");
        assert_eq!(id.number.len(), 11, "{input}");
    }
}

#[test]
fn split_errors_name_the_field() {
    let err = split_vat("IT", "IT").unwrap_err();
    assert_eq!(err.field, "vat_number");
    assert_eq!(err.prefixed("buyer").field, "buyer.vat_number");
}

#[test]
fn foreign_codes_may_contain_letters() {
    let id = split_vat("ESX1234567Z", "IT").unwrap();
    assert_eq!(id, vat("ES", "X1234567Z"));
}

// ---------------------------------------------------------------------------
// Partita IVA check digit
// ---------------------------------------------------------------------------

#[test]
fn known_valid_partite_iva() {
    for number in ["05056450157", "01234567897", "09876543217", "12345678903"] {
        assert!(is_valid_partita_iva(number), "{number}");
        assert!(check_vat_format(&vat("IT", number)).is_ok(), "{number}");
    }
}

#[test]
fn wrong_check_digit() {
    for number in ["01234567890", "09876543210"] {
        assert!(!is_valid_partita_iva(number), "{number}");
        let err = check_vat_format(&vat("IT", number)).unwrap_err();
        assert!(err.reason.contains("check digit"), "{err}");
    }
}

#[test]
fn italian_number_wrong_length() {
    let err = check_vat_format(&vat("IT", "1234567890")).unwrap_err();
    assert!(err.reason.contains("invalid format"), "{err}");
}

#[test]
fn vatican_and_san_marino_formats() {
    assert!(check_vat_format(&vat("VA", "01234567890")).is_ok());
    assert!(check_vat_format(&vat("SM", "1234")).is_err());
}

#[test]
fn other_countries_need_alphanumerics() {
    assert!(check_vat_format(&vat("DE", "123456789")).is_ok());
    assert!(check_vat_format(&vat("DE", "")).is_err());
    assert!(check_vat_format(&vat("DE", "12-34")).is_err());
    assert!(check_vat_format(&vat("DE", &"1".repeat(29))).is_err());
}

// ---------------------------------------------------------------------------
// Fiscal codes
// ---------------------------------------------------------------------------

#[test]
fn personal_fiscal_codes() {
    assert!(check_fiscal_code("RSSMRA85T10A562S").is_ok());
    assert!(check_fiscal_code("MRTMTT91D08F205J").is_ok());
    let err = check_fiscal_code("MRTMTT91D08F205K").unwrap_err();
    assert!(err.reason.contains("check letter"), "{err}");
}

#[test]
fn fiscal_code_normalized_before_check() {
    let cf = normalize_fiscal_code(" mrt mtt 91d08 f205j ");
    assert_eq!(cf, "MRTMTT91D08F205J");
    assert!(check_fiscal_code(&cf).is_ok());
}

#[test]
fn fiscal_code_wrong_length() {
    let err = check_fiscal_code("RSSMRA85T10A562").unwrap_err();
    assert!(err.reason.contains("got 15"), "{err}");
}
