//! Structural checks for Italian VAT numbers and fiscal codes.

use std::fmt;

use crate::core::VatId;

/// Error returned when a VAT number or fiscal code fails a format check.
#[derive(Debug, Clone)]
pub struct VatFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for VatFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tax identifier '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for VatFormatError {}

/// Check an already split VAT id against its country's pattern.
///
/// Italian numbers must also carry a correct check digit. Countries without
/// a known pattern only need an alphanumeric code of 1-28 characters.
pub fn check_vat_format(id: &VatId) -> Result<(), VatFormatError> {
    let number = id.number.as_str();
    let fail = |reason: &str| VatFormatError {
        value: id.to_string(),
        reason: reason.to_string(),
    };

    type CodeCheck = fn(&str) -> bool;
    let patterns: &[(&str, CodeCheck)] = &[
        ("IT", |n| n.len() == 11 && n.chars().all(|c| c.is_ascii_digit())),
        ("SM", |n| n.len() == 5 && n.chars().all(|c| c.is_ascii_digit())),
        ("VA", |n| n.len() == 11 && n.chars().all(|c| c.is_ascii_digit())),
    ];

    match patterns.iter().find(|(code, _)| *code == id.country) {
        Some((_, check)) if !check(number) => {
            Err(fail(&format!("invalid format for country {}", id.country)))
        }
        Some(_) if id.country == "IT" && !is_valid_partita_iva(number) => {
            Err(fail("check digit does not match"))
        }
        Some(_) => Ok(()),
        None if (1..=28).contains(&number.len())
            && number.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            Ok(())
        }
        None => Err(fail("code must be 1-28 alphanumeric characters")),
    }
}

/// Verify the check digit of an 11-digit Italian VAT number (partita IVA).
pub fn is_valid_partita_iva(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || number.len() != 11 {
        return false;
    }
    let sum: u32 = digits[..10]
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                d
            } else {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            }
        })
        .sum();
    (10 - sum % 10) % 10 == digits[10]
}

/// Check an Italian fiscal code.
///
/// Accepts the 11-digit form used by companies (validated like a VAT
/// number) and the 16-character personal form with its check letter.
pub fn check_fiscal_code(code: &str) -> Result<(), VatFormatError> {
    let fail = |reason: &str| VatFormatError {
        value: code.to_string(),
        reason: reason.to_string(),
    };

    match code.len() {
        11 if is_valid_partita_iva(code) => Ok(()),
        11 => Err(fail("check digit does not match")),
        16 if code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) => {
            let expected = personal_check_letter(&code[..15]);
            if code.as_bytes()[15] == expected {
                Ok(())
            } else {
                Err(fail("check letter does not match"))
            }
        }
        16 => Err(fail("must contain only uppercase letters and digits")),
        n => Err(fail(&format!("expected 11 or 16 characters, got {n}"))),
    }
}

/// Values of characters in odd (1-based) positions.
const ODD_VALUES: [u32; 26] = [
    1, 0, 5, 7, 9, 13, 15, 17, 19, 21, 2, 4, 18, 20, 11, 3, 6, 8, 12, 14, 16, 10, 22, 25, 24, 23,
];

fn personal_check_letter(first15: &str) -> u8 {
    let sum: u32 = first15
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let idx = if b.is_ascii_digit() {
                (b - b'0') as usize
            } else {
                (b - b'A') as usize
            };
            if i % 2 == 0 { ODD_VALUES[idx] } else { idx as u32 }
        })
        .sum();
    b'A' + (sum % 26) as u8
}
