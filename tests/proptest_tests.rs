//! Property-based tests for amount rendering, VAT splitting and tax aggregation.
//!
//! Run with: `cargo test --features all --test proptest_tests`

#![cfg(feature = "fatturapa")]

use chrono::NaiveDate;
use fattura::config::CodecConfig;
use fattura::core::*;
use fattura::fatturapa;
use fattura::vat::split_vat;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::company(
        "Rossi Srl",
        AddressBuilder::new("Via Roma 1", "20121", "Milano", "IT")
            .province("MI")
            .build(),
    )
    .vat_id("IT", "05056450157")
    .tax_regime("RF01")
    .build()
}

fn customer() -> Party {
    PartyBuilder::company(
        "Bianchi SpA",
        AddressBuilder::new("Corso Italia 42", "00184", "Roma", "IT").build(),
    )
    .vat_id("IT", "09876543217")
    .build()
}

fn build_document(lines: Vec<InvoiceLine>) -> InvoiceDocument {
    let mut builder = DocumentBuilder::new("PROP-1", date(2024, 6, 15))
        .progressive_number("00001")
        .supplier(supplier())
        .customer(customer());
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build().unwrap()
}

fn is_two_decimal_number(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    match unsigned.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.len() == 2
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Any decimal with 6 to 10 fractional digits and at most 12 integer digits.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-999_999_999_999_999_999i64..=999_999_999_999_999_999i64, 6u32..=10u32)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Unit price from 0.00 to 99999.999.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0u64..100_000_000u64).prop_map(|mills| Decimal::new(mills as i64, 3))
}

/// Quantity from 0.01 to 500.00.
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1u32..=50_000u32).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// A taxed rate or a zero rate with its nature code.
fn arb_tax() -> impl Strategy<Value = (Decimal, Option<NatureCode>)> {
    prop_oneof![
        Just((dec!(4), None)),
        Just((dec!(5), None)),
        Just((dec!(10), None)),
        Just((dec!(22), None)),
        Just((dec!(0), Some(NatureCode::N2_2))),
        Just((dec!(0), Some(NatureCode::N4))),
    ]
}

fn arb_discount() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![Just(None), (0u32..=10_000u32).prop_map(|bp| Some(Decimal::new(bp as i64, 2)))]
}

fn arb_line() -> impl Strategy<Value = InvoiceLine> {
    (arb_quantity(), arb_price(), arb_tax(), arb_discount()).prop_map(
        |(qty, price, (rate, nature), discount)| {
            let mut builder = InvoiceLineBuilder::new("Articolo", qty, price);
            builder = match nature {
                Some(n) => builder.exempt(n),
                None => builder.tax_rate(rate),
            };
            if let Some(pct) = discount {
                builder = builder.discount(pct);
            }
            builder.build()
        },
    )
}

/// Generate 1-12 valid lines.
fn arb_lines() -> impl Strategy<Value = Vec<InvoiceLine>> {
    prop::collection::vec(arb_line(), 1..=12)
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    /// Every rendered amount has exactly two fractional digits.
    #[test]
    fn format_amount_always_two_decimals(amount in arb_amount()) {
        let s = format_amount(amount).unwrap();
        prop_assert!(is_two_decimal_number(&s), "{} -> {}", amount, s);
    }

    /// The rendered text parses back to the rounded value.
    #[test]
    fn format_amount_matches_round2(amount in arb_amount()) {
        let s = format_amount(amount).unwrap();
        let parsed: Decimal = s.parse().unwrap();
        prop_assert_eq!(parsed, round2(amount));
    }

    /// Rounding moves a value by at most half a cent.
    #[test]
    fn rounding_error_bounded(amount in arb_amount()) {
        let diff = (round2(amount) - amount).abs();
        prop_assert!(diff <= dec!(0.005));
    }

    /// The country prefix never ends up inside the code.
    #[test]
    fn split_vat_strips_prefix(digits in "[0-9]{11}", prefixed in any::<bool>(), lower in any::<bool>()) {
        let prefix = if lower { "it" } else { "IT" };
        let input = if prefixed { format!("{prefix}{digits}") } else { digits.clone() };
        let id = split_vat(&input, "IT").unwrap();
        prop_assert_eq!(id.country.as_str(), "IT");
        prop_assert_eq!(&id.number, &digits);
    }

    /// Summary totals equal the sums of the rounded line amounts.
    #[test]
    fn summary_sums_match_lines(lines in arb_lines()) {
        let doc = build_document(lines);
        let net: Decimal = doc.lines.iter().map(InvoiceLine::net_amount).sum();
        let tax: Decimal = doc.lines.iter().map(InvoiceLine::tax_amount).sum();
        let totals = document_totals(&doc.tax_summary);
        prop_assert_eq!(totals.taxable_total, net);
        prop_assert_eq!(totals.tax_total, tax);
        prop_assert_eq!(doc.general.total, Some(net + tax));
    }

    /// One entry per (rate, nature), sorted by rate.
    #[test]
    fn summary_keys_unique_and_sorted(lines in arb_lines()) {
        let doc = build_document(lines);
        let keys: Vec<_> = doc.tax_summary.iter().map(|e| (e.tax_rate, e.nature.map(|n| n.code()))).collect();
        for pair in keys.windows(2) {
            prop_assert!(pair[0] < pair[1], "{:?}", keys);
        }
        for entry in &doc.tax_summary {
            prop_assert_eq!(entry.nature.is_some(), entry.tax_rate.is_zero());
            prop_assert_eq!(entry.legal_reference.is_some(), entry.nature.is_some());
        }
    }

    /// Serialization is deterministic and the total agrees with the summary.
    #[test]
    fn serialized_total_matches_summary(lines in arb_lines()) {
        let doc = build_document(lines);
        let first = fatturapa::to_fatturapa_xml(&doc).unwrap();
        let second = fatturapa::to_fatturapa_xml(&doc).unwrap();
        prop_assert_eq!(&first, &second);

        let xml = String::from_utf8(first).unwrap();
        let total = format_amount(document_totals(&doc.tax_summary).document_total).unwrap();
        let expected = format!("<ImportoTotaleDocumento>{total}</ImportoTotaleDocumento>");
        prop_assert!(xml.contains(&expected));
        prop_assert_eq!(xml.matches("<DettaglioLinee>").count(), doc.lines.len());
        prop_assert_eq!(xml.matches("<DatiRiepilogo>").count(), doc.tax_summary.len());
    }

    /// Sale records with float amounts always produce a valid invoice.
    #[test]
    fn generate_from_float_records(
        records in prop::collection::vec((1u32..1000u32, 0u32..1_000_000u32, prop::sample::select(vec![4.0f64, 10.0, 22.0])), 1..=8)
    ) {
        let lines: Vec<serde_json::Value> = records
            .iter()
            .enumerate()
            .map(|(i, (qty, cents, rate))| serde_json::json!({
                "lineNumber": i + 1,
                "productDescription": format!("Articolo {}", i + 1),
                "quantity": *qty as f64,
                "unitPrice": *cents as f64 / 100.0,
                "taxRate": rate,
            }))
            .collect();
        let aggregate = serde_json::from_value(serde_json::json!({
            "sale": {"saleId": "p", "saleNumber": 1, "saleDate": "2024-06-15", "status": "confirmed"},
            "lines": lines,
            "buyer": {"companyName": "Bianchi SpA", "vatNumber": "09876543217", "address": "Corso Italia 42",
                      "postalCode": "00184", "city": "Roma"},
            "producer": {"companyName": "Rossi Srl", "vatNumber": "IT05056450157", "address": "Via Roma 1",
                         "postalCode": "20121", "city": "Milano"}
        })).unwrap();
        let invoice = fatturapa::generate(&aggregate, &[], &CodecConfig::default(), "00001").unwrap();
        prop_assert_eq!(invoice.document.lines.len(), records.len());
        prop_assert!(!invoice.xml.is_empty());
    }
}
