//! Tax summary (`DatiRiepilogo`) aggregation and cross-checks.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::{FatturaError, ValidationError, collapse_errors};
use super::money::{MAX_INTEGER_DIGITS, format_amount, round2};
use super::nature::NatureCode;
use super::types::*;

/// Check every line before any tax arithmetic runs on it.
///
/// Line amounts must fit the 13 integer digits of the schema and discounts
/// must lie in 0-100. Rates carry at most two decimals, so the rate checked
/// and grouped here is the one `AliquotaIVA` shows. A zero rate needs a nature code (SDI 00400); a
/// non-zero rate must not carry one (00401).
pub fn validate_line_taxes(lines: &[InvoiceLine]) -> Vec<ValidationError> {
    let limit = Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS as u32));
    let mut errors = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let field = format!("lines[{i}]");
        match line.quantity.checked_mul(line.unit_price) {
            Some(gross) if gross.abs() < limit => {}
            _ => errors.push(ValidationError::new(
                format!("{field}.unit_price"),
                format!(
                    "line amount {} x {} is out of range (line {})",
                    line.quantity, line.unit_price, line.line_number
                ),
            )),
        }
        if let Some(pct) = line.discount_percent {
            if (pct.is_sign_negative() && !pct.is_zero()) || pct > Decimal::ONE_HUNDRED {
                errors.push(ValidationError::new(
                    format!("{field}.discount_percent"),
                    format!("discount {pct}% must be between 0 and 100"),
                ));
            }
        }
        if line.tax_rate.is_sign_negative() && !line.tax_rate.is_zero() {
            errors.push(ValidationError::new(
                format!("{field}.tax_rate"),
                format!("tax rate {} must not be negative", line.tax_rate),
            ));
        } else if line.tax_rate > Decimal::ONE_HUNDRED {
            errors.push(ValidationError::new(
                format!("{field}.tax_rate"),
                format!("tax rate {} exceeds 100", line.tax_rate),
            ));
        } else if round2(line.tax_rate) != line.tax_rate {
            errors.push(ValidationError::new(
                format!("{field}.tax_rate"),
                format!("tax rate {} has more than two decimals", line.tax_rate),
            ));
        }
        match (line.tax_rate.is_zero(), line.nature) {
            (true, None) => errors.push(ValidationError::with_rule(
                format!("{field}.nature"),
                format!(
                    "exempt lines require a nature code (line {})",
                    line.line_number
                ),
                "00400",
            )),
            (false, Some(nature)) => errors.push(ValidationError::with_rule(
                format!("{field}.nature"),
                format!(
                    "nature code {nature} is only allowed on zero-rate lines (line {})",
                    line.line_number
                ),
                "00401",
            )),
            _ => {}
        }
    }
    errors
}

/// Group lines by `(tax_rate, nature)` and sum their rounded amounts.
///
/// Per-line amounts are rounded first and then summed, never the other way
/// round. Entries come out sorted by ascending rate, then nature code.
/// `legal_reference` overrides the default `RiferimentoNormativo` of nature
/// entries.
pub fn aggregate_tax(
    lines: &[InvoiceLine],
    legal_reference: Option<&str>,
) -> Result<Vec<TaxSummaryEntry>, FatturaError> {
    collapse_errors(validate_line_taxes(lines))?;

    let mut groups: BTreeMap<(Decimal, Option<NatureCode>), (Decimal, Decimal)> = BTreeMap::new();
    for line in lines {
        let entry = groups
            .entry((line.tax_rate.normalize(), line.nature))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += line.net_amount();
        entry.1 += line.tax_amount();
    }

    Ok(groups
        .into_iter()
        .map(|((tax_rate, nature), (taxable_amount, tax_amount))| {
            let legal_reference = nature.map(|n| {
                legal_reference
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| n.legal_reference().to_string())
            });
            TaxSummaryEntry {
                tax_rate,
                nature,
                taxable_amount,
                tax_amount,
                legal_reference,
            }
        })
        .collect())
}

/// Aggregate the document's lines into its tax summary and set the total.
pub fn apply_summary(
    doc: &mut InvoiceDocument,
    legal_reference: Option<&str>,
) -> Result<DocumentTotals, FatturaError> {
    doc.tax_summary = aggregate_tax(&doc.lines, legal_reference)?;
    let totals = document_totals(&doc.tax_summary);
    doc.general.total = Some(totals.document_total);
    Ok(totals)
}

/// Totals implied by a tax summary.
pub fn document_totals(summary: &[TaxSummaryEntry]) -> DocumentTotals {
    let taxable_total: Decimal = summary.iter().map(|e| e.taxable_amount).sum();
    let tax_total: Decimal = summary.iter().map(|e| e.tax_amount).sum();
    DocumentTotals {
        taxable_total,
        tax_total,
        document_total: taxable_total + tax_total,
    }
}

/// Cross-check a summary against its lines on the rendered two-decimal strings.
///
/// A mismatch means the summary was not produced from these lines, which is
/// a defect rather than bad input.
pub fn verify_summary(
    lines: &[InvoiceLine],
    summary: &[TaxSummaryEntry],
) -> Result<(), FatturaError> {
    if summary.is_empty() {
        return Err(FatturaError::Serialization(
            "tax summary must contain at least one entry".into(),
        ));
    }

    let line_net: Decimal = lines.iter().map(InvoiceLine::net_amount).sum();
    let line_tax: Decimal = lines.iter().map(InvoiceLine::tax_amount).sum();
    let totals = document_totals(summary);

    let checks = [
        ("taxable", line_net, totals.taxable_total),
        ("tax", line_tax, totals.tax_total),
    ];
    for (what, from_lines, from_summary) in checks {
        let a = format_amount(from_lines)?;
        let b = format_amount(from_summary)?;
        if a != b {
            return Err(FatturaError::Serialization(format!(
                "{what} total {b} in summary does not match {a} from lines"
            )));
        }
    }

    for entry in summary {
        let has_lines = lines
            .iter()
            .any(|l| l.tax_rate == entry.tax_rate && l.nature == entry.nature);
        if !has_lines {
            return Err(FatturaError::Serialization(format!(
                "summary entry for rate {} has no matching lines",
                entry.tax_rate
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(n: u32, qty: Decimal, price: Decimal, rate: Decimal, nature: Option<NatureCode>) -> InvoiceLine {
        InvoiceLine {
            line_number: n,
            item_code: None,
            description: format!("item {n}"),
            quantity: qty,
            unit: None,
            unit_price: price,
            discount_percent: None,
            tax_rate: rate,
            nature,
        }
    }

    #[test]
    fn single_line_summary() {
        let lines = vec![line(1, dec!(1.00), dec!(100.00), dec!(22.00), None)];
        let summary = aggregate_tax(&lines, None).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].taxable_amount, dec!(100));
        assert_eq!(summary[0].tax_amount, dec!(22));
        assert_eq!(document_totals(&summary).document_total, dec!(122));
        verify_summary(&lines, &summary).unwrap();
    }

    #[test]
    fn sums_rounded_line_amounts() {
        // Each line: 0.33 * 22% = 0.0726 -> 0.07, summed 0.21.
        // Rounding the pre-summed base (0.99 * 22% = 0.2178) would give 0.22.
        let lines: Vec<_> = (1..=3)
            .map(|n| line(n, dec!(1), dec!(0.33), dec!(22), None))
            .collect();
        let summary = aggregate_tax(&lines, None).unwrap();
        assert_eq!(summary[0].taxable_amount, dec!(0.99));
        assert_eq!(summary[0].tax_amount, dec!(0.21));
    }

    #[test]
    fn grouped_and_sorted_by_rate() {
        let lines = vec![
            line(1, dec!(1), dec!(10), dec!(22), None),
            line(2, dec!(1), dec!(10), dec!(4), None),
            line(3, dec!(1), dec!(10), dec!(0), Some(NatureCode::N4)),
            line(4, dec!(2), dec!(10), dec!(22.00), None),
            line(5, dec!(1), dec!(5), dec!(0), Some(NatureCode::N2_2)),
        ];
        let summary = aggregate_tax(&lines, None).unwrap();
        let keys: Vec<_> = summary.iter().map(|e| (e.tax_rate, e.nature)).collect();
        assert_eq!(
            keys,
            vec![
                (dec!(0), Some(NatureCode::N2_2)),
                (dec!(0), Some(NatureCode::N4)),
                (dec!(4), None),
                (dec!(22), None),
            ]
        );
        assert_eq!(summary[3].taxable_amount, dec!(30));
        assert_eq!(summary[3].tax_amount, dec!(6.60));
        verify_summary(&lines, &summary).unwrap();
    }

    #[test]
    fn exempt_line_without_nature_rejected() {
        let lines = vec![line(1, dec!(1), dec!(10), dec!(0), None)];
        let err = aggregate_tax(&lines, None).unwrap_err();
        let v = err.as_validation().unwrap();
        assert_eq!(v.rule.as_deref(), Some("00400"));
        assert!(v.message.contains("exempt lines require a nature code"));
    }

    #[test]
    fn nature_on_taxed_line_rejected() {
        let lines = vec![line(1, dec!(1), dec!(10), dec!(22), Some(NatureCode::N4))];
        let err = aggregate_tax(&lines, None).unwrap_err();
        assert_eq!(err.as_validation().unwrap().rule.as_deref(), Some("00401"));
    }

    #[test]
    fn oversized_amounts_rejected_before_arithmetic() {
        let huge = Decimal::from(10_i64.pow(15));
        let lines = vec![line(1, huge, huge, dec!(22), None)];
        assert!(aggregate_tax(&lines, None).is_err());
        let mut discounted = line(1, dec!(1), dec!(10), dec!(22), None);
        discounted.discount_percent = Some(dec!(150));
        assert!(aggregate_tax(&[discounted], None).is_err());
    }

    #[test]
    fn rate_finer_than_two_decimals_rejected() {
        let lines = vec![
            line(1, dec!(1), dec!(100), dec!(22), None),
            line(2, dec!(1), dec!(100), dec!(22.001), None),
        ];
        let err = aggregate_tax(&lines, None).unwrap_err();
        assert_eq!(err.as_validation().unwrap().field, "lines[1].tax_rate");

        let tiny = vec![line(1, dec!(1), dec!(100), dec!(0.004), None)];
        assert!(aggregate_tax(&tiny, None).is_err());
    }

    #[test]
    fn legal_reference_override() {
        let lines = vec![line(1, dec!(1), dec!(10), dec!(0), Some(NatureCode::N3_5))];
        let summary = aggregate_tax(&lines, Some("Dich. intento n. 12 del 01/02/2024")).unwrap();
        assert_eq!(
            summary[0].legal_reference.as_deref(),
            Some("Dich. intento n. 12 del 01/02/2024")
        );
        let summary = aggregate_tax(&lines, Some("   ")).unwrap();
        assert_eq!(
            summary[0].legal_reference.as_deref(),
            Some(NatureCode::N3_5.legal_reference())
        );
    }

    #[test]
    fn empty_summary_is_serialization_error() {
        let lines = vec![line(1, dec!(1), dec!(10), dec!(22), None)];
        assert!(matches!(
            verify_summary(&lines, &[]),
            Err(FatturaError::Serialization(_))
        ));
    }

    #[test]
    fn tampered_summary_detected() {
        let lines = vec![line(1, dec!(1), dec!(10), dec!(22), None)];
        let mut summary = aggregate_tax(&lines, None).unwrap();
        summary[0].tax_amount = dec!(2.21);
        assert!(matches!(
            verify_summary(&lines, &summary),
            Err(FatturaError::Serialization(_))
        ));
    }
}
