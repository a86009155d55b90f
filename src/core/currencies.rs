//! Currency codes accepted in `Divisa`.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// ISO 4217 codes seen in Italian invoicing, sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", "ALL", "AMD", "AUD", "BAM", "BGN", "BHD", "BRL", "BYN", "CAD", "CHF", "CLP",
    "CNY", "COP", "CZK", "DKK", "DZD", "EGP", "EUR", "GBP", "GEL", "HKD", "HRK", "HUF",
    "IDR", "ILS", "INR", "IQD", "ISK", "JOD", "JPY", "KES", "KRW", "KWD", "KZT", "MAD",
    "MDL", "MKD", "MXN", "MYR", "NGN", "NOK", "NZD", "OMR", "PEN", "PHP", "PKR", "PLN",
    "QAR", "RON", "RSD", "RUB", "SAR", "SEK", "SGD", "THB", "TND", "TRY", "TWD", "UAH",
    "USD", "VND", "ZAR",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert!(is_known_currency_code("EUR"));
        assert!(is_known_currency_code("CHF"));
        assert!(!is_known_currency_code("ITL"));
        assert!(!is_known_currency_code("eur"));
        assert!(!is_known_currency_code(""));
    }

    #[test]
    fn table_sorted() {
        assert!(CURRENCY_CODES.windows(2).all(|w| w[0] < w[1]));
    }
}
