#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(id) = fattura::vat::split_vat(s, "IT") {
            assert_eq!(id.country.len(), 2);
            assert!(!id.number.is_empty());
            let _ = fattura::vat::check_vat_format(&id);
        }
        let _ = fattura::vat::check_fiscal_code(s);
    }
});
