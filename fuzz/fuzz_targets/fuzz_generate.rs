#![no_main]

use fattura::config::CodecConfig;
use fattura::sale::SaleAggregate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary records must yield a document or an error, never a panic.
    if let Ok(aggregate) = serde_json::from_slice::<SaleAggregate>(data) {
        let config = CodecConfig::default();
        if let Ok(invoice) = fattura::fatturapa::generate(&aggregate, &[], &config, "00001") {
            assert!(std::str::from_utf8(&invoice.xml).is_ok());
        }
    }
});
