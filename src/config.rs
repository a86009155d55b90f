//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::core::{
    DOMESTIC_COUNTRY, FatturaError, currencies::is_known_currency_code, is_known_country_code,
    is_valid_tax_regime,
};

/// Settings shared by every generation call.
///
/// All fields have defaults, so a partial JSON object (or `{}`) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Country both trading parties must be located in.
    pub domestic_country: String,

    /// Currency used when the sale carries none.
    pub default_currency: String,

    /// `RegimeFiscale` used when the producer record has none.
    pub default_tax_regime: String,

    /// VAT id of an intermediary transmitter. The supplier's own VAT id is
    /// used when unset.
    pub transmitter: Option<String>,

    /// Upper bound on lines per document.
    pub max_lines: usize,

    /// Indentation width of the XML output (0 = compact).
    pub indent: usize,

    /// `CodiceTipo` written next to product codes.
    pub item_code_type: String,

    /// Also verify VAT check digits and fiscal-code check letters.
    pub strict_vat_checksum: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            domestic_country: DOMESTIC_COUNTRY.to_string(),
            default_currency: "EUR".to_string(),
            default_tax_regime: "RF01".to_string(),
            transmitter: None,
            max_lines: 10_000,
            indent: 2,
            item_code_type: "INTERNO".to_string(),
            strict_vat_checksum: false,
        }
    }
}

impl CodecConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, FatturaError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FatturaError::Config(format!("invalid codec config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured codes are usable.
    pub fn validate(&self) -> Result<(), FatturaError> {
        if self.domestic_country.len() != 2 || !is_known_country_code(&self.domestic_country) {
            return Err(FatturaError::Config(format!(
                "domestic_country '{}' is not a 2-letter ISO country code",
                self.domestic_country
            )));
        }
        if !is_known_currency_code(&self.default_currency) {
            return Err(FatturaError::Config(format!(
                "default_currency '{}' is not a known ISO 4217 code",
                self.default_currency
            )));
        }
        if !is_valid_tax_regime(&self.default_tax_regime) {
            return Err(FatturaError::Config(format!(
                "default_tax_regime '{}' is not a RegimeFiscale code",
                self.default_tax_regime
            )));
        }
        if self.max_lines == 0 {
            return Err(FatturaError::Config("max_lines must be at least 1".into()));
        }
        if self.item_code_type.trim().is_empty() || self.item_code_type.chars().count() > 35 {
            return Err(FatturaError::Config(
                "item_code_type must be 1-35 characters".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CodecConfig::default();
        config.validate().unwrap();
        assert_eq!(config.domestic_country, "IT");
        assert_eq!(config.indent, 2);
        assert!(!config.strict_vat_checksum);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = CodecConfig::from_json(r#"{"indent": 0, "transmitter": "IT01234567897"}"#)
            .unwrap();
        assert_eq!(config.indent, 0);
        assert_eq!(config.transmitter.as_deref(), Some("IT01234567897"));
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(CodecConfig::from_json("{}").unwrap(), CodecConfig::default());
    }

    #[test]
    fn invalid_values_rejected() {
        for json in [
            r#"{"domestic_country": "ITA"}"#,
            r#"{"item_code_type": ""}"#,
            r#"{"default_currency": "XYZ"}"#,
            r#"{"default_tax_regime": "RF03"}"#,
            r#"{"max_lines": 0}"#,
            r#"{"indent": "two"}"#,
        ] {
            assert!(
                matches!(CodecConfig::from_json(json), Err(FatturaError::Config(_))),
                "{json} should be rejected"
            );
        }
    }
}
