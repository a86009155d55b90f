use thiserror::Error;

/// Errors that can occur while turning a sale into an electronic invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FatturaError {
    /// A business precondition is unmet (draft sale, no lines, foreign party, ...).
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// A numeric value cannot be rendered in the two-decimal wire format.
    #[error("formatting failed: {0}")]
    Formatting(FormattingError),

    /// An internal invariant was violated while building the XML tree.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Codec configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FatturaError {
    /// The validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for FatturaError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<FormattingError> for FatturaError {
    fn from(e: FormattingError) -> Self {
        Self::Formatting(e)
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "customer.address.country").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// SDI rejection code the check mirrors, if any (e.g. "00400").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Create a validation error without a rule code.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error tied to an SDI rejection code.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    /// Nest the field path under `prefix` ("vat_number" -> "buyer.vat_number").
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

/// Error returned when a number cannot be rendered for the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingError {
    /// The offending value as text.
    pub value: String,
    /// Why it could not be rendered.
    pub reason: String,
}

impl std::fmt::Display for FormattingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot render '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for FormattingError {}

/// Join several validation errors into the single error the orchestrator reports.
///
/// The first error keeps its field and rule; the message lists every failure.
pub fn collapse_errors(errors: Vec<ValidationError>) -> Result<(), FatturaError> {
    let mut iter = errors.into_iter();
    let Some(first) = iter.next() else {
        return Ok(());
    };
    let rest: Vec<String> = iter.map(|e| e.to_string()).collect();
    if rest.is_empty() {
        return Err(FatturaError::Validation(first));
    }
    Err(FatturaError::Validation(ValidationError {
        message: format!("{}; {}", first.message, rest.join("; ")),
        ..first
    }))
}
