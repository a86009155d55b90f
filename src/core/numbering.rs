use super::error::FatturaError;
use super::validation::is_valid_progressive_number;

/// Generator for `ProgressivoInvio` values.
///
/// Produces `{prefix}{zero-padded counter}`, e.g. "00001", "00002" or
/// "A0001". The SDI only requires uniqueness per transmitter; the caller owns
/// persistence of the counter between generations.
#[derive(Debug, Clone)]
pub struct ProgressiveSequence {
    prefix: String,
    next_number: u64,
    zero_pad: usize,
}

impl ProgressiveSequence {
    /// Create a new sequence starting at 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// Create a sequence continuing from a given number.
    pub fn starting_at(prefix: impl Into<String>, next_number: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next_number,
            zero_pad: 5,
        }
    }

    /// Resume after the last issued code, e.g. "A0042" with prefix "A".
    pub fn resume_after(prefix: impl Into<String>, last: &str) -> Result<Self, FatturaError> {
        let prefix = prefix.into();
        let digits = last.strip_prefix(prefix.as_str()).ok_or_else(|| {
            FatturaError::Config(format!("'{last}' does not start with prefix '{prefix}'"))
        })?;
        let n: u64 = digits
            .parse()
            .map_err(|_| FatturaError::Config(format!("'{last}' has no numeric counter")))?;
        let next = n.checked_add(1).ok_or_else(|| {
            FatturaError::Config(format!("counter of '{last}' cannot be incremented"))
        })?;
        Ok(Self {
            zero_pad: digits.len(),
            ..Self::starting_at(prefix, next)
        })
    }

    /// Set zero-padding width (default: 5, so "00001").
    pub fn with_padding(mut self, width: usize) -> Self {
        self.zero_pad = width;
        self
    }

    /// Issue the next code.
    ///
    /// Fails once the code no longer fits the 10-character limit.
    pub fn next_code(&mut self) -> Result<String, FatturaError> {
        let code = self.peek();
        if !is_valid_progressive_number(&code) {
            return Err(FatturaError::Config(format!(
                "progressive number '{code}' exceeds 10 alphanumeric characters"
            )));
        }
        self.next_number += 1;
        Ok(code)
    }

    /// Preview the next code without consuming it.
    pub fn peek(&self) -> String {
        format!(
            "{}{:0>width$}",
            self.prefix,
            self.next_number,
            width = self.zero_pad
        )
    }

    /// The raw counter that will be issued next.
    pub fn next_raw(&self) -> u64 {
        self.next_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_codes() {
        let mut seq = ProgressiveSequence::new("");
        assert_eq!(seq.next_code().unwrap(), "00001");
        assert_eq!(seq.next_code().unwrap(), "00002");
        assert_eq!(seq.next_raw(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut seq = ProgressiveSequence::new("A");
        assert_eq!(seq.peek(), "A00001");
        assert_eq!(seq.peek(), "A00001");
        assert_eq!(seq.next_code().unwrap(), "A00001");
        assert_eq!(seq.peek(), "A00002");
    }

    #[test]
    fn resume() {
        let mut seq = ProgressiveSequence::resume_after("B", "B0042").unwrap();
        assert_eq!(seq.next_code().unwrap(), "B0043");
        assert!(ProgressiveSequence::resume_after("B", "C0042").is_err());
        assert!(ProgressiveSequence::resume_after("B", "Bxx").is_err());
    }

    #[test]
    fn resume_after_largest_counter_rejected() {
        let last = u64::MAX.to_string();
        assert!(matches!(
            ProgressiveSequence::resume_after("", &last),
            Err(FatturaError::Config(_))
        ));
    }

    #[test]
    fn overflow_rejected() {
        let mut seq = ProgressiveSequence::starting_at("", 9_999_999_999).with_padding(3);
        assert_eq!(seq.next_code().unwrap(), "9999999999");
        assert!(seq.next_code().is_err());
    }
}
