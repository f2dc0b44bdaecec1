//! Field-level validation report.
//!
//! # Responsibility
//! - Collect every field violation of one entity value instead of stopping
//!   at the first.
//! - Provide the small set of reusable checks the entities share.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

static TEN_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid contact regex"));
static TEN_TO_FIFTEEN_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,15}$").expect("valid contact regex"));

/// Accepted contact number shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFormat {
    TenDigits,
    TenToFifteenDigits,
}

impl ContactFormat {
    fn matches(self, value: &str) -> bool {
        match self {
            Self::TenDigits => TEN_DIGITS_RE.is_match(value),
            Self::TenToFifteenDigits => TEN_TO_FIFTEEN_DIGITS_RE.is_match(value),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::TenDigits => "must be exactly 10 digits",
            Self::TenToFifteenDigits => "must be between 10 and 15 digits",
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// All violations found for one entity value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<FieldViolation>,
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationReport {}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns whether `field` has at least one violation.
    pub fn has(&self, field: &str) -> bool {
        self.violations.iter().any(|item| item.field == field)
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    /// `Ok(())` when nothing was reported.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Non-blank text whose trimmed length is within `min..=max` chars.
    pub fn text(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let length = value.trim().chars().count();
        if length == 0 {
            self.push(field, "is required");
        } else if length < min {
            self.push(field, format!("must be at least {min} characters"));
        } else if length > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    /// Optional text, checked only for length.
    pub fn optional_text(&mut self, field: &'static str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.push(field, format!("must be at most {max} characters"));
            }
        }
    }

    pub fn contact(&mut self, field: &'static str, value: &str, format: ContactFormat) {
        if !format.matches(value) {
            self.push(field, format.describe());
        }
    }

    pub fn range(&mut self, field: &'static str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    /// Epoch-millisecond timestamp that must not lie in the future.
    pub fn not_in_future(&mut self, field: &'static str, epoch_ms: Option<i64>) {
        if let Some(value) = epoch_ms {
            if value > now_epoch_ms() {
                self.push(field, "must not be in the future");
            }
        }
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{ContactFormat, ValidationReport};

    #[test]
    fn collects_every_violation() {
        let mut report = ValidationReport::new();
        report.text("name", "  ", 1, 50);
        report.contact("contact_number", "12345", ContactFormat::TenDigits);
        report.range("age", 12, 18, 100);

        let err = report.finish().unwrap_err();
        assert_eq!(err.violations().len(), 3);
        assert!(err.has("name"));
        assert!(err.has("contact_number"));
        assert!(err.has("age"));
        assert!(err.to_string().contains("age: must be between 18 and 100"));
    }

    #[test]
    fn contact_formats_differ_in_length() {
        let mut report = ValidationReport::new();
        report.contact("a", "123456789012", ContactFormat::TenToFifteenDigits);
        assert!(report.is_empty());

        report.contact("b", "123456789012", ContactFormat::TenDigits);
        assert!(report.has("b"));
    }

    #[test]
    fn far_future_timestamp_is_rejected() {
        let mut report = ValidationReport::new();
        report.not_in_future("intake_date", Some(i64::MAX - 1));
        report.not_in_future("other", Some(0));
        assert!(report.has("intake_date"));
        assert!(!report.has("other"));
    }
}
