//! Validation rules and text-to-number parsing shared by every mutation path.
//!
//! # Invariants
//! - A failed validation never leaves partial state behind: callers validate
//!   before touching the scene.
//! - Number parsing follows "longest numeric prefix" semantics, so `"18 y"`
//!   parses as `18` while `"abc"` is rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NUMERIC_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid numeric prefix regex")
});

/// User-facing validation failure. The triggering mutation is aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Age text is blank.
    MissingAge,
    /// Age text has no numeric prefix.
    InvalidAge(String),
    /// Age lies outside `[0, age_max]`.
    AgeOutOfRange { age: f64, age_max: f64 },
    /// Label is blank after trim.
    EmptyLabel,
    /// Branch duration is not a positive number.
    InvalidDuration(String),
    /// Branch would end after the maximum age.
    BranchBeyondAgeMax { end_age: f64, age_max: f64 },
    /// Branch end does not come after its start.
    BranchRange { start_age: f64, end_age: f64 },
    /// Branches grow only from events that carry a sphere.
    MissingSphere,
    /// Branches grow only from events moved off the main axis.
    OnMainAxis,
    /// Bulk import has per-line hard errors.
    BulkLines(Vec<String>),
    /// Bulk import has nothing to insert.
    EmptyBulkImport,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAge => write!(f, "please enter the age of the event"),
            Self::InvalidAge(text) => write!(f, "age `{text}` is not a number"),
            Self::AgeOutOfRange { age, age_max } => {
                write!(f, "age {age} must be between 0 and {age_max}")
            }
            Self::EmptyLabel => write!(f, "event label must not be blank"),
            Self::InvalidDuration(text) => {
                write!(f, "`{text}` is not a valid number of years")
            }
            Self::BranchBeyondAgeMax { end_age, age_max } => write!(
                f,
                "branch would end at {end_age}, maximum age is {age_max}"
            ),
            Self::BranchRange { start_age, end_age } => write!(
                f,
                "branch end {end_age} must come after its start {start_age}"
            ),
            Self::MissingSphere => write!(f, "choose a sphere before growing a branch"),
            Self::OnMainAxis => write!(f, "move the event off the main line first"),
            Self::BulkLines(errors) => write!(f, "{}", errors.join("; ")),
            Self::EmptyBulkImport => write!(f, "no events to import"),
        }
    }
}

impl Error for ValidationError {}

/// JavaScript-style `parseFloat`: longest numeric prefix after leading whitespace.
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let matched = NUMERIC_PREFIX_RE.find(trimmed)?;
    matched
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses user-entered age text.
///
/// The first decimal comma becomes a dot and leading zeros in front of a digit
/// are dropped (`"07"` is `7`, `"0,5"` is `0.5`).
pub fn parse_age(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAge);
    }
    let dotted = trimmed.replacen(',', ".", 1);
    parse_number_prefix(strip_leading_zeros(&dotted))
        .ok_or_else(|| ValidationError::InvalidAge(trimmed.to_string()))
}

/// Parses a branch length in years; must be positive.
pub fn parse_years(text: &str) -> Result<f64, ValidationError> {
    let years = parse_number_prefix(text.trim())
        .ok_or_else(|| ValidationError::InvalidDuration(text.trim().to_string()))?;
    validate_years(years)
}

pub fn validate_years(years: f64) -> Result<f64, ValidationError> {
    if !years.is_finite() || years <= 0.0 {
        return Err(ValidationError::InvalidDuration(years.to_string()));
    }
    Ok(years)
}

pub fn validate_age(age: f64, age_max: f64) -> Result<f64, ValidationError> {
    if !age.is_finite() || age < 0.0 || age > age_max {
        return Err(ValidationError::AgeOutOfRange { age, age_max });
    }
    Ok(age)
}

/// Trims a label, rejecting blank ones.
pub fn normalize_label(label: &str) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

pub fn validate_branch_range(
    start_age: f64,
    end_age: f64,
    age_max: f64,
) -> Result<(), ValidationError> {
    if !end_age.is_finite() || end_age <= start_age {
        return Err(ValidationError::BranchRange { start_age, end_age });
    }
    if end_age > age_max {
        return Err(ValidationError::BranchBeyondAgeMax { end_age, age_max });
    }
    Ok(())
}

fn strip_leading_zeros(text: &str) -> &str {
    let mut rest = text;
    while rest.starts_with('0') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        rest = &rest[1..];
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_age_accepts_decimal_comma_and_leading_zeros() {
        assert_eq!(parse_age("22,5").unwrap(), 22.5);
        assert_eq!(parse_age("007").unwrap(), 7.0);
        assert_eq!(parse_age("0.5").unwrap(), 0.5);
        assert_eq!(parse_age(" 18 years").unwrap(), 18.0);
    }

    #[test]
    fn parse_age_rejects_blank_and_non_numeric() {
        assert_eq!(parse_age("  "), Err(ValidationError::MissingAge));
        assert!(matches!(parse_age("twenty"), Err(ValidationError::InvalidAge(_))));
    }

    #[test]
    fn parse_years_requires_positive_value() {
        assert_eq!(parse_years("5").unwrap(), 5.0);
        assert!(parse_years("0").is_err());
        assert!(parse_years("-3").is_err());
        assert!(parse_years("many").is_err());
    }

    #[test]
    fn branch_range_checks_order_and_limit() {
        assert!(validate_branch_range(20.0, 25.0, 100.0).is_ok());
        assert!(matches!(
            validate_branch_range(20.0, 20.0, 100.0),
            Err(ValidationError::BranchRange { .. })
        ));
        assert!(matches!(
            validate_branch_range(95.0, 101.0, 100.0),
            Err(ValidationError::BranchBeyondAgeMax { .. })
        ));
    }

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(normalize_label("  Moved city ").unwrap(), "Moved city");
        assert_eq!(normalize_label(" \t"), Err(ValidationError::EmptyLabel));
    }
}
