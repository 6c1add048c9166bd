//! Field-level validation errors and shared text checks.

use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure that always names the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is missing or blank after trim.
    Required { field: &'static str },
    /// Field exceeds its character limit.
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Field must not be negative.
    Negative { field: &'static str },
    /// Integer field is outside its allowed range.
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    /// Decimal has too many digits in total or after the point.
    InvalidDecimal {
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
    },
    /// Slug is not in normalized form (or normalizes to nothing).
    InvalidSlug { value: String },
    /// Value collides with a unique constraint.
    Duplicate { field: &'static str, value: String },
    /// Foreign key points at a row that does not exist.
    UnknownReference { field: &'static str, id: EntityId },
}

impl ValidationError {
    /// Returns the field this error is about.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::Negative { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidDecimal { field, .. }
            | Self::Duplicate { field, .. }
            | Self::UnknownReference { field, .. } => field,
            Self::InvalidSlug { .. } => "slug",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{field}: this field is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field}: ensure this field has no more than {max_chars} characters")
            }
            Self::Negative { field } => write!(f, "{field}: must not be negative"),
            Self::OutOfRange { field, min, max } => {
                write!(f, "{field}: must be between {min} and {max}")
            }
            Self::InvalidDecimal {
                field,
                max_digits,
                decimal_places,
            } => write!(
                f,
                "{field}: expected at most {max_digits} digits with {decimal_places} decimal places"
            ),
            Self::InvalidSlug { value } => write!(
                f,
                "slug: `{value}` must contain only lowercase letters, digits and single hyphens"
            ),
            Self::Duplicate { field, value } => {
                write!(f, "{field}: `{value}` already exists")
            }
            Self::UnknownReference { field, id } => {
                write!(f, "{field}: invalid pk `{id}`, object does not exist")
            }
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks a required text field: non-blank and within `max_chars`.
pub fn require_text(field: &'static str, value: &str, max_chars: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    limit_text(field, value, max_chars)
}

/// Checks an optional (blank-allowed) text field against `max_chars`.
pub fn limit_text(field: &'static str, value: &str, max_chars: usize) -> ValidationResult<()> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

/// Checks that a foreign key looks like a row id.
pub fn require_reference(field: &'static str, id: EntityId) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::UnknownReference { field, id });
    }
    Ok(())
}
