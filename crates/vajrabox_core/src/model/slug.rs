//! Slug normalization and collision suffixing.
//!
//! # Invariants
//! - A normalized slug is non-empty, lowercase ASCII alphanumerics separated
//!   by single hyphens, with no leading or trailing hyphen.
//! - Derived slugs never exceed the column limit, suffix included.

use crate::model::validation::{ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// How a slug should be assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugRequest {
    /// Caller supplied this slug; a collision is a validation error.
    Explicit(String),
    /// Derived from a name; a collision gets a `-N` suffix.
    Derived(String),
}

/// Lowercases `text` and collapses every run of non-alphanumeric characters
/// into one hyphen, truncating to `max_chars`.
///
/// Accented letters fold to their ASCII base (`é` → `e`) through NFKD
/// decomposition; other non-ASCII characters act as separators. Returns an
/// empty string when nothing ASCII-alphanumeric is left.
pub fn slugify(text: &str, max_chars: usize) -> String {
    let folded: String = text.nfkd().filter(|ch| !is_combining_mark(*ch)).collect();
    let lowered = folded.to_lowercase();
    let hyphenated = SEPARATOR_RUN_RE.replace_all(&lowered, "-");
    truncate(hyphenated.trim_matches('-'), max_chars)
}

/// Whether `value` is already a normalized slug.
pub fn is_normalized(value: &str) -> bool {
    !value.is_empty() && slugify(value, usize::MAX) == value
}

/// Builds the insert-time slug request from an optional explicit slug and the
/// text to derive from when it is absent.
pub fn request_for(
    explicit: Option<&str>,
    derive_from: &str,
    max_chars: usize,
) -> ValidationResult<SlugRequest> {
    match explicit {
        Some(value) => {
            validate_explicit(value, max_chars)?;
            Ok(SlugRequest::Explicit(value.to_string()))
        }
        None => {
            let derived = slugify(derive_from, max_chars);
            if derived.is_empty() {
                return Err(ValidationError::InvalidSlug {
                    value: derive_from.to_string(),
                });
            }
            Ok(SlugRequest::Derived(derived))
        }
    }
}

/// Validates a caller-supplied slug.
pub fn validate_explicit(value: &str, max_chars: usize) -> ValidationResult<()> {
    if !is_normalized(value) {
        return Err(ValidationError::InvalidSlug {
            value: value.to_string(),
        });
    }
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong {
            field: "slug",
            max_chars,
        });
    }
    Ok(())
}

/// Returns `base` if free, otherwise the first free `base-2`, `base-3`, ...
///
/// `is_taken` is consulted for each candidate in order.
pub fn first_free<E>(
    base: &str,
    max_chars: usize,
    mut is_taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    if !is_taken(base)? {
        return Ok(base.to_string());
    }

    let mut counter: u64 = 2;
    loop {
        let candidate = with_suffix(base, counter, max_chars);
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn with_suffix(base: &str, counter: u64, max_chars: usize) -> String {
    let suffix = format!("-{counter}");
    let room = max_chars.saturating_sub(suffix.len());
    let stem = truncate(base, room);
    format!("{stem}{suffix}")
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.len() <= max_chars {
        return value.to_string();
    }
    value
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}
