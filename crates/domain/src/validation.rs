// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Trims and lowercases an email address after a shape check.
///
/// This is not RFC 5322 validation. It requires one `@` with a non-empty
/// local part and a dotted domain, and no whitespace.
///
/// # Arguments
///
/// * `email` - The raw address as entered
///
/// # Returns
///
/// * `Ok(String)` with the normalized address
/// * `Err(DomainError::InvalidEmail)` otherwise
///
/// # Errors
///
/// Returns an error if:
/// - The address is empty or contains whitespace
/// - There is not exactly one `@`
/// - The domain has no dot or starts/ends with one
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let normalized = email.trim().to_ascii_lowercase();
    let invalid = || DomainError::InvalidEmail(email.to_string());

    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = normalized.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(normalized)
}

/// Returns the trimmed value, rejecting blank input.
///
/// # Errors
///
/// Returns `DomainError::MissingField` naming `field` if the value is
/// empty after trimming.
pub fn require_text(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text, mapping blank input to `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
