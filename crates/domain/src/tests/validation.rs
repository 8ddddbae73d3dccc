// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, normalize_email, optional_text, require_text};

#[test]
fn test_normalize_email_lowercases_and_trims() {
    assert_eq!(
        normalize_email("  Pat.Installer@Example.COM "),
        Ok(String::from("pat.installer@example.com"))
    );
}

#[test]
fn test_normalize_email_rejects_malformed_addresses() {
    for bad in [
        "",
        "   ",
        "no-at-sign.example.com",
        "@example.com",
        "a@b@example.com",
        "pat@localhost",
        "pat@.example.com",
        "pat@example.com.",
        "pat smith@example.com",
    ] {
        assert!(
            matches!(normalize_email(bad), Err(DomainError::InvalidEmail(_))),
            "expected {bad:?} to be rejected"
        );
    }
}

#[test]
fn test_require_text_trims() {
    assert_eq!(
        require_text("title", "  Hang uppers "),
        Ok(String::from("Hang uppers"))
    );
    assert_eq!(
        require_text("title", " \t"),
        Err(DomainError::MissingField("title"))
    );
}

#[test]
fn test_optional_text_maps_blank_to_none() {
    assert_eq!(optional_text(None), None);
    assert_eq!(optional_text(Some("   ")), None);
    assert_eq!(
        optional_text(Some(" gate code 4411 ")),
        Some(String::from("gate code 4411"))
    );
}
