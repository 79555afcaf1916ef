//! Field validators and normalizers shared by request models.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Longest club name accepted.
pub const MAX_CLUB_NAME_LEN: usize = 100;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref CLUB_NAME: Regex = Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} &'().,\-]*$").unwrap();
    static ref FILE_NAME: Regex = Regex::new(r"^[^/\\\x00-\x1f]+$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects empty or whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Club names start with a letter or digit and stay within a small punctuation set.
pub fn validate_club_name(value: &str) -> Result<(), ValidationError> {
    let normalized = normalize_club_name(value);
    if normalized.is_empty() {
        return Err(error("club_name_blank", "Club name is required"));
    }
    if normalized.chars().count() > MAX_CLUB_NAME_LEN {
        return Err(error(
            "club_name_length",
            "Club name must be at most 100 characters",
        ));
    }
    if !CLUB_NAME.is_match(&normalized) {
        return Err(error(
            "club_name_format",
            "Club name contains unsupported characters",
        ));
    }
    Ok(())
}

/// Payment evidence is a bare file name; empty means none was attached.
pub fn validate_file_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || FILE_NAME.is_match(value) {
        Ok(())
    } else {
        Err(error(
            "file_name",
            "Payment evidence must be a file name without directories",
        ))
    }
}

/// Trims and collapses internal whitespace runs to one space.
pub fn normalize_club_name(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
