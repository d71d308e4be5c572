//! Utility functions for dates, page URLs and credential redaction.
//!
//! This module provides helper functions used throughout the application:
//! - Date parsing and the date → page URL mapping
//! - Credential previews safe to put in logs and error bodies
//! - String truncation for logging

use crate::error::LecturasError;
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Exact `YYYY-MM-DD` layout, ASCII digits only.
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Characters kept from the start of a credential in previews.
const PREVIEW_HEAD: usize = 10;
/// Characters kept from the end of a credential in previews.
const PREVIEW_TAIL: usize = 5;

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// Only the exact shape is accepted: a four-digit year and two-digit month
/// and day. chrono alone would also take signed or unpadded fields.
///
/// # Errors
///
/// Returns [`LecturasError::InvalidDate`] carrying the input and a
/// description of the problem (chrono's, e.g. `"input is out of range"` for
/// `2025-13-40`).
pub fn parse_fecha(input: &str) -> Result<NaiveDate, LecturasError> {
    if !DATE_SHAPE.is_match(input) {
        return Err(LecturasError::InvalidDate {
            input: input.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        });
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| LecturasError::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Today's date on the server, formatted as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Build the readings page URL for a date.
///
/// The path is `{base}/YYYY/MM/DD.html` with month and day zero-padded.
///
/// # Examples
///
/// ```ignore
/// let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(
///     resolve_url("https://www.vaticannews.va/es/evangelio-de-hoy", date),
///     "https://www.vaticannews.va/es/evangelio-de-hoy/2025/03/07.html"
/// );
/// ```
pub fn resolve_url(base: &str, date: NaiveDate) -> String {
    format!(
        "{}/{:04}/{:02}/{:02}.html",
        base.trim_end_matches('/'),
        date.year(),
        date.month(),
        date.day()
    )
}

/// Redact a credential down to its first 10 and last 5 characters.
///
/// Credentials too short to elide anything are fully masked so the preview
/// can never equal the secret.
pub fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= PREVIEW_HEAD + PREVIEW_TAIL {
        return "...".to_string();
    }
    let head: String = chars[..PREVIEW_HEAD].iter().collect();
    let tail: String = chars[chars.len() - PREVIEW_TAIL..].iter().collect();
    format!("{head}...{tail}")
}

/// Describe the configured credential for failure bodies.
pub fn token_info(token: Option<&str>) -> String {
    match token {
        Some(token) => format!(
            "Token {} (longitud: {})",
            token_preview(token),
            token.chars().count()
        ),
        None => "NO CONFIGURADO".to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` characters with an ellipsis and the number
/// of dropped characters appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…(+{} chars)", &s[..idx], s[idx..].chars().count()),
    }
}
