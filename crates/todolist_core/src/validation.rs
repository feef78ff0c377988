//! Syntax rules for user-supplied account data and due-date times.
//!
//! # Responsibility
//! - Provide pure predicates for account names, passwords and email addresses.
//! - Parse the accepted time-of-day grammars for due dates.
//!
//! # Invariants
//! - Every function here is stateless and side-effect free.
//! - Decoders never call these predicates; see `Accounts::consistency_issues`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,}$").expect("valid identifier regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("valid email regex")
});
static CLOCK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2}):([0-9]{1,2})(?::[0-9]{1,2})?$").expect("valid clock time regex")
});
static BARE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,4}$").expect("valid bare time regex"));

const MAX_EMAIL_LOCAL_CHARS: usize = 64;
const MAX_EMAIL_CHARS: usize = 254;

/// Rejected user input for model mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Time text matches none of the accepted time-of-day grammars.
    InvalidTimeText(String),
    /// Email address is empty or syntactically invalid.
    InvalidEmail(String),
    /// Account name does not match `[A-Za-z0-9_-]{3,}`.
    InvalidIdentifier(String),
    /// Password does not meet the length/character-class policy.
    WeakPassword,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeText(value) => write!(f, "invalid time of day: `{value}`"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidIdentifier(value) => write!(
                f,
                "invalid account name `{value}`; expected at least 3 of [A-Za-z0-9_-]"
            ),
            Self::WeakPassword => write!(
                f,
                "password must be longer than 6 characters and contain upper case, lower case and digits"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Returns whether `value` is an acceptable account name.
pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}

/// Returns whether `value` satisfies the password policy.
///
/// Longer than 6 characters, with at least one ASCII upper case letter, one
/// lower case letter and one digit.
pub fn is_valid_credential(value: &str) -> bool {
    value.chars().count() > 6
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// Returns whether `value` is a non-empty, syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_EMAIL_CHARS || !EMAIL_RE.is_match(value) {
        return false;
    }
    let Some((local, _domain)) = value.rsplit_once('@') else {
        return false;
    };
    local.len() <= MAX_EMAIL_LOCAL_CHARS
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
}

/// Checks name and password syntax for a new registration.
pub fn validate_registration(name: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_identifier(name) {
        return Err(ValidationError::InvalidIdentifier(name.to_string()));
    }
    if !is_valid_credential(password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// Parses due-date time text into `(hour, minute)`.
///
/// Accepted shapes: `H:M`, `H:MM`, `HH:MM`, optionally followed by `:SS`
/// (seconds are discarded), or 1-4 bare digits. Bare digits are hours only
/// when at most two are given; with three or four digits the last two are
/// minutes.
///
/// Hours >= 24 and minutes >= 60 are clamped to `0` instead of rejected.
pub fn parse_time_of_day(text: &str) -> Result<(u32, u32), ValidationError> {
    let (hour, minute) = if let Some(captures) = CLOCK_TIME_RE.captures(text) {
        (
            parse_digits(&captures[1], text)?,
            parse_digits(&captures[2], text)?,
        )
    } else if BARE_TIME_RE.is_match(text) {
        if text.len() > 2 {
            let split = text.len() - 2;
            (
                parse_digits(&text[..split], text)?,
                parse_digits(&text[split..], text)?,
            )
        } else {
            (parse_digits(text, text)?, 0)
        }
    } else {
        return Err(ValidationError::InvalidTimeText(text.to_string()));
    };

    Ok((
        if hour < 24 { hour } else { 0 },
        if minute < 60 { minute } else { 0 },
    ))
}

fn parse_digits(digits: &str, original: &str) -> Result<u32, ValidationError> {
    digits
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTimeText(original.to_string()))
}
