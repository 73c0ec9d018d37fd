//! Field rules shared by the models and the registration flow.

use once_cell::sync::Lazy;
use regex::Regex;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 1000;
pub const COMMENT_MIN: usize = 1;
pub const COMMENT_MAX: usize = 500;
pub const USERNAME_MIN: usize = 3;
pub const PASSWORD_MIN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static e-mail pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Length in characters, not bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Trimmed length within `min..=max`.
pub fn length_within(text: &str, min: usize, max: usize) -> bool {
    let len = char_len(text.trim());
    len >= min && len <= max
}
