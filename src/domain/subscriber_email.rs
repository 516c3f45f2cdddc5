//! src/domain/subscriber_email.rs

use once_cell::sync::Lazy;
use regex::Regex;

// ECMAScript `\s`: differs from Unicode White_Space on U+0085 (excluded)
// and U+FEFF (included).
const WHITESPACE: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

// `local@domain.tld`, no whitespace, a single `@`.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let part = format!("[^{}@]+", WHITESPACE);
    Regex::new(&format!(r"^{part}@{part}\.{part}$", part = part))
        .expect("email pattern is a valid regex")
});

fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

pub fn is_valid_email(candidate: &str) -> bool {
    !candidate.is_empty() && EMAIL_PATTERN.is_match(candidate)
}

/// Lower-cases and trims an address before it is used for delivery.
pub fn normalize_email(email: &str) -> String {
    email.trim_matches(is_whitespace).to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<SubscriberEmail, String> {
        if is_valid_email(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid subscriber email.", s))
        }
    }

    /// The delivery form of this address. The result still satisfies the
    /// pattern since trimming and lower-casing never add whitespace or `@`.
    pub fn normalized(&self) -> SubscriberEmail {
        Self(normalize_email(&self.0))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
