use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("email pattern is a valid regex")
});

/// First email-like address in `text`, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// Whether `candidate` is a single email-like address.
pub fn is_email(candidate: &str) -> bool {
    EMAIL
        .find(candidate)
        .is_some_and(|m| m.start() == 0 && m.end() == candidate.len())
}
