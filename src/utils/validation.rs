use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately permissive: the form only needs to catch obvious typos,
// not enforce RFC 5322.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

// UAE mobile/business numbers: optional country code or trunk prefix,
// then a 9-digit subscriber number starting with 5, 6 or 7.
static UAE_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+971|00971|0)?([567]\d{8})$").unwrap());

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

pub fn is_valid_uae_phone(input: &str) -> bool {
    UAE_PHONE_RE.is_match(&strip_separators(input))
}

/// E.164 form (`+9715XXXXXXXX`) of a UAE number, used as the rate-limit key
/// and as the number handed to the dialer. `None` when the input does not
/// pass `is_valid_uae_phone`.
pub fn canonical_uae_phone(input: &str) -> Option<String> {
    let stripped = strip_separators(input);
    let caps = UAE_PHONE_RE.captures(&stripped)?;
    Some(format!("+971{}", &caps[2]))
}

fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
