//! Input validation shared by the services and the import pipeline.
//!
//! Every check returns a short human-readable reason on failure so the
//! caller can attach it to a field path.

use crate::error::{NestError, NestResult};

const MAX_SLUG_LEN: usize = 64;
const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Check that `slug` is a URL-safe identifier.
pub fn check_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("must not be empty".into());
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!("must be at most {MAX_SLUG_LEN} characters"));
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err("may only contain lowercase letters, digits and '-'".into());
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err("must not start or end with '-' or contain '--'".into());
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> NestResult<()> {
    check_slug(slug).map_err(|reason| NestError::validation(format!("slug '{slug}' {reason}")))
}

/// Derive a slug from a display name, e.g. `"Sea View Room"` → `sea-view-room`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Reduce user input or a `Host` header to a bare lower-case hostname.
///
/// Strips a scheme, any path/query, userinfo, the port and a trailing dot.
pub fn normalize_hostname(input: &str) -> String {
    let mut host = input.trim();
    for scheme in ["https://", "http://"] {
        if host
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        {
            host = &host[scheme.len()..];
        }
    }
    if let Some(end) = host.find(['/', '?', '#']) {
        host = &host[..end];
    }
    if let Some(at) = host.rfind('@') {
        host = &host[at + 1..];
    }
    if let Some(colon) = host.rfind(':') {
        if host[colon + 1..].bytes().all(|b| b.is_ascii_digit()) {
            host = &host[..colon];
        }
    }
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn check_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("contains an empty label".into());
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!("has a label longer than {MAX_LABEL_LEN} characters"));
    }
    if !label
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err("may only contain letters, digits, '-' and '.'".into());
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err("has a label starting or ending with '-'".into());
    }
    Ok(())
}

/// Check an already-normalized hostname.
pub fn check_hostname(hostname: &str) -> Result<(), String> {
    if hostname.is_empty() {
        return Err("must not be empty".into());
    }
    if hostname.len() > MAX_HOSTNAME_LEN {
        return Err(format!("must be at most {MAX_HOSTNAME_LEN} characters"));
    }
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return Err("must contain at least one '.'".into());
    }
    labels.iter().try_for_each(|l| check_label(l))
}

/// Normalize and validate a hostname, returning the stored form.
pub fn validate_hostname(input: &str) -> NestResult<String> {
    let hostname = normalize_hostname(input);
    check_hostname(&hostname)
        .map_err(|reason| NestError::validation(format!("hostname '{input}' {reason}")))?;
    Ok(hostname)
}

pub fn check_email(email: &str) -> Result<(), String> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("must contain '@'".into());
    };
    if local.is_empty() || domain.contains('@') {
        return Err("is not a valid address".into());
    }
    check_hostname(&domain.to_ascii_lowercase())
}

/// Validate an email address and return its lower-cased form.
pub fn validate_email(email: &str) -> NestResult<String> {
    let email = email.trim().to_ascii_lowercase();
    check_email(&email)
        .map_err(|reason| NestError::validation(format!("email '{email}' {reason}")))?;
    Ok(email)
}

pub fn check_currency(code: &str) -> Result<(), String> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err("must be a three-letter upper-case ISO-4217 code".into())
    }
}

/// Check a local time of day written as `HH:MM`.
pub fn check_time_of_day(value: &str) -> Result<(), String> {
    let parsed = value
        .split_once(':')
        .filter(|(h, m)| h.len() == 2 && m.len() == 2)
        .and_then(|(h, m)| Some((h.parse::<u8>().ok()?, m.parse::<u8>().ok()?)));
    match parsed {
        Some((h, m)) if h < 24 && m < 60 => Ok(()),
        _ => Err("must be a time of day formatted as HH:MM".into()),
    }
}

const MAX_CONTENT_KEY_LEN: usize = 128;

/// Check a content block key such as `hero.title` or `faq.items`.
pub fn check_content_key(key: &str) -> Result<(), String> {
    if key.is_empty() || key.len() > MAX_CONTENT_KEY_LEN {
        return Err(format!("must be 1 to {MAX_CONTENT_KEY_LEN} characters"));
    }
    let well_formed = key.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    });
    if !well_formed {
        return Err("must be dot-separated segments of [a-z0-9_-]".into());
    }
    Ok(())
}

/// Reject empty or whitespace-only required text.
pub fn require_text(field: &str, value: &str) -> NestResult<()> {
    if value.trim().is_empty() {
        return Err(NestError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_slugs() {
        assert!(check_slug("casa-lumen").is_ok());
        assert!(check_slug("villa2").is_ok());
    }

    #[test]
    fn rejects_bad_slugs() {
        assert!(check_slug("").is_err());
        assert!(check_slug("Casa").is_err());
        assert!(check_slug("-casa").is_err());
        assert!(check_slug("casa-").is_err());
        assert!(check_slug("casa--lumen").is_err());
        assert!(check_slug("casa lumen").is_err());
        assert!(check_slug(&"a".repeat(65)).is_err());
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Sea View Room"), "sea-view-room");
        assert_eq!(slugify("  Garden -- Suite #2 "), "garden-suite-2");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize_hostname("Casa-Lumen.COM"), "casa-lumen.com");
        assert_eq!(normalize_hostname("casa.example:8080"), "casa.example");
        assert_eq!(
            normalize_hostname("https://www.casa.example/rooms?x=1"),
            "www.casa.example"
        );
        assert_eq!(normalize_hostname("casa.example."), "casa.example");
        assert_eq!(normalize_hostname(" HTTP://Casa.Example "), "casa.example");
    }

    #[test]
    fn normalize_tolerates_non_ascii() {
        assert_eq!(normalize_hostname("aéééé.example"), "aéééé.example");
        assert_eq!(normalize_hostname("ÉÉÉÉ"), "ÉÉÉÉ");
        assert!(check_hostname("aéééé.example").is_err());
    }

    #[test]
    fn hostname_rules() {
        assert!(check_hostname("casa.example").is_ok());
        assert!(check_hostname("a.b.c.example").is_ok());
        assert!(check_hostname("localhost").is_err());
        assert!(check_hostname("-bad.example").is_err());
        assert!(check_hostname("bad-.example").is_err());
        assert!(check_hostname("under_score.example").is_err());
        assert!(check_hostname("double..dot").is_err());
    }

    #[test]
    fn validate_hostname_returns_normalized_form() {
        assert_eq!(
            validate_hostname("WWW.Casa.Example:443").unwrap(),
            "www.casa.example"
        );
        assert!(validate_hostname("not a host").is_err());
    }

    #[test]
    fn email_rules() {
        assert_eq!(
            validate_email(" Ana@Casa.Example ").unwrap(),
            "ana@casa.example"
        );
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@casa.example").is_err());
        assert!(validate_email("ana@localhost").is_err());
    }

    #[test]
    fn currency_rules() {
        assert!(check_currency("EUR").is_ok());
        assert!(check_currency("eur").is_err());
        assert!(check_currency("EURO").is_err());
    }

    #[test]
    fn time_of_day_rules() {
        assert!(check_time_of_day("14:00").is_ok());
        assert!(check_time_of_day("23:59").is_ok());
        assert!(check_time_of_day("24:00").is_err());
        assert!(check_time_of_day("9:00").is_err());
        assert!(check_time_of_day("noon").is_err());
    }

    #[test]
    fn content_key_rules() {
        assert!(check_content_key("hero.title").is_ok());
        assert!(check_content_key("faq_items").is_ok());
        assert!(check_content_key("hero..title").is_err());
        assert!(check_content_key("Hero.Title").is_err());
        assert!(check_content_key("").is_err());
    }
}
