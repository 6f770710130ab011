use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matches::import::parse::DELIMITER;

pub fn is_ascii_no_spaces(username: &str) -> Result<(), String> {
    match username.chars().all(|c| c.is_ascii() && !c.is_whitespace()) {
        true => Ok(()),
        false => Err("should be an ascii string without spaces".to_string()),
    }
}

pub fn is_valid_email(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
        r#"(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#
    ).unwrap()
    });
    match RE.is_match(string) {
        true => Ok(()),
        false => Err("invalid email".to_string()),
    }
}

/// Checks that `value` (after trimming) has a number of characters within
/// `range`.
pub fn has_length(
    label: &str,
    value: &str,
    range: RangeInclusive<usize>,
) -> Result<(), String> {
    let n = value.trim().chars().count();
    if range.contains(&n) {
        Ok(())
    } else if n == 0 {
        Err(format!("{label} is required."))
    } else {
        Err(format!(
            "{label} must be between {} and {} characters.",
            range.start(),
            range.end()
        ))
    }
}

/// Values that end up in the fixture export may not contain the field
/// delimiter, since the importer splits lines on it without quoting.
pub fn has_no_delimiter(label: &str, value: &str) -> Result<(), String> {
    match value.contains(DELIMITER) {
        true => Err(format!("{label} may not contain \"{DELIMITER}\".")),
        false => Ok(()),
    }
}

/// An empty field means "no score".
pub fn parse_score(label: &str, value: &str) -> Result<Option<i64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(format!("{label} must be a whole number of at least 0.")),
    }
}

#[cfg(test)]
#[test]
fn test_email() {
    assert!(is_valid_email("hello@example.com").is_ok())
}

#[cfg(test)]
#[test]
fn test_length() {
    assert!(has_length("Name", "BCUS A", 1..=128).is_ok());
    assert_eq!(
        has_length("Name", "   ", 1..=128),
        Err("Name is required.".to_string())
    );
    assert!(has_length("Name", &"x".repeat(129), 1..=128).is_err());
}

#[cfg(test)]
#[test]
fn test_scores() {
    assert_eq!(parse_score("Home score", ""), Ok(None));
    assert_eq!(parse_score("Home score", " 42 "), Ok(Some(42)));
    assert!(parse_score("Home score", "-1").is_err());
    assert!(parse_score("Home score", "ten").is_err());
}

#[cfg(test)]
#[test]
fn test_delimiter() {
    assert!(has_no_delimiter("Team name", "BCUS A").is_ok());
    assert_eq!(
        has_no_delimiter("Team name", "Lions, Seniors"),
        Err("Team name may not contain \",\".".to_string())
    );
}
