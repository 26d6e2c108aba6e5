//! Field-level form validation.
//!
//! A form owns a [`Validator`] and records one message per failed check. The
//! web layer re-renders the form with those messages instead of treating them
//! as errors.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::goal::parse_date;

static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
  )
  .expect("Invalid regex pattern")
});

// ─── Validator ───────────────────────────────────────────────────────────────

/// Accumulated `field -> messages` for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
  field_errors: BTreeMap<String, Vec<String>>,
}

impl Validator {
  /// Record `message` against `field` unless `ok` holds.
  pub fn check(&mut self, ok: bool, field: &str, message: &str) {
    if !ok {
      self.add_error(field, message);
    }
  }

  pub fn add_error(&mut self, field: &str, message: &str) {
    self
      .field_errors
      .entry(field.to_owned())
      .or_default()
      .push(message.to_owned());
  }

  pub fn valid(&self) -> bool { self.field_errors.is_empty() }

  /// Messages recorded for `field`, in the order they were added.
  pub fn errors(&self, field: &str) -> &[String] {
    self
      .field_errors
      .get(field)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

pub fn not_blank(value: &str) -> bool { !value.trim().is_empty() }

pub fn min_chars(value: &str, n: usize) -> bool { value.chars().count() >= n }

pub fn max_chars(value: &str, n: usize) -> bool { value.chars().count() <= n }

pub fn is_email(value: &str) -> bool { EMAIL_RX.is_match(value) }

/// Whether `value` is a real `YYYY-MM-DD` calendar date.
pub fn is_date(value: &str) -> bool { parse_date(value).is_ok() }

/// Whether a sanitised checkbox value is one of the accepted spellings.
pub fn is_flag(value: &str) -> bool {
  matches!(value, "" | "on" | "true" | "false")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collects_messages_per_field() {
    let mut v = Validator::default();
    assert!(v.valid());

    v.check(true, "email", "never recorded");
    v.check(false, "email", "first");
    v.check(false, "email", "second");
    v.check(false, "password", "third");

    assert!(!v.valid());
    assert_eq!(v.errors("email"), ["first", "second"]);
    assert_eq!(v.errors("password"), ["third"]);
    assert!(v.errors("missing").is_empty());
  }

  #[test]
  fn email_shape() {
    assert!(is_email("user@example.com"));
    assert!(is_email("first.last+tag@sub.example.org"));
    assert!(!is_email("user@"));
    assert!(!is_email("@example.com"));
    assert!(!is_email("user example@example.com"));
    assert!(!is_email(""));
  }

  #[test]
  fn char_limits_count_characters_not_bytes() {
    assert!(max_chars("ääää", 4));
    assert!(!max_chars("ääääa", 4));
    assert!(min_chars("12345678", 8));
    assert!(!min_chars("1234567", 8));
  }

  #[test]
  fn blank_means_whitespace_only() {
    assert!(!not_blank(""));
    assert!(!not_blank("  \t"));
    assert!(not_blank(" x "));
  }

  #[test]
  fn flags_and_dates() {
    for ok in ["", "on", "true", "false"] {
      assert!(is_flag(ok), "{ok:?}");
    }
    assert!(!is_flag("yes"));
    assert!(!is_flag("1"));

    assert!(is_date("2025-06-01"));
    assert!(!is_date("not-a-date"));
  }
}
