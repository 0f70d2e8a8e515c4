//! Field predicates and an accumulator for validation failures.
//!
//! Validation never touches the form values themselves; it only records
//! messages keyed by field name, plus form-level messages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Email pattern recommended by the W3C for `<input type="email">`.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex should compile")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validator {
    field_errors: BTreeMap<String, Vec<String>>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// True when no field or form-level error has been recorded.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Record `message` against `field` only when `ok` is false.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    /// First message recorded for `field`, which is the one pages display.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors(field).first().map(String::as_str)
    }

    pub(crate) fn field_errors(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// At most `n` characters (Unicode scalar values, not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn allowed_value<T: PartialEq>(value: &T, allowed: &[T]) -> bool {
    allowed.contains(value)
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(not_blank("x"));
        assert!(!not_blank("  \t\n"));

        assert!(max_chars("héllo", 5));
        assert!(!max_chars("héllo!", 5));
        assert!(min_chars("日本語の", 4));
        assert!(!min_chars("日本", 3));

        assert!(allowed_value(&7, &[1, 7, 365]));
        assert!(!allowed_value(&30, &[1, 7, 365]));
    }

    #[test]
    fn email_pattern() {
        assert!(matches("alice@example.com", &EMAIL_RX));
        assert!(matches("a.b+tag@sub.example.co.uk", &EMAIL_RX));
        assert!(!matches("alice@", &EMAIL_RX));
        assert!(!matches("not an email", &EMAIL_RX));
        assert!(!matches("alice@-example.com", &EMAIL_RX));
    }

    #[test]
    fn check_field_accumulates_only_failures() {
        let mut v = Validator::default();
        v.check_field(true, "title", "unused");
        assert!(v.valid());

        v.check_field(false, "title", "This field cannot be blank");
        v.check_field(false, "title", "This field cannot be more than 100 characters long");

        assert!(!v.valid());
        assert_eq!(v.field_error("title"), Some("This field cannot be blank"));
        assert_eq!(v.field_errors("title").len(), 2);
        assert_eq!(v.field_error("content"), None);
        assert!(v.field_errors("content").is_empty());
    }

    #[test]
    fn non_field_errors_invalidate() {
        let mut v = Validator::default();
        v.add_non_field_error("Email or password is incorrect");

        assert!(!v.valid());
        assert_eq!(v.non_field_errors(), ["Email or password is incorrect".to_string()]);
    }
}
