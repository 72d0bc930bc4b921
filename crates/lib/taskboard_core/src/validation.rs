//! Request field validation.
//!
//! Rules accumulate: a [`Validator`] collects every failing field so the
//! caller can report them together.

use serde::Serialize;
use uuid::Uuid;

/// Maximum email length.
pub const EMAIL_MAX_LEN: usize = 254;
/// Minimum password length (after trimming).
pub const PASSWORD_MIN_LEN: usize = 8;
/// Maximum nickname length.
pub const NICKNAME_MAX_LEN: usize = 40;
/// Maximum project or task name length.
pub const NAME_MAX_LEN: usize = 100;
/// Maximum task description length.
pub const DESCRIPTION_MAX_LEN: usize = 300;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `msg` against `field` unless `ok`.
    pub fn check(&mut self, field: &str, ok: bool, msg: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(FieldError {
                field: field.to_string(),
                msg: msg.into(),
            });
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self.check(field, false, "email must be specified");
        }
        self.check(field, is_email(value), "email must be valid")
            .check(
                field,
                value.chars().count() <= EMAIL_MAX_LEN,
                format!("email mustn't exceed {EMAIL_MAX_LEN} characters"),
            )
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(
            field,
            value.trim().chars().count() >= PASSWORD_MIN_LEN,
            format!("password must be at least {PASSWORD_MIN_LEN} characters"),
        )
    }

    pub fn nickname(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self.check(field, false, "nickname must be specified");
        }
        self.check(
            field,
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')),
            "nickname must consist of \"-\", \"_\" and alphanumeric english characters",
        )
        .check(
            field,
            value.chars().count() <= NICKNAME_MAX_LEN,
            format!("nickname mustn't exceed {NICKNAME_MAX_LEN} characters"),
        )
    }

    /// Check `min <= len(value) <= max`, in characters.
    pub fn length(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        min: usize,
        max: usize,
    ) -> &mut Self {
        let len = value.chars().count();
        if len < min {
            return self.check(field, false, format!("{label} must be specified"));
        }
        self.check(
            field,
            len <= max,
            format!("{label} mustn't exceed {max} characters"),
        )
    }

    /// Parse every id as a UUID, recording a failure for the first bad one.
    pub fn ids(&mut self, field: &str, values: &[String]) -> Vec<Uuid> {
        let mut parsed = Vec::with_capacity(values.len());
        for value in values {
            match Uuid::parse_str(value.trim()) {
                Ok(id) => parsed.push(id),
                Err(_) => {
                    self.check(field, false, format!("'{value}' is not a valid user id"));
                    break;
                }
            }
        }
        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Minimal `local@domain.tld` shape check.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
        && labels.last().is_some_and(|tld| tld.chars().count() >= 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(v: Validator) -> Vec<String> {
        v.finish()
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn accepts_valid_signup_fields() {
        let mut v = Validator::new();
        v.email("email", "test@test.com")
            .password("password", "password")
            .nickname("nickname", "J1_ -y j");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn rejects_invalid_email() {
        for bad in ["", "invalid.mail", "a@b", "a@@b.com", "@test.com", "a b@test.com"] {
            let mut v = Validator::new();
            v.email("email", bad);
            assert_eq!(fields(v), vec!["email"], "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_short_password_after_trim() {
        let mut v = Validator::new();
        v.password("password", "  short  ");
        assert_eq!(fields(v), vec!["password"]);
    }

    #[test]
    fn rejects_nickname_with_symbols_or_too_long() {
        let mut v = Validator::new();
        v.nickname("nickname", "%$%*&<>");
        assert_eq!(fields(v), vec!["nickname"]);

        let mut v = Validator::new();
        v.nickname("nickname", &"a".repeat(NICKNAME_MAX_LEN + 1));
        assert_eq!(fields(v), vec!["nickname"]);
    }

    #[test]
    fn accumulates_multiple_fields() {
        let mut v = Validator::new();
        v.email("email", "nope")
            .password("password", "123")
            .check("confirmPassword", false, "Passwords must be the same");
        assert_eq!(fields(v), vec!["email", "password", "confirmPassword"]);
    }

    #[test]
    fn length_checks_bounds() {
        let mut v = Validator::new();
        v.length("name", "project name", "", 1, NAME_MAX_LEN);
        assert_eq!(fields(v), vec!["name"]);

        let mut v = Validator::new();
        v.length("name", "project name", &"x".repeat(NAME_MAX_LEN), 1, NAME_MAX_LEN);
        assert!(v.is_empty());
    }

    #[test]
    fn ids_reports_first_bad_value() {
        let good = Uuid::now_v7().to_string();
        let mut v = Validator::new();
        let parsed = v.ids("participants", &[good.clone(), "invalidId".into()]);
        assert_eq!(parsed.len(), 1);
        assert_eq!(fields(v), vec!["participants"]);
    }
}
