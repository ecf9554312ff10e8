//! Validators for the auth and password-recovery flows.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::RecoveryMethod;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex"));
static SIX_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("code regex"));

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Outcome of a form validation: field name → message.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Validation {
    pub errors: BTreeMap<&'static str, String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// All messages joined, for error reporting.
    pub fn summary(&self) -> String {
        self.errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    !trimmed.is_empty() && EMAIL_RE.is_match(trimmed)
}

/// Brazilian phone: 10 or 11 digits once formatting and a leading `55` are stripped.
pub fn is_valid_br_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let normalized = if digits.starts_with("55") && digits.len() > 11 {
        &digits[2..]
    } else {
        digits.as_str()
    };
    matches!(normalized.len(), 10 | 11)
}

pub fn is_valid_six_digit_code(code: &str) -> bool {
    SIX_DIGITS_RE.is_match(code.trim())
}

pub fn validate_forgot_password_selection(
    method: Option<RecoveryMethod>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Validation {
    let mut v = Validation::default();
    match method {
        None => v.add("method", "Escolha como deseja recuperar o acesso"),
        Some(RecoveryMethod::Email) => {
            if !email.is_some_and(is_valid_email) {
                v.add("email", "Informe um e-mail válido");
            }
        }
        Some(RecoveryMethod::Sms) => {
            if !phone.is_some_and(is_valid_br_phone) {
                v.add("phone", "Informe um número de telefone válido");
            }
        }
    }
    v
}

pub fn validate_forgot_password_code(code: &str) -> Validation {
    let mut v = Validation::default();
    if !is_valid_six_digit_code(code) {
        v.add("code", "Código deve conter 6 dígitos");
    }
    v
}

pub fn validate_new_password(password: &str, confirm_password: &str, min_length: usize) -> Validation {
    let mut v = Validation::default();
    if password.chars().count() < min_length {
        v.add(
            "password",
            format!("A senha deve ter pelo menos {min_length} caracteres"),
        );
    }
    if password != confirm_password {
        v.add("confirmPassword", "As senhas não coincidem");
    }
    v
}
