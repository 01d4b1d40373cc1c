//! Field-level validation rules for user-entered input.
//!
//! Every check reports the first rule that fails as a [`ValidationError`]
//! naming the offending field, so the view layer can show the message next
//! to the right input.
//!
//! Lengths are measured in UTF-16 code units, the unit the web form limits
//! were written against, so a character outside the Basic Multilingual
//! Plane counts twice.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum task title length in UTF-16 code units.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum task description length in UTF-16 code units.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum email length in UTF-16 code units, after normalization.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length accepted at signup.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Symbols that satisfy the "special character" password rule.
pub const PASSWORD_SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is a valid literal")
});

/// Length of `text` in UTF-16 code units.
fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A single input field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field, as the view layer knows it.
    pub field: &'static str,
    /// Human-readable message suitable for display.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Checks a task title: required, at most [`MAX_TITLE_LENGTH`] characters.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `title` field.
pub fn task_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::new("title", "Task title is required"));
    }
    if text_length(title) > MAX_TITLE_LENGTH {
        return Err(ValidationError::new(
            "title",
            format!("Task title must not exceed {MAX_TITLE_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Checks a task description: at most [`MAX_DESCRIPTION_LENGTH`] characters.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `description` field.
pub fn task_description(description: &str) -> Result<(), ValidationError> {
    if text_length(description) > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::new(
            "description",
            format!("Task description must not exceed {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Checks that a due date is an RFC 3339 date-time. Nothing beyond the
/// format is enforced; past dates are fine.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `dueDate` field.
pub fn due_date(value: &str) -> Result<(), ValidationError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("dueDate", "Invalid due date"))
}

/// Normalizes an email address (trim, lowercase) and validates it.
///
/// Returns the normalized form, which is the only form stored or compared.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `email` field.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::new("email", "Email is required"));
    }
    if normalized.starts_with('.')
        || normalized.contains("..")
        || !EMAIL_PATTERN.is_match(&normalized)
    {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address",
        ));
    }
    if text_length(&normalized) > MAX_EMAIL_LENGTH {
        return Err(ValidationError::new(
            "email",
            format!("Email must not exceed {MAX_EMAIL_LENGTH} characters"),
        ));
    }
    Ok(normalized)
}

/// Checks a login password: only presence is required.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `password` field.
pub fn login_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "Password is required"));
    }
    Ok(())
}

/// Checks password strength for a new account.
///
/// Rules are checked in order (length, uppercase, lowercase, digit,
/// special character) and the first failure is reported.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `password` field.
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    let len = text_length(password);
    if len < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN_LENGTH} characters"),
        ));
    }
    if len > PASSWORD_MAX_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("Password must not exceed {PASSWORD_MAX_LENGTH} characters"),
        ));
    }

    let rules: [(fn(char) -> bool, &str); 4] = [
        (
            |c| c.is_ascii_uppercase(),
            "Password must contain at least one uppercase letter",
        ),
        (
            |c| c.is_ascii_lowercase(),
            "Password must contain at least one lowercase letter",
        ),
        (
            |c| c.is_ascii_digit(),
            "Password must contain at least one number",
        ),
        (
            |c| PASSWORD_SPECIAL_CHARACTERS.contains(c),
            "Password must contain at least one special character",
        ),
    ];
    for (matches, message) in rules {
        if !password.chars().any(matches) {
            return Err(ValidationError::new("password", message));
        }
    }
    Ok(())
}

/// Checks that the confirmation field repeats the password.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `confirmPassword` field.
pub fn password_confirmation(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if confirm.is_empty() {
        return Err(ValidationError::new(
            "confirmPassword",
            "Please confirm your password",
        ));
    }
    if password != confirm {
        return Err(ValidationError::new(
            "confirmPassword",
            "Passwords do not match",
        ));
    }
    Ok(())
}
