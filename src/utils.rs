use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w\.\+-]+@[a-zA-Z0-9\.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static SUBREDDIT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("subreddit name pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_subreddit_name(name: &str) -> bool {
    SUBREDDIT_NAME_REGEX.is_match(name)
}

/// Password policy shared by registration, change-password and reset.
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Checks `value` (already trimmed) has between `min` and `max` characters.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(format!(
            "{field} must be between {min} and {max} characters"
        ));
    }
    Ok(())
}
