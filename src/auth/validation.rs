use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date, OffsetDateTime};

use super::dto::RegisterForm;
use crate::error::AppError;
use crate::users::ProfileDetails;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

const GENDERS: [&str; 4] = ["male", "female", "other", "prefer_not_to_say"];

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are stored and looked up trimmed and lower-cased.
pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// A registration that passed every field check. No `Debug`: it holds the
/// plaintext password.
#[derive(Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: ProfileDetails,
}

/// Check every field and report all problems at once.
pub fn validate_registration(form: &RegisterForm) -> Result<ValidRegistration, AppError> {
    let mut errors = Vec::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.push(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters long"
        ));
    } else if !is_valid_username(username) {
        errors.push("Username can only contain letters, numbers and underscores".to_string());
    }

    let email = normalize_email(&form.email);
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(&email) {
        errors.push("Please enter a valid email address".to_string());
    }

    if form.password.is_empty() {
        errors.push("Password is required".to_string());
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }

    let profile = validate_profile(form, &mut errors);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(ValidRegistration {
        username: username.to_string(),
        email,
        password: form.password.clone(),
        profile,
    })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn bounded(value: &str, label: &str, max: usize, errors: &mut Vec<String>) -> Option<String> {
    let value = optional(value)?;
    if value.chars().count() > max {
        errors.push(format!("{label} must be at most {max} characters"));
        return None;
    }
    Some(value)
}

fn http_url(value: &str, label: &str, errors: &mut Vec<String>) -> Option<String> {
    let value = bounded(value, label, 255, errors)?;
    let lower = value.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Some(value),
        _ => {
            errors.push(format!("{label} must be a valid http(s) URL"));
            None
        }
    }
}

fn birth_date(value: &str, errors: &mut Vec<String>) -> Option<Date> {
    let value = optional(value)?;
    match Date::parse(&value, format_description!("[year]-[month]-[day]")) {
        Ok(date) if date <= OffsetDateTime::now_utc().date() => Some(date),
        Ok(_) => {
            errors.push("Date of birth cannot be in the future".to_string());
            None
        }
        Err(_) => {
            errors.push("Date of birth must be a valid date (YYYY-MM-DD)".to_string());
            None
        }
    }
}

fn validate_profile(form: &RegisterForm, errors: &mut Vec<String>) -> ProfileDetails {
    let gender = optional(&form.gender);
    if let Some(g) = &gender {
        if !GENDERS.contains(&g.as_str()) {
            errors.push("Please select a valid gender option".to_string());
        }
    }

    ProfileDetails {
        first_name: bounded(&form.first_name, "First name", 50, errors),
        last_name: bounded(&form.last_name, "Last name", 50, errors),
        bio: bounded(&form.bio, "Bio", 1000, errors),
        location: bounded(&form.location, "Location", 100, errors),
        website: http_url(&form.website, "Website", errors),
        portfolio_url: http_url(&form.portfolio_url, "Portfolio URL", errors),
        social_links: bounded(&form.social_links, "Social links", 1000, errors),
        date_of_birth: birth_date(&form.date_of_birth, errors),
        gender,
        art_styles: bounded(&form.art_styles, "Art styles", 255, errors),
        is_profile_private: matches!(
            form.is_profile_private.trim().to_ascii_lowercase().as_str(),
            "1" | "on" | "true"
        ),
    }
}
