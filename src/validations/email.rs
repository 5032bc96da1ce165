use email_address::EmailAddress;
use rayon::prelude::*;
use validator::ValidationError;

use crate::utils::{locale_utils::Messages, validation_utils::add_error};

const MIN_EMAIL_LENGTH: usize = 5;
const MAX_EMAIL_LENGTH: usize = 254;

fn has_valid_length(email: &str, messages: &Messages) -> Result<(), String> {
    let length = email.len();
    if length < MIN_EMAIL_LENGTH || length > MAX_EMAIL_LENGTH {
        return Err(messages.get_validation_message(
            "email.invalid_length",
            &format!(
                "Email must be between {} and {} characters",
                MIN_EMAIL_LENGTH, MAX_EMAIL_LENGTH
            ),
        ));
    }
    Ok(())
}

fn has_no_whitespace(email: &str, messages: &Messages) -> Result<(), String> {
    if email.chars().any(|c| c.is_whitespace()) {
        return Err(messages.get_validation_message(
            "email.contains_whitespace",
            "Email must not contain whitespace",
        ));
    }
    Ok(())
}

fn has_single_at(email: &str, messages: &Messages) -> Result<(), String> {
    if email.chars().filter(|c| *c == '@').count() != 1 {
        return Err(messages.get_validation_message(
            "email.missing_at",
            "Email must contain exactly one '@'",
        ));
    }
    Ok(())
}

fn has_dotted_domain(email: &str, messages: &Messages) -> Result<(), String> {
    let domain_ok = email
        .split('@')
        .nth(1)
        .map(|domain| domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !domain_ok {
        return Err(messages.get_validation_message(
            "email.invalid_domain",
            "The domain part of the email is invalid",
        ));
    }
    Ok(())
}

fn is_overall_format_valid(email: &str, messages: &Messages) -> Result<(), String> {
    if !EmailAddress::is_valid(email) {
        Err(messages.get_validation_message("email.invalid", "Invalid email format"))
    } else {
        Ok(())
    }
}

pub fn validate_email(email: &str, messages: &Messages) -> Result<(), ValidationError> {
    let validations = [
        has_valid_length,
        has_no_whitespace,
        has_single_at,
        has_dotted_domain,
    ];

    let mut errors: Vec<String> = validations
        .par_iter()
        .filter_map(|validate| validate(email, messages).err())
        .collect();

    if errors.is_empty() {
        if let Err(msg) = is_overall_format_valid(email, messages) {
            errors.push(msg);
        }
    }

    if !errors.is_empty() {
        let concatenated_errors = errors.join(", ");
        return Err(add_error("email.invalid", concatenated_errors, email));
    }

    Ok(())
}
