use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::utils::{locale_utils::Messages, validation_utils::add_error};

const MAX_SLUG_LENGTH: usize = 63;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex is valid"));

pub fn validate_slug(slug: &str, messages: &Messages) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    if slug.len() > MAX_SLUG_LENGTH {
        errors.push(messages.get_validation_message(
            "slug.too_long",
            &format!("Slug must be at most {} characters", MAX_SLUG_LENGTH),
        ));
    }

    if !SLUG_RE.is_match(slug) {
        errors.push(messages.get_validation_message(
            "slug.invalid_format",
            "Slug must be lowercase alphanumerics separated by single hyphens",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(add_error("slug.invalid", errors.join(", "), slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::locale_utils::{Lang, Messages};

    #[test]
    fn accepts_canonical_slugs() {
        let messages = Messages::new(Lang::En);
        assert!(validate_slug("design-team", &messages).is_ok());
        assert!(validate_slug("q3", &messages).is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        let messages = Messages::new(Lang::En);
        assert!(validate_slug("", &messages).is_err());
        assert!(validate_slug("Design-Team", &messages).is_err());
        assert!(validate_slug("a--b", &messages).is_err());
        assert!(validate_slug("-leading", &messages).is_err());
    }
}
