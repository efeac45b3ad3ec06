use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug fields (category slugs)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "short-stories", "poetry", "kids-corner-2"
    /// - Invalid: "-poetry", "poetry-", "short--stories", "Poetry", "short_stories"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for supported content languages
    pub static ref LANGUAGE_REGEX: Regex = Regex::new(r"^(en|ta)$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("short-stories"));
        assert!(SLUG_REGEX.is_match("poetry"));
        assert!(SLUG_REGEX.is_match("kids-corner-2"));
        assert!(SLUG_REGEX.is_match("a"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-poetry")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("poetry-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("short--stories")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Poetry")); // uppercase
        assert!(!SLUG_REGEX.is_match("short_stories")); // underscore
        assert!(!SLUG_REGEX.is_match(""));
    }

    #[test]
    fn test_language_regex() {
        assert!(LANGUAGE_REGEX.is_match("en"));
        assert!(LANGUAGE_REGEX.is_match("ta"));
        assert!(!LANGUAGE_REGEX.is_match("fr"));
        assert!(!LANGUAGE_REGEX.is_match("english"));
    }
}
