//! URL slugs for blog posts.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("Invalid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));
static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("Invalid regex"));

/// Derive a URL slug from a title.
///
/// Lowercases and trims the title, drops anything that is not an ASCII
/// letter, digit, underscore, whitespace or dash, turns whitespace runs into
/// single dashes and collapses repeated dashes.
///
/// ```
/// use hridved_core::slugify;
///
/// assert_eq!(slugify("  Ashwagandha: 5 Benefits!  "), "ashwagandha-5-benefits");
/// assert_eq!(slugify("Tips & Tricks for Winter"), "tips-tricks-for-winter");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept = DISALLOWED_RE.replace_all(lowered.trim(), "");
    let dashed = WHITESPACE_RE.replace_all(&kept, "-");
    DASHES_RE.replace_all(&dashed, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Triphala for Digestion"), "triphala-for-digestion");
    }

    #[test]
    fn test_slugify_collapses_dashes() {
        assert_eq!(slugify("Neem -- the  Healer"), "neem-the-healer");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn test_slugify_strips_punctuation_and_non_ascii() {
        assert_eq!(slugify("Kapha, Pitta & Vata?"), "kapha-pitta-vata");
        assert_eq!(slugify("Café Rituals"), "caf-rituals");
        assert_eq!(slugify("snake_case_title"), "snake_case_title");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }
}
