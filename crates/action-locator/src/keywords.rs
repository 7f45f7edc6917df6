//! Keyword extraction from a broken locator value

use once_cell::sync::Lazy;
use regex::Regex;

static NAMESPACE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.]+:id/").expect("namespace regex is valid"));
static STRUCTURAL_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"//[\w.]+\[@[\w-]+=['"]?"#).expect("structural regex is valid"));
static QUOTES_AND_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"\]]"#).expect("quote regex is valid"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_\-./\s]+").expect("separator regex is valid"));

const STOP_WORDS: &[&str] = &[
    "id", "btn", "button", "tv", "text", "et", "img", "image", "iv", "ll", "rl", "fl", "view",
    "layout",
];

const MIN_KEYWORD_LEN: usize = 3;

/// Lower-cased semantic keywords of a locator value
///
/// - `com.example.app:id/btn_login` → `["login"]`
/// - `//XCUIElementTypeButton[@name='Submit']` → `["submit"]`
/// - `btn_ok` → `["btn_ok"]` (nothing survives filtering, whole value is kept)
pub fn extract_keywords(value: &str) -> Vec<String> {
    let clean = NAMESPACE_PREFIX.replace_all(value, "");
    let clean = STRUCTURAL_QUERY.replace_all(&clean, "");
    let clean = QUOTES_AND_BRACKETS.replace_all(&clean, "");
    let clean = clean.trim();

    let mut keywords: Vec<String> = Vec::new();
    for part in SEPARATORS.split(clean) {
        let part = part.to_lowercase();
        if part.chars().count() < MIN_KEYWORD_LEN || STOP_WORDS.contains(&part.as_str()) {
            continue;
        }
        if !keywords.contains(&part) {
            keywords.push(part);
        }
    }

    if keywords.is_empty() && !clean.is_empty() {
        keywords.push(clean.to_lowercase());
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id() {
        assert_eq!(extract_keywords("com.example.app:id/btn_login"), vec!["login"]);
        assert_eq!(extract_keywords("com.app:id/tv_user_name"), vec!["user", "name"]);
    }

    #[test]
    fn test_structural_query() {
        assert_eq!(
            extract_keywords("//XCUIElementTypeButton[@name='Submit']"),
            vec!["submit"]
        );
        assert_eq!(
            extract_keywords(r#"//android.widget.TextView[@text="Forgot password"]"#),
            vec!["forgot", "password"]
        );
    }

    #[test]
    fn test_plain_value() {
        assert_eq!(extract_keywords("Login"), vec!["login"]);
        assert_eq!(extract_keywords("login-button-view"), vec!["login"]);
    }

    #[test]
    fn test_falls_back_to_whole_value() {
        assert_eq!(extract_keywords("btn_ok"), vec!["btn_ok"]);
        assert_eq!(extract_keywords("OK"), vec!["ok"]);
    }

    #[test]
    fn test_empty_value() {
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn test_duplicates_are_dropped() {
        assert_eq!(extract_keywords("login_login"), vec!["login"]);
    }
}
