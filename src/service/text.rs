//! Tweet text helpers
//!
//! Hashtag and mention extraction, content validation and the short
//! previews stored on notifications.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::AppError;

/// Maximum tweet/comment length in characters
pub const MAX_CONTENT_CHARS: usize = 280;

/// Notification previews keep this many characters
pub const PREVIEW_CHARS: usize = 50;

/// `#tag` at a word boundary; `issue#42` is not a hashtag
static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])#([A-Za-z0-9_]+)").expect("Invalid hashtag regex")
});

/// `@username` at a word boundary; `bob@example.com` is not a mention
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])@([A-Za-z0-9_]+)").expect("Invalid mention regex")
});

fn captures(regex: &Regex, text: &str) -> impl Iterator<Item = String> {
    regex
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
}

/// Extract hashtags: lowercased, without `#`, first occurrence order, no duplicates
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    captures(&HASHTAG_REGEX, text)
        .map(|tag| tag.to_lowercase())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Extract mentioned usernames without `@`, deduplicated case-insensitively
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    captures(&MENTION_REGEX, text)
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

/// Normalize a tag from a URL path (`#Rust` or `rust`) to its stored form
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

/// Short preview: the first 50 characters, with `...` when truncated
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Trim and validate tweet or comment content
pub fn validate_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Content cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Content cannot exceed {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hashtags_lowercases_and_dedupes() {
        let tags = extract_hashtags("Loving #Rust and #rust_lang, #RUST again! #");
        assert_eq!(tags, vec!["rust", "rust_lang"]);
    }

    #[test]
    fn test_hashtag_inside_word_is_ignored() {
        assert!(extract_hashtags("issue#42").is_empty());
        assert_eq!(extract_hashtags("(#tag)"), vec!["tag"]);
    }

    #[test]
    fn test_extract_mentions() {
        let mentions = extract_mentions("hi @alice and @Bob, cc @alice @ALICE");
        assert_eq!(mentions, vec!["alice", "Bob"]);
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(extract_hashtags("#a,#b #c#d"), vec!["a", "b", "c"]);
        assert_eq!(extract_mentions("@alice @bob"), vec!["alice", "bob"]);
    }

    #[test]
    fn test_email_is_not_a_mention() {
        assert!(extract_mentions("mail me at bob@example.com").is_empty());
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");

        let exact = "a".repeat(50);
        assert_eq!(preview(&exact), exact);

        let long = "b".repeat(51);
        assert_eq!(preview(&long), format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "é".repeat(60);
        assert_eq!(preview(&text), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  hello  ").unwrap(), "hello");
        assert!(validate_content("   ").is_err());
        assert!(validate_content(&"x".repeat(281)).is_err());
        assert!(validate_content(&"x".repeat(280)).is_ok());
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("#Rust"), "rust");
        assert_eq!(normalize_tag("golang"), "golang");
    }
}
