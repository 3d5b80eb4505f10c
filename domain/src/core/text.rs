//! Text helpers for claim matching, search and previews.

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "are", "was", "were", "from", "into", "not",
    "but", "has", "have", "its", "our", "you", "your", "all", "any", "can", "will", "should",
    "would", "there", "their", "what", "which", "how", "why", "when", "does", "about",
];

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, replace punctuation with spaces and collapse whitespace.
///
/// Two claims that differ only in case, punctuation or spacing normalize to
/// the same string.
///
/// # Example
///
/// ```
/// use roundtable_domain::core::text::normalize_claim;
///
/// assert_eq!(normalize_claim("  Revenue FELL, sharply! "), "revenue fell sharply");
/// ```
pub fn normalize_claim(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();
    collapse_whitespace(&mapped)
}

/// Content tokens of a text: normalized words of three or more characters,
/// minus common stopwords.
pub fn tokenize(s: &str) -> BTreeSet<String> {
    normalize_claim(s)
        .split(' ')
        .filter(|t| t.chars().count() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two token sets. Two empty sets are identical.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis when shortened.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" a \n\t b  c "), "a b c");
    }

    #[test]
    fn test_normalize_claim_unicode() {
        assert_eq!(normalize_claim("Ümsatz STIEG."), "ümsatz stieg");
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_short_words() {
        let tokens = tokenize("The cache is not thread-safe for writers");
        assert!(tokens.contains("cache"));
        assert!(tokens.contains("thread"));
        assert!(tokens.contains("writers"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("is"));
    }

    #[test]
    fn test_jaccard() {
        let a = tokenize("cache eviction policy");
        let b = tokenize("cache eviction bug");
        let sim = jaccard(&a, &b);
        assert!((sim - 0.5).abs() < 1e-9);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 1.0);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 8), "hello...");
        assert_eq!(truncate_chars("日本語テスト文字列", 6), "日本語...");
    }
}
