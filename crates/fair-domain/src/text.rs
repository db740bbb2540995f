//! Tokenization helpers shared by retrieval, enhancement and scoring

use std::collections::BTreeSet;

/// Common English words ignored when matching terms
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have",
    "how", "i", "if", "in", "into", "is", "it", "its", "may", "me", "more", "most", "my",
    "no", "not", "of", "on", "or", "other", "our", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to",
    "was", "we", "were", "what", "when", "which", "while", "who", "why", "will", "with",
    "would", "you", "your",
];

/// Minimum length of a matching term
pub const MIN_TERM_LEN: usize = 3;

/// Lowercase alphanumeric tokens in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// True for words too common to carry meaning
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// True for tokens long enough and meaningful enough to match on
pub fn is_term(token: &str) -> bool {
    token.chars().count() >= MIN_TERM_LEN && !is_stop_word(token)
}

/// Crude plural folding so "bonds" and "bond" compare equal
pub fn fold_plural(token: &str) -> String {
    if token.len() > 4 && token.ends_with("ies") {
        format!("{}y", &token[..token.len() - 3])
    } else if token.len() > 4
        && token.ends_with('s')
        && !["ss", "is", "us"].iter().any(|suffix| token.ends_with(suffix))
    {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Meaningful terms in order of appearance, plural-folded, repeats kept
pub fn term_sequence(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| is_term(t))
        .map(|t| fold_plural(&t))
        .collect()
}

/// Distinct meaningful terms of `text`
pub fn terms(text: &str) -> BTreeSet<String> {
    term_sequence(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Metformin, first-line (T2D)!"),
            vec!["metformin", "first", "line", "t2d"]
        );
    }

    #[test]
    fn test_terms_drop_stop_words_and_short_tokens() {
        let terms = terms("What is the risk of a 401k loan?");
        assert!(terms.contains("risk"));
        assert!(terms.contains("401k"));
        assert!(terms.contains("loan"));
        assert!(!terms.contains("what"));
        assert!(!terms.contains("of"));
    }

    #[test]
    fn test_plural_folding() {
        assert_eq!(fold_plural("bonds"), "bond");
        assert_eq!(fold_plural("therapies"), "therapy");
        assert_eq!(fold_plural("stress"), "stress");
        assert_eq!(fold_plural("gas"), "gas");
        assert_eq!(fold_plural("diagnosis"), "diagnosis");
        assert_eq!(fold_plural("crisis"), "crisis");
        assert!(terms("Bonds and bond funds").contains("fund"));
    }
}
