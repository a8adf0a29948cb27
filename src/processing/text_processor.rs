//! Text processing and normalization

use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Minimum number of characters a token needs to survive tokenization
pub const MIN_TOKEN_CHARS: usize = 2;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    email_regex: Regex,
    url_regex: Regex,
    whitespace_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let url_regex = Regex::new(r"(?i)(?:https?://|www\.)[^\s]+")
            .expect("Invalid URL regex");

        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            email_regex,
            url_regex,
            whitespace_regex,
        }
    }

    /// Clean and tokenize in one step
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.tokenize(&self.clean_text(text))
    }

    /// Strip links and addresses, fold typographic punctuation, collapse whitespace
    pub fn clean_text(&self, text: &str) -> String {
        let cleaned = self.url_regex.replace_all(text, " ");
        let cleaned = self.email_regex.replace_all(&cleaned, " ");
        let cleaned = Self::normalize_unicode(&cleaned);

        self.whitespace_regex.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Tokenize text into lowercase words using Unicode segmentation
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .filter(|word| !self.is_stop_word(word))
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Count occurrences of every token in `text`
    pub fn token_counts(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for token in self.normalize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Normalize a caller-supplied keyword into a single token if possible
    pub fn normalize_keyword(&self, keyword: &str) -> Option<String> {
        let tokens = self.normalize(keyword);
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(" "))
        }
    }

    fn normalize_unicode(text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2026}' => '.',
                '\u{00A0}' => ' ',
                _ => c,
            })
            .collect()
    }
}

/// English stop words (NLTK list)
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
    "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below",
    "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t",
    "can", "will", "just", "don", "don't", "should", "should've", "now", "d", "ll",
    "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't",
    "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't",
    "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
    "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn",
    "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize("Rust programming language is awesome!");

        assert_eq!(tokens, vec!["rust", "programming", "language", "awesome"]);
        assert!(!tokens.contains(&"is".to_string()));
    }

    #[test]
    fn test_case_and_punctuation_symmetry() {
        let processor = TextProcessor::new();
        let a = processor.normalize("Python, SQL; and AWS!!! (Required)");
        let b = processor.normalize("python sql and aws required");

        assert_eq!(a, b);
    }

    #[test]
    fn test_stop_words_only() {
        let processor = TextProcessor::new();
        assert!(processor.normalize("the and or a").is_empty());
        assert!(processor.normalize("   ").is_empty());
    }

    #[test]
    fn test_short_tokens_dropped() {
        let processor = TextProcessor::new();
        let tokens = processor.normalize("C R Go x");
        assert_eq!(tokens, vec!["go"]);
    }

    #[test]
    fn test_no_stemming() {
        let processor = TextProcessor::new();
        let tokens = processor.normalize("developer developers developing");
        assert_eq!(tokens, vec!["developer", "developers", "developing"]);
    }

    #[test]
    fn test_clean_text_strips_links_and_emails() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("Reach me at john.doe@email.com or https://example.com/cv   today");

        assert!(!cleaned.contains('@'));
        assert!(!cleaned.contains("example.com"));
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn test_smart_quotes_fold_into_stop_words() {
        let processor = TextProcessor::new();
        assert!(processor.normalize("don\u{2019}t").is_empty());
    }

    #[test]
    fn test_token_counts() {
        let processor = TextProcessor::new();
        let counts = processor.token_counts("Rust rust RUST and Go");

        assert_eq!(counts.get("rust"), Some(&3));
        assert_eq!(counts.get("go"), Some(&1));
        assert_eq!(counts.get("and"), None);
    }

    #[test]
    fn test_normalize_keyword() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize_keyword("  SQL "), Some("sql".to_string()));
        assert_eq!(processor.normalize_keyword("Machine Learning"), Some("machine learning".to_string()));
        assert_eq!(processor.normalize_keyword("the"), None);
    }
}
