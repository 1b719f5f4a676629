//! Word-prefix search over node names.

/// Placeholder text a search box reports when nothing was typed.
pub const PLACEHOLDER: &str = "Search";

/// A parsed search phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    words: Vec<String>,
}

impl SearchFilter {
    /// Parse a phrase. Blank input and the placeholder match everything.
    pub fn new(phrase: &str) -> Self {
        let phrase = phrase.trim();
        if phrase == PLACEHOLDER {
            return Self::all();
        }
        Self {
            words: needle_words(phrase),
        }
    }

    /// A filter that matches every name.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.words.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.is_all() || matches_words(&self.words, name)
    }
}

/// Whether the words of `needle` prefix a consecutive run of words in
/// `haystack`, ignoring case and parentheses.
///
/// `"Date of b"` matches `"Date of birth"`; `"Blood"` matches
/// `"Method of measuring blood pressure"`.
pub fn search_word(needle: &str, haystack: &str) -> bool {
    matches_words(&needle_words(needle), haystack)
}

fn needle_words(needle: &str) -> Vec<String> {
    needle.to_lowercase().split_whitespace().map(str::to_owned).collect()
}

fn matches_words(needle: &[String], haystack: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let cleaned: String = haystack
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    words.windows(needle.len()).any(|run| {
        run.iter()
            .zip(needle)
            .all(|(word, prefix)| word.starts_with(prefix.as_str()))
    })
}
