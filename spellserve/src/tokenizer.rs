//! Splitting text into dictionary words.
use regex::Regex;

/// Apostrophes and Unicode letters.
pub const DEFAULT_WORD_PATTERN: &str = r"['\pL]+";

/// Finds the words of a text with a configurable regular expression.
#[derive(Debug, Clone)]
pub struct WordSplitter {
    pattern: Regex,
}

/// A word of a text with its position counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan<'a> {
    /// index of the first character of the word
    pub start: usize,
    /// index one past the last character of the word
    pub end: usize,
    /// the word itself
    pub word: &'a str,
}

impl WordSplitter {
    /// Compiles `pattern`; every non-overlapping match is a word.
    pub fn new(pattern: &str) -> Result<WordSplitter, regex::Error> {
        Ok(WordSplitter {
            pattern: Regex::new(pattern)?,
        })
    }

    /// The pattern words are matched with.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Words of `text` in order of appearance.
    pub fn words<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }

    /// Words of `text` with character offsets.
    pub fn word_spans<'a>(&'a self, text: &'a str) -> impl Iterator<Item = WordSpan<'a>> + 'a {
        let mut consumed_bytes = 0;
        let mut consumed_chars = 0;

        self.pattern.find_iter(text).map(move |m| {
            consumed_chars += text[consumed_bytes..m.start()].chars().count();
            let start = consumed_chars;
            let len = m.as_str().chars().count();

            consumed_bytes = m.end();
            consumed_chars += len;

            WordSpan {
                start,
                end: start + len,
                word: m.as_str(),
            }
        })
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        WordSplitter {
            pattern: Regex::new(DEFAULT_WORD_PATTERN).expect("default word pattern is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern() {
        let splitter = WordSplitter::default();
        let words: Vec<&str> = splitter
            .words("It's a test, 42 times: привет-мир!")
            .collect();

        assert_eq!(words, vec!["It's", "a", "test", "times", "привет", "мир"]);
    }

    #[test]
    fn spans_count_characters() {
        let splitter = WordSplitter::default();
        let spans: Vec<WordSpan> = splitter.word_spans("ёж и 😄 кот").collect();

        assert_eq!(
            spans,
            vec![
                WordSpan { start: 0, end: 2, word: "ёж" },
                WordSpan { start: 3, end: 4, word: "и" },
                WordSpan { start: 7, end: 10, word: "кот" },
            ]
        );
    }

    #[test]
    fn custom_pattern() {
        let splitter = WordSplitter::new(r"[a-z]+").unwrap();
        assert_eq!(splitter.words("abc DEF ghi").collect::<Vec<_>>(), vec!["abc", "ghi"]);
        assert!(WordSplitter::new("(").is_err());
    }
}
