/*!
Choosing where to split a fragment of text.

Each fragment is split at a single delimiter: the most semantically
meaningful one it contains. Whitespace runs are tried first, longest run
first, and only when no whitespace exists are punctuation marks considered.
*/

use std::cmp::Reverse;

use auto_enums::auto_enum;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::{EnumIter, IntoEnumIterator};

/// Non-whitespace delimiters, ordered from most to least desirable.
#[rustfmt::skip]
pub const SEMANTIC_DELIMITERS: [&str; 25] = [
    // Sentence terminators
    ".", "?", "!", "*",
    // Clause separators
    ";", ",", "(", ")", "[", "]", "“", "”", "‘", "’", "'", "\"", "`",
    // Sentence interrupters
    ":", "—", "…",
    // Word joiners
    "/", "\\", "–", "&", "-",
];

// Lazy so that we don't have to compile them more than once
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());
static TAB_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Classes of delimiters, in the order they are tried.
#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq, Ord, PartialOrd)]
pub enum DelimiterClass {
    /// The longest run of `\r` and `\n` characters.
    Newlines,
    /// The longest run of tabs.
    Tabs,
    /// The longest run of any whitespace.
    Whitespace,
    /// The first entry of [`SEMANTIC_DELIMITERS`] found in the text.
    Semantic,
}

impl DelimiterClass {
    /// Whether delimiters of this class can be dropped without losing meaning.
    #[must_use]
    pub fn is_whitespace(self) -> bool {
        !matches!(self, Self::Semantic)
    }

    /// Find the delimiter of this class to split the text at, if the text
    /// contains one.
    #[must_use]
    pub fn find(self, text: &str) -> Option<&str> {
        match self {
            Self::Newlines => longest_run(&NEWLINE_RUNS, text),
            Self::Tabs => longest_run(&TAB_RUNS, text),
            Self::Whitespace => longest_run(&WHITESPACE_RUNS, text),
            Self::Semantic => SEMANTIC_DELIMITERS
                .into_iter()
                .find(|delimiter| text.contains(delimiter)),
        }
    }
}

/// Longest match of the pattern. The earliest one wins a tie.
fn longest_run<'text>(pattern: &Regex, text: &'text str) -> Option<&'text str> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str())
        .min_by_key(|run| Reverse(run.chars().count()))
}

/// The delimiter a fragment was split at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Delimiter<'text> {
    /// Class the delimiter was found with. `None` if the fragment had no
    /// delimiter and was split into characters.
    class: Option<DelimiterClass>,
    /// Text of the delimiter
    text: &'text str,
}

impl<'text> Delimiter<'text> {
    /// Used when nothing else is available: every character is its own piece.
    pub const CHARACTERS: Self = Self {
        class: None,
        text: "",
    };

    /// Text of the delimiter. Empty when splitting into characters.
    #[must_use]
    pub fn as_str(self) -> &'text str {
        self.text
    }

    /// Class of the delimiter, or `None` when splitting into characters.
    #[must_use]
    pub fn class(self) -> Option<DelimiterClass> {
        self.class
    }

    /// Whether the delimiter can be dropped from the output without losing
    /// meaning. Splitting into characters drops nothing, so it counts as
    /// whitespace.
    #[must_use]
    pub fn is_whitespace(self) -> bool {
        self.class.map_or(true, DelimiterClass::is_whitespace)
    }

    /// Split the fragment at every occurrence of the delimiter.
    /// Joining the pieces with the delimiter gives back the fragment.
    #[auto_enum(Iterator)]
    fn pieces(self, fragment: &'text str) -> impl Iterator<Item = &'text str> {
        match self.class {
            None => fragment
                .char_indices()
                .map(move |(i, c)| &fragment[i..i + c.len_utf8()]),
            Some(_) => fragment.split(self.text),
        }
    }
}

/// Split text using the most semantically meaningful delimiter it contains.
///
/// In order of preference:
///
/// 1. The longest run of newlines and/or carriage returns
/// 2. The longest run of tabs
/// 3. The longest run of any whitespace
/// 4. The first of [`SEMANTIC_DELIMITERS`] present in the text
/// 5. Otherwise, every character becomes its own piece
///
/// ```
/// use semchunk::split_text;
///
/// let (delimiter, pieces) = split_text("One. Two.\n\nThree.");
/// assert_eq!(delimiter.as_str(), "\n\n");
/// assert_eq!(pieces, vec!["One. Two.", "Three."]);
/// ```
#[must_use]
pub fn split_text(text: &str) -> (Delimiter<'_>, Vec<&str>) {
    let delimiter = DelimiterClass::iter()
        .find_map(|class| {
            class.find(text).map(|found| Delimiter {
                class: Some(class),
                text: found,
            })
        })
        .unwrap_or(Delimiter::CHARACTERS);

    (delimiter, delimiter.pieces(text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(text: &str) {
        let (delimiter, pieces) = split_text(text);
        assert_eq!(pieces.join(delimiter.as_str()), text);
    }

    #[test]
    fn classes_are_tried_in_order() {
        assert_eq!(
            DelimiterClass::iter().collect::<Vec<_>>(),
            vec![
                DelimiterClass::Newlines,
                DelimiterClass::Tabs,
                DelimiterClass::Whitespace,
                DelimiterClass::Semantic
            ]
        );
    }

    #[test]
    fn ranking_has_no_duplicates() {
        let mut delimiters = SEMANTIC_DELIMITERS.to_vec();
        delimiters.sort_unstable();
        delimiters.dedup();
        assert_eq!(delimiters.len(), SEMANTIC_DELIMITERS.len());
    }

    #[test]
    fn prefers_newlines_over_punctuation() {
        let (delimiter, pieces) = split_text("First sentence. Second one!\nThird line.");
        assert_eq!(delimiter.as_str(), "\n");
        assert_eq!(delimiter.class(), Some(DelimiterClass::Newlines));
        assert!(delimiter.is_whitespace());
        assert_eq!(pieces, vec!["First sentence. Second one!", "Third line."]);
    }

    #[test]
    fn picks_longest_newline_run() {
        let (delimiter, pieces) = split_text("a\nb\n\n\nc\r\nd");
        assert_eq!(delimiter.as_str(), "\n\n\n");
        assert_eq!(pieces, vec!["a\nb", "c\r\nd"]);
    }

    #[test]
    fn carriage_returns_count_as_newlines() {
        let (delimiter, pieces) = split_text("a\r\n\r\nb\nc");
        assert_eq!(delimiter.as_str(), "\r\n\r\n");
        assert_eq!(pieces, vec!["a", "b\nc"]);
    }

    #[test]
    fn first_run_wins_a_tie() {
        let (delimiter, _) = split_text("a\r\nb\n\nc");
        assert_eq!(delimiter.as_str(), "\r\n");
    }

    #[test]
    fn tabs_before_spaces() {
        let (delimiter, pieces) = split_text("a b\tc  d");
        assert_eq!(delimiter.as_str(), "\t");
        assert_eq!(delimiter.class(), Some(DelimiterClass::Tabs));
        assert_eq!(pieces, vec!["a b", "c  d"]);
    }

    #[test]
    fn longest_whitespace_run() {
        let (delimiter, pieces) = split_text("a b  c d");
        assert_eq!(delimiter.as_str(), "  ");
        assert_eq!(pieces, vec!["a b", "c d"]);
    }

    #[test]
    fn unicode_whitespace() {
        let (delimiter, pieces) = split_text("a\u{3000}b");
        assert_eq!(delimiter.as_str(), "\u{3000}");
        assert_eq!(pieces, vec!["a", "b"]);
    }

    #[test]
    fn punctuation_by_rank() {
        let (delimiter, pieces) = split_text("one,two.three");
        assert_eq!(delimiter.as_str(), ".");
        assert_eq!(delimiter.class(), Some(DelimiterClass::Semantic));
        assert!(!delimiter.is_whitespace());
        assert_eq!(pieces, vec!["one,two", "three"]);
    }

    #[test]
    fn word_joiners_last() {
        let (delimiter, pieces) = split_text("well-known/thing");
        assert_eq!(delimiter.as_str(), "/");
        assert_eq!(pieces, vec!["well-known", "thing"]);
    }

    #[test]
    fn multibyte_punctuation() {
        let (delimiter, pieces) = split_text("wait—what");
        assert_eq!(delimiter.as_str(), "—");
        assert_eq!(pieces, vec!["wait", "what"]);
    }

    #[test]
    fn falls_back_to_characters() {
        let (delimiter, pieces) = split_text("abcé");
        assert_eq!(delimiter, Delimiter::CHARACTERS);
        assert!(delimiter.is_whitespace());
        assert_eq!(pieces, vec!["a", "b", "c", "é"]);
    }

    #[test]
    fn empty_text_has_no_pieces() {
        let (delimiter, pieces) = split_text("");
        assert_eq!(delimiter, Delimiter::CHARACTERS);
        assert!(pieces.is_empty());
    }

    #[test]
    fn pieces_keep_empty_edges() {
        let (delimiter, pieces) = split_text(".a.");
        assert_eq!(delimiter.as_str(), ".");
        assert_eq!(pieces, vec!["", "a", ""]);
    }

    #[test]
    fn pieces_rejoin_to_text() {
        for text in [
            "Some text\n\nfrom a\ndocument",
            "\ttabbed\t\tline",
            "  leading and trailing  ",
            "a.b?c!d",
            "“quoted”",
            "plain",
            "é√ü",
            "",
        ] {
            assert_round_trip(text);
        }
    }
}
