use unicode_segmentation::UnicodeSegmentation;

use crate::ChunkSizer;

/// Sizes chunks by the number of
/// [unicode words](https://www.unicode.org/reports/tr29/#Word_Boundaries)
/// they contain. Punctuation and whitespace don't count towards the size.
///
/// ```
/// use semchunk::{ChunkSizer, Words};
///
/// assert_eq!(Words.size("The quick brown fox."), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Words;

impl ChunkSizer for Words {
    fn size(&self, chunk: &str) -> usize {
        chunk.unicode_words().count()
    }
}
