use tracing::{trace, warn};

use crate::{chunk_size::MemoizedChunkSizer, TryChunkSizer};

mod delimiters;
mod merge;
mod text;

pub use delimiters::{split_text, Delimiter, DelimiterClass, SEMANTIC_DELIMITERS};
pub use merge::merge_splits;
#[allow(clippy::module_name_repetitions)]
pub use text::TextChunker;

/// Splits text into chunks that fit within the capacity.
///
/// Each fragment is split at its most meaningful delimiter. Pieces that are
/// too big are split again on their own, and runs of pieces that fit are
/// merged into the largest chunk possible.
#[derive(Debug)]
struct TextChunks<'sizer, Sizer>
where
    Sizer: TryChunkSizer,
{
    /// Maximum size of a chunk
    capacity: usize,
    /// How to validate chunk sizes
    chunk_sizer: MemoizedChunkSizer<'sizer, Sizer>,
}

impl<'sizer, Sizer> TextChunks<'sizer, Sizer>
where
    Sizer: TryChunkSizer,
{
    fn new(capacity: usize, chunk_sizer: MemoizedChunkSizer<'sizer, Sizer>) -> Self {
        Self {
            capacity,
            chunk_sizer,
        }
    }

    /// Generate all chunks for the text, dropping any that are empty.
    ///
    /// Oversized pieces are split again by pushing them onto a stack of
    /// pending fragments, so nesting depth never grows the call stack.
    fn chunks(&self, text: &str) -> Result<Vec<String>, Sizer::Error> {
        let mut chunks = Vec::new();
        let mut pending = vec![Fragment::split(text, 0)];

        while let Some(fragment) = pending.last_mut() {
            // The delimiter goes after everything the previous piece produced,
            // including the chunks of a nested fragment.
            if fragment.delimiter_pending {
                fragment.delimiter_pending = false;
                if !fragment.delimiter.is_whitespace()
                    && fragment.cursor < fragment.pieces.len()
                {
                    let delimiter = fragment.delimiter.as_str();
                    self.attach_delimiter(delimiter, &mut chunks)?;
                }
                continue;
            }

            let Some(&piece) = fragment.pieces.get(fragment.cursor) else {
                pending.pop();
                continue;
            };
            fragment.delimiter_pending = true;

            if self.chunk_sizer.try_size(piece)? <= self.capacity {
                let (last, chunk) = merge_splits(
                    &fragment.pieces[fragment.cursor..],
                    self.capacity,
                    fragment.delimiter.as_str(),
                    &self.chunk_sizer,
                )?;
                chunks.push(chunk);
                fragment.cursor += last + 1;
            } else if is_atomic(piece) {
                if !piece.is_empty() {
                    warn!(
                        capacity = self.capacity,
                        piece, "single character is larger than the chunk capacity"
                    );
                }
                chunks.push(piece.to_owned());
                fragment.cursor += 1;
            } else {
                fragment.cursor += 1;
                let nested = Fragment::split(piece, fragment.depth + 1);
                pending.push(nested);
            }
        }

        chunks.retain(|chunk| !chunk.is_empty());
        Ok(chunks)
    }

    /// Keep a meaningful delimiter by adding it to the end of the previous
    /// chunk, or as its own chunk if that would make the previous one too big.
    fn attach_delimiter(
        &self,
        delimiter: &str,
        chunks: &mut Vec<String>,
    ) -> Result<(), Sizer::Error> {
        if let Some(last) = chunks.last_mut() {
            let with_delimiter = format!("{last}{delimiter}");
            if self.chunk_sizer.try_size(&with_delimiter)? <= self.capacity {
                *last = with_delimiter;
                return Ok(());
            }
        }

        chunks.push(delimiter.to_owned());
        Ok(())
    }
}

/// A fragment split at its delimiter, and how far through its pieces we are.
#[derive(Debug)]
struct Fragment<'text> {
    delimiter: Delimiter<'text>,
    pieces: Vec<&'text str>,
    /// Every piece before the cursor has been added to a chunk.
    cursor: usize,
    /// How many oversized pieces this fragment is nested in
    depth: usize,
    /// Whether the delimiter still has to be placed after the last piece handled
    delimiter_pending: bool,
}

impl<'text> Fragment<'text> {
    fn split(text: &'text str, depth: usize) -> Self {
        let (delimiter, pieces) = split_text(text);
        trace!(
            depth,
            delimiter = delimiter.as_str(),
            class = ?delimiter.class(),
            pieces = pieces.len(),
            "split fragment"
        );

        Self {
            delimiter,
            pieces,
            cursor: 0,
            depth,
            delimiter_pending: false,
        }
    }
}

/// Whether the text is a single character, which can't be split any further.
fn is_atomic(text: &str) -> bool {
    text.chars().nth(1).is_none()
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
    };

    use tracing::{
        span::{Attributes, Id, Record},
        Event, Level, Metadata, Subscriber,
    };

    use super::*;
    use crate::{chunk_size::SizeCache, Characters, ChunkSizer, FnSizer, TryFnSizer};

    /// Counts the warnings emitted while it is the default subscriber.
    struct WarningCounter(Arc<AtomicUsize>);

    impl Subscriber for WarningCounter {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _span: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _span: &Id, _values: &Record<'_>) {}

        fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _span: &Id) {}

        fn exit(&self, _span: &Id) {}
    }

    /// Chunks the text and returns how many warnings were logged.
    fn chunks_with_warnings<Sizer: TryChunkSizer>(
        text: &str,
        capacity: usize,
        sizer: &Sizer,
    ) -> (Result<Vec<String>, Sizer::Error>, usize) {
        let warnings = Arc::new(AtomicUsize::new(0));
        let result = tracing::subscriber::with_default(WarningCounter(warnings.clone()), || {
            chunks(text, capacity, sizer)
        });
        (result, warnings.load(Ordering::SeqCst))
    }

    fn chunks<Sizer: TryChunkSizer>(
        text: &str,
        capacity: usize,
        sizer: &Sizer,
    ) -> Result<Vec<String>, Sizer::Error> {
        let cache = SizeCache::default();
        TextChunks::new(capacity, MemoizedChunkSizer::new(sizer, Some(&cache))).chunks(text)
    }

    #[test]
    fn atomic_text() {
        assert!(is_atomic("a"));
        assert!(is_atomic("é"));
        assert!(is_atomic(""));
        assert!(!is_atomic("ab"));
    }

    #[test]
    fn splits_paragraphs_then_tabs() {
        assert_eq!(
            chunks("a\n\nb\tc", 1, &Characters),
            Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn reattaches_punctuation_when_it_fits() {
        assert_eq!(
            chunks("a.b.c", 2, &Characters),
            Ok(vec!["a.".to_string(), "b.".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn punctuation_becomes_its_own_chunk_when_it_does_not_fit() {
        assert_eq!(
            chunks("a.b.c", 1, &Characters),
            Ok(vec![
                "a".to_string(),
                ".".to_string(),
                "b".to_string(),
                ".".to_string(),
                "c".to_string()
            ])
        );
    }

    #[test]
    fn no_delimiter_after_last_piece() {
        assert_eq!(
            chunks("ab.cd", 5, &Characters),
            Ok(vec!["ab.cd".to_string()])
        );
    }

    #[test]
    fn empty_pieces_are_dropped() {
        // Splitting on "." gives an empty first and last piece
        assert_eq!(
            chunks(".ab.", 2, &Characters),
            Ok(vec![".".to_string(), "ab".to_string(), ".".to_string()])
        );
    }

    #[test]
    fn oversized_character_is_kept() {
        let bytes = FnSizer::new(str::len);
        assert_eq!(
            chunks("éé", 1, &bytes),
            Ok(vec!["é".to_string(), "é".to_string()])
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        assert_eq!(
            chunks("abcdefghij", 3, &Characters),
            Ok(vec![
                "abc".to_string(),
                "def".to_string(),
                "ghi".to_string(),
                "j".to_string()
            ])
        );
    }

    #[test]
    fn sizer_errors_are_returned() {
        let sizer = TryFnSizer::new(|text: &str| {
            if text.contains('x') {
                Err("no x allowed")
            } else {
                Ok(Characters.size(text))
            }
        });
        assert_eq!(chunks("ab cd", 10, &sizer), Ok(vec!["ab cd".to_string()]));
        assert_eq!(chunks("ab x", 2, &sizer), Err("no x allowed"));
    }

    #[test]
    fn empty_text() {
        assert_eq!(chunks("", 10, &Characters), Ok(Vec::new()));
    }

    #[test]
    fn whitespace_only_text() {
        assert_eq!(
            chunks(" \n\t ", 10, &Characters),
            Ok(vec![" \n\t ".to_string()])
        );
        // Only the delimiters are dropped, the spaces around them remain
        assert_eq!(
            chunks(" \n\t ", 1, &Characters),
            Ok(vec![" ".to_string(), " ".to_string()])
        );
    }

    #[test]
    fn punctuation_follows_nested_chunks() {
        assert_eq!(
            chunks("abcd.e", 3, &Characters),
            Ok(vec!["abc".to_string(), "d.".to_string(), "e".to_string()])
        );
        assert_eq!(
            chunks("abcd.e", 2, &Characters),
            Ok(vec![
                "ab".to_string(),
                "cd".to_string(),
                ".".to_string(),
                "e".to_string()
            ])
        );
    }

    #[test]
    fn deep_nesting_uses_constant_stack() {
        // Each run of spaces is one shorter than the one before, so every
        // level of splitting only peels off a single "a".
        let runs = 500;
        let text = (1..runs)
            .rev()
            .map(|len| format!("a{}", " ".repeat(len)))
            .collect::<String>();

        let result = thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                TextChunks::new(1, MemoizedChunkSizer::new(&Characters, None)).chunks(&text)
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(result, Ok(vec!["a".to_string(); runs - 1]));
    }

    #[test]
    fn oversized_characters_are_reported() {
        let bytes = FnSizer::new(str::len);
        let (result, warnings) = chunks_with_warnings("éé", 1, &bytes);

        assert_eq!(result, Ok(vec!["é".to_string(), "é".to_string()]));
        assert_eq!(warnings, 2);
    }

    #[test]
    fn empty_pieces_are_not_reported_as_oversized() {
        // Nothing fits, not even an empty piece
        let sizer = FnSizer::new(|text: &str| text.len() + 2);
        let (result, warnings) = chunks_with_warnings(".a.", 1, &sizer);

        assert_eq!(
            result,
            Ok(vec![".".to_string(), "a".to_string(), ".".to_string()])
        );
        assert_eq!(warnings, 1);
    }
}
