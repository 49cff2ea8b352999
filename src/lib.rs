/*!
# semchunk

Split text into semantically meaningful chunks of a specified size, as
determined by any token counter.

Large language models (LLMs) can be used for many tasks, but often have a limited context size that can be smaller than documents you might want to use. To use documents of larger length, you often have to split your text into chunks to fit within this context size.

This crate splits text at the most meaningful boundary available, and merges the resulting pieces back into the largest chunks that still fit within the budget.

## Get Started

### With a Token Counting Function

```rust
// Count words, or call out to a tokenizer
let token_counter = |text: &str| text.split_whitespace().count();

let chunks = semchunk::chunk(
    "The quick brown fox jumps over the lazy dog.",
    6,
    token_counter,
    true,
)
.unwrap();

assert_eq!(chunks, vec!["The quick brown fox jumps over", "the lazy dog."]);
```

### Reusing a Chunker

A [`TextChunker`] keeps its caches between calls, so chunking many texts
with the same (possibly expensive) token counter only measures each distinct
piece of text once.

```rust
use semchunk::{ChunkConfig, TextChunker, Words};

let chunker = TextChunker::new(ChunkConfig::new(512).unwrap().with_sizer(Words));
let chunks = chunker.chunks("your document text");
```

### With Huggingface Tokenizer

Requires the `tokenizers` feature to be activated. Tokenizers can fail, so
use [`TextChunker::try_chunks`].

```rust,ignore
use semchunk::{ChunkConfig, TextChunker};
use tokenizers::Tokenizer;

let tokenizer = Tokenizer::from_pretrained("bert-base-cased", None).unwrap();
let chunker = TextChunker::new(ChunkConfig::new(1000).unwrap().with_sizer(tokenizer));

let chunks = chunker.try_chunks("your document text").unwrap();
```

### With Tiktoken Tokenizer

Requires the `tiktoken-rs` feature to be activated.

```rust,ignore
use semchunk::{ChunkConfig, TextChunker};
use tiktoken_rs::cl100k_base;

let tokenizer = cl100k_base().unwrap();
let chunker = TextChunker::new(ChunkConfig::new(1000).unwrap().with_sizer(tokenizer));

let chunks = chunker.chunks("your document text");
```

## Method

Each piece of text is split at a single delimiter, the most meaningful one it contains:

1. The longest sequence of newlines and/or carriage returns
2. The longest sequence of tabs
3. The longest sequence of any whitespace
4. Punctuation, in order of preference: sentence terminators, clause separators, sentence interrupters and word joiners
5. Individual characters

Any resulting piece that is larger than the chunk size is split again the same way. Neighboring pieces that fit are merged into the largest chunk possible, using a binary search guided by the average number of characters per token seen so far, so the token counter is called as few times as possible.

Whitespace delimiters between chunks are removed. Punctuation is kept: it is added to the end of the preceding chunk, or becomes its own chunk if there is no room.

A single character that is larger than the chunk size on its own can't be split any further, and is returned as its own chunk.
*/

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

mod chunk_size;
mod splitter;

pub use chunk_size::{
    Characters, ChunkConfig, ChunkConfigError, ChunkError, ChunkSizer, FnSizer, TryChunkSizer,
    TryFnSizer, Words,
};
pub use splitter::{
    merge_splits, split_text, Delimiter, DelimiterClass, TextChunker, SEMANTIC_DELIMITERS,
};

/// Split text into chunks of at most `chunk_size` tokens, as measured by `token_counter`.
///
/// If `memoize` is true, the size of each distinct piece of text is only
/// measured once. The caches only live for this call, use a [`TextChunker`]
/// to keep them around.
///
/// ```
/// let chunks = semchunk::chunk("a\n\nb\tc", 1, |text: &str| text.chars().count(), true).unwrap();
/// assert_eq!(chunks, vec!["a", "b", "c"]);
/// ```
///
/// # Errors
///
/// Will return an error if `chunk_size` is zero.
pub fn chunk<F>(
    text: &str,
    chunk_size: usize,
    token_counter: F,
    memoize: bool,
) -> Result<Vec<String>, ChunkConfigError>
where
    F: Fn(&str) -> usize,
{
    let config = ChunkConfig::new(chunk_size)?
        .with_memoize(memoize)
        .with_sizer(FnSizer::new(token_counter));
    Ok(TextChunker::new(config).chunks(text))
}

/// Split text into chunks of at most `chunk_size` tokens, as measured by a
/// `token_counter` that may fail.
///
/// ```
/// use semchunk::ChunkError;
///
/// let token_counter = |text: &str| u8::try_from(text.len()).map(usize::from);
///
/// let chunks = semchunk::try_chunk("Some text.", 5, token_counter, true).unwrap();
/// assert_eq!(chunks, vec!["Some", "text."]);
///
/// // Only text that is too long to measure makes the counter fail
/// let text = format!("x {}", "a".repeat(300));
/// let err = semchunk::try_chunk(&text, 5, token_counter, true).unwrap_err();
/// assert!(matches!(err, ChunkError::Sizer(_)));
/// ```
///
/// # Errors
///
/// Will return an error if `chunk_size` is zero, or the first error returned
/// by `token_counter`.
pub fn try_chunk<F, E>(
    text: &str,
    chunk_size: usize,
    token_counter: F,
    memoize: bool,
) -> Result<Vec<String>, ChunkError<E>>
where
    F: Fn(&str) -> Result<usize, E>,
{
    let config = ChunkConfig::new(chunk_size)?
        .with_memoize(memoize)
        .with_sizer(TryFnSizer::new(token_counter));
    TextChunker::new(config)
        .try_chunks(text)
        .map_err(ChunkError::Sizer)
}
