/*!
# [`TextChunker`]
Semantic chunking of plain text.
*/

use std::convert::Infallible;

use ahash::RandomState;
use dashmap::DashMap;
use tracing::debug;

use crate::{
    chunk_size::{MemoizedChunkSizer, SizeCache},
    ChunkConfig, TryChunkSizer,
};

use super::TextChunks;

/// Splits text into the largest chunks that fit within the chunk capacity,
/// cutting at the most semantically meaningful delimiter available.
///
/// A chunker owns its caches: the size of every distinct text it has measured
/// (if memoization is enabled), and the chunks of every text it has chunked.
/// Reuse a chunker to benefit from them, or call [`TextChunker::clear_cache`]
/// to free the memory. It can be shared between threads.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TextChunker<Sizer>
where
    Sizer: TryChunkSizer,
{
    /// Method of determining chunk sizes.
    chunk_config: ChunkConfig<Sizer>,
    /// Chunks previously generated for a given text
    chunk_cache: DashMap<String, Vec<String>, RandomState>,
    /// Sizes previously measured for a given text
    size_cache: SizeCache,
}

impl<Sizer> TextChunker<Sizer>
where
    Sizer: TryChunkSizer,
{
    /// Creates a new [`TextChunker`].
    ///
    /// ```
    /// use semchunk::{ChunkConfig, TextChunker};
    ///
    /// // By default, the chunk sizer is based on characters.
    /// let chunker = TextChunker::new(ChunkConfig::new(512).unwrap());
    /// ```
    #[must_use]
    pub fn new(chunk_config: ChunkConfig<Sizer>) -> Self {
        Self {
            chunk_config,
            chunk_cache: DashMap::default(),
            size_cache: SizeCache::default(),
        }
    }

    /// Retrieve the configuration used by this chunker.
    pub fn chunk_config(&self) -> &ChunkConfig<Sizer> {
        &self.chunk_config
    }

    /// Generate a list of chunks from a given text, using a sizer that may fail.
    ///
    /// See [`TextChunker::chunks`] for how the text is split.
    ///
    /// ```
    /// use semchunk::{ChunkConfig, TextChunker, TryFnSizer};
    ///
    /// let sizer = TryFnSizer::new(|text: &str| {
    ///     u8::try_from(text.len()).map(usize::from)
    /// });
    /// let chunker = TextChunker::new(ChunkConfig::new(10).unwrap().with_sizer(sizer));
    ///
    /// assert_eq!(chunker.try_chunks("Some text from a document").unwrap(), vec!["Some text", "from a", "document"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the sizer's error unchanged the first time it fails.
    pub fn try_chunks(&self, text: &str) -> Result<Vec<String>, Sizer::Error> {
        if let Some(chunks) = self.chunk_cache.get(text) {
            debug!(text_len = text.len(), "reusing cached chunks");
            return Ok(chunks.clone());
        }

        let capacity = self.chunk_config.capacity();
        debug!(text_len = text.len(), capacity, "chunking text");

        let chunk_sizer = MemoizedChunkSizer::new(
            self.chunk_config.sizer(),
            self.chunk_config.memoize().then_some(&self.size_cache),
        );
        let chunks = TextChunks::new(capacity, chunk_sizer).chunks(text)?;

        self.chunk_cache.insert(text.to_owned(), chunks.clone());
        Ok(chunks)
    }

    /// Forget all cached sizes and chunks.
    pub fn clear_cache(&self) {
        self.chunk_cache.clear();
        self.size_cache.clear();
    }
}

impl<Sizer> TextChunker<Sizer>
where
    Sizer: TryChunkSizer<Error = Infallible>,
{
    /// Generate a list of chunks from a given text. Each chunk will be up to the chunk capacity.
    ///
    /// ## Method
    ///
    /// To preserve as much semantic meaning within a chunk as possible, the text is split at the
    /// most meaningful delimiter it contains:
    ///
    /// 1. The longest run of newlines and/or carriage returns
    /// 2. The longest run of tabs
    /// 3. The longest run of any whitespace
    /// 4. Punctuation, ranked from sentence terminators down to word joiners
    ///    (see [`SEMANTIC_DELIMITERS`](crate::SEMANTIC_DELIMITERS))
    /// 5. Individual characters
    ///
    /// Pieces that are still too big are split again the same way. Neighboring pieces that fit are
    /// merged into the largest chunk possible. Whitespace delimiters between chunks are dropped,
    /// while punctuation is added to the end of the preceding chunk, or becomes its own chunk if
    /// there is no room.
    ///
    /// A single character bigger than the capacity is returned as its own chunk.
    ///
    /// ```
    /// use semchunk::{ChunkConfig, TextChunker};
    ///
    /// let chunker = TextChunker::new(ChunkConfig::new(10).unwrap());
    /// let text = "Some text\n\nfrom a\ndocument";
    ///
    /// assert_eq!(chunker.chunks(text), vec!["Some text", "from a", "document"]);
    /// ```
    pub fn chunks(&self, text: &str) -> Vec<String> {
        self.try_chunks(text).unwrap_or_else(|never| match never {})
    }
}
