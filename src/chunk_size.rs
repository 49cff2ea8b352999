use std::{convert::Infallible, fmt};

use ahash::RandomState;
use dashmap::DashMap;
use thiserror::Error;

mod characters;
#[cfg(feature = "tokenizers")]
mod huggingface;
#[cfg(feature = "rust-tokenizers")]
mod rust_tokenizers;
#[cfg(feature = "tiktoken-rs")]
mod tiktoken;
mod words;

pub use characters::Characters;
pub use words::Words;

/// Indicates there was an error with the chunk configuration.
/// The `Display` implementation will provide a human-readable error message to
/// help debug the issue that caused the error.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ChunkConfigError(#[from] ChunkConfigErrorRepr);

/// Private error and free to change across minor version of the crate.
#[derive(Error, Debug)]
enum ChunkConfigErrorRepr {
    #[error("Chunk capacity must be greater than zero")]
    ZeroCapacity,
}

/// Error returned when chunking with a fallible token counter.
///
/// Errors from the token counter are passed through as-is, the chunker never
/// retries or falls back to another way of counting.
#[derive(Error, Debug)]
pub enum ChunkError<E> {
    /// The chunk configuration was invalid.
    #[error(transparent)]
    Config(#[from] ChunkConfigError),
    /// The token counter failed.
    #[error(transparent)]
    Sizer(E),
}

/// Determines the size of a given chunk.
pub trait ChunkSizer {
    /// Determine the size of a given chunk to use for validation
    fn size(&self, chunk: &str) -> usize;
}

impl<S> ChunkSizer for &S
where
    S: ChunkSizer + ?Sized,
{
    fn size(&self, chunk: &str) -> usize {
        (**self).size(chunk)
    }
}

/// Determines the size of a given chunk, with the possibility of failure.
///
/// Every [`ChunkSizer`] is also a `TryChunkSizer` that never fails. Implement
/// this directly for token counters that can error, such as ones backed by
/// a remote service.
pub trait TryChunkSizer {
    /// Error returned when the size can't be determined.
    type Error;

    /// Determine the size of a given chunk to use for validation
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying token counter produced.
    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error>;
}

impl<S> TryChunkSizer for S
where
    S: ChunkSizer,
{
    type Error = Infallible;

    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error> {
        Ok(self.size(chunk))
    }
}

/// Use any function or closure as a chunk sizer.
///
/// ```
/// use semchunk::{ChunkSizer, FnSizer};
///
/// let sizer = FnSizer::new(|text: &str| text.split_whitespace().count());
/// assert_eq!(sizer.size("two words"), 2);
/// ```
pub struct FnSizer<F>(F);

impl<F> FnSizer<F>
where
    F: Fn(&str) -> usize,
{
    /// Wrap a token counting function.
    #[must_use]
    pub fn new(token_counter: F) -> Self {
        Self(token_counter)
    }
}

impl<F> ChunkSizer for FnSizer<F>
where
    F: Fn(&str) -> usize,
{
    fn size(&self, chunk: &str) -> usize {
        (self.0)(chunk)
    }
}

impl<F> fmt::Debug for FnSizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSizer").finish_non_exhaustive()
    }
}

/// Use any fallible function or closure as a chunk sizer.
///
/// ```
/// use semchunk::{TryChunkSizer, TryFnSizer};
///
/// let sizer = TryFnSizer::new(|text: &str| text.parse::<usize>());
/// assert_eq!(sizer.try_size("12").unwrap(), 12);
/// assert!(sizer.try_size("twelve").is_err());
/// ```
pub struct TryFnSizer<F>(F);

impl<F, E> TryFnSizer<F>
where
    F: Fn(&str) -> Result<usize, E>,
{
    /// Wrap a fallible token counting function.
    #[must_use]
    pub fn new(token_counter: F) -> Self {
        Self(token_counter)
    }
}

impl<F, E> TryChunkSizer for TryFnSizer<F>
where
    F: Fn(&str) -> Result<usize, E>,
{
    type Error = E;

    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error> {
        (self.0)(chunk)
    }
}

impl<F> fmt::Debug for TryFnSizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFnSizer").finish_non_exhaustive()
    }
}

/// Configuration for how chunks should be created
#[derive(Debug)]
pub struct ChunkConfig<Sizer>
where
    Sizer: TryChunkSizer,
{
    /// The maximum size of a chunk, in units of the sizer
    capacity: usize,
    /// Whether sizes should be cached per distinct text
    memoize: bool,
    /// The chunk sizer to use for determining the size of each chunk
    sizer: Sizer,
}

impl ChunkConfig<Characters> {
    /// Create a basic configuration for chunking with only the required value a chunk capacity.
    ///
    /// By default, chunk sizes will be calculated based on the number of characters in each chunk.
    /// You can set a custom chunk sizer by calling [`Self::with_sizer`].
    ///
    /// By default, sizes are memoized. Call [`Self::with_memoize`] to turn this off.
    ///
    /// # Errors
    ///
    /// Will return an error if the capacity is zero.
    pub fn new(capacity: usize) -> Result<Self, ChunkConfigError> {
        if capacity == 0 {
            return Err(ChunkConfigError(ChunkConfigErrorRepr::ZeroCapacity));
        }

        Ok(Self {
            capacity,
            memoize: true,
            sizer: Characters,
        })
    }
}

impl<Sizer> ChunkConfig<Sizer>
where
    Sizer: TryChunkSizer,
{
    /// The maximum size of a chunk.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retrieve a reference to the chunk sizer for this configuration.
    pub fn sizer(&self) -> &Sizer {
        &self.sizer
    }

    /// Set a custom chunk sizer to use for determining the size of each chunk
    ///
    /// ```
    /// use semchunk::{ChunkConfig, Words};
    ///
    /// let config = ChunkConfig::new(512).unwrap().with_sizer(Words);
    /// ```
    #[must_use]
    pub fn with_sizer<S: TryChunkSizer>(self, sizer: S) -> ChunkConfig<S> {
        ChunkConfig {
            capacity: self.capacity,
            memoize: self.memoize,
            sizer,
        }
    }

    /// Whether the size of each distinct text is cached.
    pub fn memoize(&self) -> bool {
        self.memoize
    }

    /// Specify whether the size of each distinct text should be cached.
    ///
    /// Sizers are expected to be pure, so this only changes how often the
    /// sizer is called, never the chunks produced.
    ///
    /// ```
    /// use semchunk::ChunkConfig;
    ///
    /// let config = ChunkConfig::new(512).unwrap().with_memoize(false);
    /// ```
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}

impl TryFrom<usize> for ChunkConfig<Characters> {
    type Error = ChunkConfigError;

    fn try_from(capacity: usize) -> Result<Self, Self::Error> {
        Self::new(capacity)
    }
}

/// Cache of sizes keyed by the text that was measured.
pub(crate) type SizeCache = DashMap<String, usize, RandomState>;

/// A memoized chunk sizer that caches the size of chunks.
/// Very helpful when the same chunk is being validated multiple times, which
/// happens often, and can be expensive to compute, such as with tokenizers.
#[derive(Debug)]
pub(crate) struct MemoizedChunkSizer<'sizer, Sizer>
where
    Sizer: TryChunkSizer,
{
    /// Cache of chunk sizes per text, if memoization is enabled
    cache: Option<&'sizer SizeCache>,
    /// The sizer being wrapped
    sizer: &'sizer Sizer,
}

impl<'sizer, Sizer> MemoizedChunkSizer<'sizer, Sizer>
where
    Sizer: TryChunkSizer,
{
    /// Wrap any chunk sizer for memoization
    pub(crate) fn new(sizer: &'sizer Sizer, cache: Option<&'sizer SizeCache>) -> Self {
        Self { cache, sizer }
    }
}

impl<Sizer> TryChunkSizer for MemoizedChunkSizer<'_, Sizer>
where
    Sizer: TryChunkSizer,
{
    type Error = Sizer::Error;

    /// Determine the size of a given chunk to use for validation,
    /// returning a cached value if it exists, and storing the result if not.
    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error> {
        let Some(cache) = self.cache else {
            return self.sizer.try_size(chunk);
        };

        if let Some(size) = cache.get(chunk) {
            return Ok(*size);
        }

        let size = self.sizer.try_size(chunk)?;
        cache.insert(chunk.to_owned(), size);
        Ok(size)
    }
}
