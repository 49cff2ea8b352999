use tokenizers::Tokenizer;

use crate::TryChunkSizer;

/// Number of tokens in the encoding, not counting padding at either end.
fn count_tokens(tokenizer: &Tokenizer, chunk: &str) -> tokenizers::Result<usize> {
    let encoding = tokenizer.encode(chunk, false)?;
    let pad_id = tokenizer.get_padding().map(|params| params.pad_id);

    let count = encoding
        .get_ids()
        .iter()
        // Skip padding tokens at beginning and end so they don't count towards the chunk size
        .skip_while(|&&id| pad_id.is_some_and(|pad_id| id == pad_id))
        .take_while(|&&id| pad_id.map_or(true, |pad_id| id != pad_id))
        .count();

    Ok(count)
}

impl TryChunkSizer for &Tokenizer {
    type Error = tokenizers::Error;

    /// Returns the number of tokens in a given text after tokenization.
    ///
    /// Fails if the tokenizer can't encode the text, for example a
    /// non-byte-level tokenizer encountering text outside its vocabulary.
    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error> {
        count_tokens(self, chunk)
    }
}

impl TryChunkSizer for Tokenizer {
    type Error = tokenizers::Error;

    /// Returns the number of tokens in a given text after tokenization.
    fn try_size(&self, chunk: &str) -> Result<usize, Self::Error> {
        count_tokens(self, chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_size() {
        let tokenizer = Tokenizer::from_pretrained("bert-base-cased", None).unwrap();
        let size = tokenizer.try_size(" An apple a").unwrap();
        assert_eq!(size, 3);
    }

    #[test]
    fn handles_padding() {
        let tokenizer = Tokenizer::from_pretrained("thenlper/gte-small", None).unwrap();
        let size = (&tokenizer).try_size("An apple a").unwrap();
        assert_eq!(size, 3);
    }
}
