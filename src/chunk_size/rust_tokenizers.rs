use rust_tokenizers::tokenizer::{
    AlbertTokenizer, BertTokenizer, DeBERTaTokenizer, DeBERTaV2Tokenizer, FNetTokenizer,
    Gpt2Tokenizer, M2M100Tokenizer, MBart50Tokenizer, MarianTokenizer, NLLBTokenizer,
    OpenAiGptTokenizer, PegasusTokenizer, ProphetNetTokenizer, ReformerTokenizer, RobertaTokenizer,
    T5Tokenizer, Tokenizer, XLMRobertaTokenizer, XLNetTokenizer,
};

use crate::ChunkSizer;

/// Every tokenizer shares the same `Tokenizer` trait, so they are all sized
/// by the number of tokens they produce.
macro_rules! impl_chunk_sizer {
    ($($tokenizer:ty),+ $(,)?) => {
        $(
            impl ChunkSizer for $tokenizer {
                /// Returns the number of tokens in a given text after tokenization.
                fn size(&self, chunk: &str) -> usize {
                    self.tokenize(chunk).len()
                }
            }
        )+
    };
}

impl_chunk_sizer!(
    AlbertTokenizer,
    BertTokenizer,
    DeBERTaTokenizer,
    DeBERTaV2Tokenizer,
    FNetTokenizer,
    Gpt2Tokenizer,
    M2M100Tokenizer,
    MBart50Tokenizer,
    MarianTokenizer,
    NLLBTokenizer,
    OpenAiGptTokenizer,
    PegasusTokenizer,
    ProphetNetTokenizer,
    ReformerTokenizer,
    RobertaTokenizer,
    T5Tokenizer,
    XLMRobertaTokenizer,
    XLNetTokenizer,
);
