use ::semchunk::{ChunkConfig, ChunkConfigError, TextChunker, TryChunkSizer};
use pyo3::{
    exceptions::{PyException, PyValueError},
    prelude::*,
};
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

/// Calls a Python function to count the tokens in a chunk.
/// Whatever the function raises is passed back to the caller unchanged.
struct PyTokenCounter(PyObject);

impl TryChunkSizer for PyTokenCounter {
    type Error = PyErr;

    fn try_size(&self, chunk: &str) -> PyResult<usize> {
        Python::with_gil(|py| self.0.call1(py, (chunk,))?.extract(py))
    }
}

fn config_error(err: ChunkConfigError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

enum Sizer {
    Callable(TextChunker<PyTokenCounter>),
    Tiktoken(TextChunker<CoreBPE>),
}

/// Splits text into chunks of up to `chunk_size` tokens.
///
/// Keeps its caches between calls, so reuse it when chunking many texts.
#[pyclass]
struct Chunker {
    chunker: Sizer,
}

#[pymethods]
impl Chunker {
    #[new]
    #[pyo3(signature = (chunk_size, token_counter, memoize=true))]
    fn new(chunk_size: usize, token_counter: PyObject, memoize: bool) -> PyResult<Self> {
        let config = ChunkConfig::new(chunk_size)
            .map_err(config_error)?
            .with_memoize(memoize)
            .with_sizer(PyTokenCounter(token_counter));
        Ok(Self {
            chunker: Sizer::Callable(TextChunker::new(config)),
        })
    }

    /// Count tokens with the tiktoken encoding used by an OpenAI model, e.g. `gpt-4`.
    #[staticmethod]
    #[pyo3(signature = (model, chunk_size, memoize=true))]
    fn from_tiktoken_model(model: &str, chunk_size: usize, memoize: bool) -> PyResult<Self> {
        let tokenizer =
            get_bpe_from_model(model).map_err(|err| PyException::new_err(format!("{err}")))?;
        let config = ChunkConfig::new(chunk_size)
            .map_err(config_error)?
            .with_memoize(memoize)
            .with_sizer(tokenizer);
        Ok(Self {
            chunker: Sizer::Tiktoken(TextChunker::new(config)),
        })
    }

    fn chunks(&self, text: &str) -> PyResult<Vec<String>> {
        match &self.chunker {
            Sizer::Callable(chunker) => chunker.try_chunks(text),
            Sizer::Tiktoken(chunker) => Ok(chunker.chunks(text)),
        }
    }

    fn clear_cache(&self) {
        match &self.chunker {
            Sizer::Callable(chunker) => chunker.clear_cache(),
            Sizer::Tiktoken(chunker) => chunker.clear_cache(),
        }
    }
}

/// Split text into chunks of up to `chunk_size` tokens, as counted by `token_counter`.
#[pyfunction]
#[pyo3(signature = (text, chunk_size, token_counter, memoize=true))]
fn chunk(
    text: &str,
    chunk_size: usize,
    token_counter: PyObject,
    memoize: bool,
) -> PyResult<Vec<String>> {
    Chunker::new(chunk_size, token_counter, memoize)?.chunks(text)
}

/// Split text into semantically meaningful chunks of a specified size.
#[pymodule]
fn semchunk(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(chunk, m)?)?;
    m.add_class::<Chunker>()?;
    Ok(())
}
