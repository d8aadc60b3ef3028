//! Text provider for line-based UTF-8 sources.
//!
//! [`TextProvider`] exposes each line as a `str` item keyed by its zero-based
//! line number. [`Levenshtein`] and [`CharLengthDifference`] are metrics over
//! such items.
use std::{
    io::{self, BufRead},
    sync::Arc,
};

use neighbourly_core::{DataShape, DataSourceError, Dataset};
use thiserror::Error;
use tracing::debug;

mod metric;

pub use metric::{CharLengthDifference, Levenshtein};

/// Errors produced when building a [`TextProvider`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextProviderError {
    /// The input did not contain any lines.
    #[error("text input contained no lines")]
    EmptyInput,
    /// Reading the input failed.
    #[error("failed to read text input: {0}")]
    Io(#[from] io::Error),
}

/// UTF-8 text line data source.
#[derive(Clone, Debug)]
pub struct TextProvider {
    name: Arc<str>,
    lines: Vec<String>,
}

impl TextProvider {
    /// Creates a provider from already-split lines.
    ///
    /// # Errors
    /// Returns [`TextProviderError::EmptyInput`] when `lines` is empty.
    ///
    /// # Examples
    /// ```
    /// use neighbourly_core::Dataset;
    /// use neighbourly_providers_text::TextProvider;
    ///
    /// let provider = TextProvider::new("demo", vec!["a".into(), "bb".into()])?;
    /// assert_eq!(provider.len(), 2);
    /// assert_eq!(provider.item(&1)?, "bb");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(name: impl Into<Arc<str>>, lines: Vec<String>) -> Result<Self, TextProviderError> {
        if lines.is_empty() {
            return Err(TextProviderError::EmptyInput);
        }
        Ok(Self {
            name: name.into(),
            lines,
        })
    }

    /// Reads one item per line, stripping `\n` and `\r\n` terminators.
    ///
    /// # Errors
    /// Returns [`TextProviderError::Io`] when reading fails and
    /// [`TextProviderError::EmptyInput`] when no lines are read.
    pub fn try_from_reader<R: BufRead>(
        name: impl Into<Arc<str>>,
        reader: R,
    ) -> Result<Self, TextProviderError> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        debug!(lines = lines.len(), "read text input");
        Self::new(name, lines)
    }

    /// Returns the lines in input order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Dataset for TextProvider {
    type Id = usize;
    type Item = str;

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.lines.len()
    }

    fn contains(&self, id: &usize) -> bool {
        *id < self.lines.len()
    }

    fn item(&self, id: &usize) -> Result<&str, DataSourceError> {
        self.lines
            .get(*id)
            .map(String::as_str)
            .ok_or(DataSourceError::OutOfBounds { index: *id })
    }

    fn shape(&self) -> DataShape {
        DataShape::text()
    }
}
