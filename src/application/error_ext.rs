//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add source context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// reader.read_line(&mut buf)
    ///     .with_source_context("read observation", "stdin")?;
    /// ```
    fn with_source_context(self, action: &str, source: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_source_context(self, action: &str, source: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, source),
            source: Box::new(e),
        })
    }
}
