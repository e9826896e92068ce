//! Error types for queues and buffers.

use std::fmt::{self, Formatter, Debug};
use thiserror::Error;


/// Error for trying to take or observe an element of a queue that holds none
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("queue is empty")]
pub struct EmptyError;

/// Error for trying to enqueue into a queue that is at capacity
///
/// The queue is left unchanged, and the value that could not be enqueued is handed back.
#[derive(Error, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[error("queue is full")]
pub struct FullError<T> {
    /// The value that could not be enqueued
    pub value: T,
}

impl<T> FullError<T> {
    /// Take back the value that could not be enqueued
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Debug for FullError<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FullError").finish_non_exhaustive()
    }
}

/// Error for constructing a queue or buffer with a parameter outside its valid range
#[derive(Error, Debug, Clone, Eq, PartialEq, Hash)]
#[error("invalid {name}: {reason}")]
pub struct InvalidParameterError {
    /// Name of the offending parameter
    pub name: &'static str,
    /// Why the supplied value was rejected
    pub reason: String,
}

impl InvalidParameterError {
    pub(crate) fn new(name: &'static str, reason: impl Into<String>) -> Self {
        InvalidParameterError { name, reason: reason.into() }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_error_returns_value() {
        let e = FullError { value: vec![1, 2, 3] };
        assert_eq!(e.to_string(), "queue is full");
        assert_eq!(e.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn invalid_parameter_display() {
        let e = InvalidParameterError::new("buffer size", "must be non-negative, got -1");
        assert_eq!(e.to_string(), "invalid buffer size: must be non-negative, got -1");
    }
}
