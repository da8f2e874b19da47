//! Diagnostics channel: an explicit stack of error messages.
//!
//! Fallible calls return their own error values. Host bindings that need to
//! surface a human-readable trail of failures collect them into an
//! [`ErrorStack`] they own and pass around; nothing here is global, so there
//! is no state to reset between unrelated operations.
//!
//! ```rust
//! use raster_core::{ErrorStack, Image};
//!
//! let mut errors = ErrorStack::new();
//! let image = errors.record(Image::new_empty(2, 2, 9));
//! assert!(image.is_none());
//! assert_eq!(errors.latest().unwrap().code, 3);
//! ```

use std::fmt;

/// Numeric identity for an error, used when it is pushed onto an [`ErrorStack`].
pub trait ErrorCode: fmt::Display {
    /// Stable numeric code for this error kind.
    fn code(&self) -> i32;
}

/// One entry of the diagnostics channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Numeric code, `0` when the caller has nothing more specific.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Accumulated error messages, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ErrorStack {
    messages: Vec<ErrorMessage>,
}

impl ErrorStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Pushes a message with an explicit code.
    pub fn push(&mut self, code: i32, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(code, %message, "push_error");
        self.messages.push(ErrorMessage { code, message });
    }

    /// Pushes an error value using its own code and display text.
    pub fn push_error<E: ErrorCode + ?Sized>(&mut self, err: &E) {
        self.push(err.code(), err.to_string());
    }

    /// Unwraps `result`, recording the error on failure.
    pub fn record<T, E: ErrorCode>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push_error(&err);
                None
            }
        }
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[ErrorMessage] {
        &self.messages
    }

    /// The most recently pushed message.
    pub fn latest(&self) -> Option<&ErrorMessage> {
        self.messages.last()
    }

    /// Number of messages on the stack.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been pushed since the last clear.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
