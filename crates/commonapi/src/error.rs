// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.

use crate::event::Subscription;
use crate::ser::SerError;
use std::fmt;

/// Errors surfaced by the value, stream and event layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // ========================================================================
    // Value Errors
    // ========================================================================
    /// Requested alternative is not the one held by the Variant.
    ///
    /// `found` is `None` when the Variant is empty.
    TypeMismatch {
        expected: &'static str,
        found: Option<&'static str>,
    },

    // ========================================================================
    // Stream Errors
    // ========================================================================
    /// Variant tag or polymorphic serial with no registered alternative.
    UnknownDiscriminator(u32),
    /// Latched stream encode/decode failure.
    SerializationError(SerError),

    // ========================================================================
    // Event Errors
    // ========================================================================
    /// Token does not identify a listener of this Event.
    InvalidSubscription(Subscription),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Stream limits could not be loaded or are invalid.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch {
                expected,
                found: Some(found),
            } => write!(f, "type mismatch: expected {}, variant holds {}", expected, found),
            Error::TypeMismatch {
                expected,
                found: None,
            } => write!(f, "type mismatch: expected {}, variant is empty", expected),
            Error::UnknownDiscriminator(tag) => write!(f, "unknown discriminator: {}", tag),
            Error::SerializationError(err) => write!(f, "serialization error: {}", err),
            Error::InvalidSubscription(token) => write!(f, "invalid subscription: {}", token),
            Error::Config(reason) => write!(f, "configuration error: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SerError> for Error {
    fn from(err: SerError) -> Self {
        match err {
            SerError::UnknownDiscriminator { discriminator } => {
                Error::UnknownDiscriminator(discriminator)
            }
            other => Error::SerializationError(other),
        }
    }
}

/// Result alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, Error>;
