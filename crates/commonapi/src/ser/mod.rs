// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic stream serialization protocol.
//!
//! Values never know the wire format. They drive an [`OutputStream`] or
//! [`InputStream`] implemented by a transport binding through one call per
//! scalar kind and begin/end pairs per container kind. A [`Deployment`] may
//! travel alongside a value to tune the binding's representation.
//!
//! [`MemoryOutputStream`] / [`MemoryInputStream`] are the reference streams
//! used by tests and as a template for bindings.

pub mod cursor;
pub mod deployment;
pub mod memory;
pub mod polymorphic;
pub mod signature;
pub mod stream;
pub mod structs;
pub mod value;

pub use deployment::{child_of, Deployable, Deployment, Hint, LENGTH_WIDTH_HINT};
pub use memory::{MemoryInputStream, MemoryOutputStream};
pub use polymorphic::{PolymorphicRegistry, PolymorphicStruct, Serial};
pub use signature::{SignatureWriter, TypeOutputStream, WriteType};
pub use stream::{InputStream, OutputStream};
pub use value::{ByteBuffer, RangedInteger, ReadValue, Version, WriteValue};

use crate::config::StreamLimits;
use std::fmt;

/// Stream-level error. Latched by the stream that raised it.
#[derive(Debug, Clone, PartialEq)]
pub enum SerError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
    /// Variant tag or polymorphic serial with nothing registered for it.
    UnknownDiscriminator { discriminator: u32 },
    /// An empty Variant cannot be written.
    EmptyVariant,
    LimitExceeded {
        what: &'static str,
        limit: usize,
        actual: usize,
    },
    InvalidEnumValue { value: i128 },
    /// begin/end calls do not pair up.
    Unbalanced { reason: String },
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
            SerError::UnknownDiscriminator { discriminator } => {
                write!(f, "unknown discriminator {}", discriminator)
            }
            SerError::EmptyVariant => write!(f, "cannot serialize an empty variant"),
            SerError::LimitExceeded {
                what,
                limit,
                actual,
            } => write!(f, "{} limit exceeded: {} > {}", what, actual, limit),
            SerError::InvalidEnumValue { value } => {
                write!(f, "value {} is not a declared enumerator", value)
            }
            SerError::Unbalanced { reason } => write!(f, "unbalanced stream: {}", reason),
        }
    }
}

impl std::error::Error for SerError {}

pub type SerResult<T> = core::result::Result<T, SerError>;

/// Encode `value` with the reference little-endian stream.
pub fn encode<T: WriteValue + ?Sized>(
    value: &T,
    deployment: Option<&Deployment>,
) -> crate::Result<Vec<u8>> {
    encode_with_limits(value, deployment, StreamLimits::default())
}

/// [`encode`] with explicit limits.
pub fn encode_with_limits<T: WriteValue + ?Sized>(
    value: &T,
    deployment: Option<&Deployment>,
    limits: StreamLimits,
) -> crate::Result<Vec<u8>> {
    let mut stream = MemoryOutputStream::with_limits(limits);
    value.write_value(&mut stream, deployment)?;
    stream.finish().map_err(Into::into)
}

/// Decode a `T` previously produced by [`encode`].
pub fn decode<T: ReadValue>(bytes: &[u8], deployment: Option<&Deployment>) -> crate::Result<T> {
    decode_with_limits(bytes, deployment, StreamLimits::default())
}

/// [`decode`] with explicit limits.
pub fn decode_with_limits<T: ReadValue>(
    bytes: &[u8],
    deployment: Option<&Deployment>,
    limits: StreamLimits,
) -> crate::Result<T> {
    let mut stream = MemoryInputStream::with_limits(bytes, limits);
    let value = T::read_value(&mut stream, deployment)?;
    stream.finish()?;
    Ok(value)
}
