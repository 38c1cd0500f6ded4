// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference in-memory streams.
//!
//! Layout (little-endian, alignment relative to the start of the buffer):
//!
//! | Kind              | Encoding                                                 |
//! |-------------------|----------------------------------------------------------|
//! | scalars           | natural alignment, `bool` as one byte (0 or 1)           |
//! | string            | length prefix (bytes + NUL), UTF-8 bytes, NUL            |
//! | byte buffer       | length prefix, raw bytes                                 |
//! | sequence / map    | length prefix (element / entry count), then elements     |
//! | struct            | aligned to 8, then fields                                |
//! | polymorphic struct| `u32` serial, aligned to 8, then fields                  |
//! | variant           | `u8` tag, then the held value                            |
//!
//! Length prefixes are 4 bytes wide unless the deployment carries
//! [`LENGTH_WIDTH_HINT`] set to 1, 2 or 4; a prefix is aligned to its width.
//!
//! Both streams enforce the same [`StreamLimits`], so anything the output
//! stream accepts decodes under the same limits.

use super::cursor::{Cursor, CursorMut};
use super::{
    Deployment, InputStream, OutputStream, SerError, SerResult, Serial, LENGTH_WIDTH_HINT,
};
use crate::config::{StreamLimits, DEFAULT_LENGTH_WIDTH, STRUCT_ALIGNMENT};

fn length_width(deployment: Option<&Deployment>) -> SerResult<usize> {
    match deployment.and_then(|d| d.int_hint(LENGTH_WIDTH_HINT)) {
        None => Ok(DEFAULT_LENGTH_WIDTH),
        Some(1) => Ok(1),
        Some(2) => Ok(2),
        Some(4) => Ok(4),
        Some(other) => Err(SerError::InvalidData {
            reason: format!("unsupported length width {}", other),
        }),
    }
}

/// Log and build the error for a limit violation at `offset`.
fn limit_exceeded(
    stream: &str,
    what: &'static str,
    limit: usize,
    actual: usize,
    offset: usize,
) -> SerError {
    log::warn!(
        "[{}] {} limit exceeded at offset {}: {} > {}",
        stream,
        what,
        offset,
        actual,
        limit
    );
    SerError::LimitExceeded {
        what,
        limit,
        actual,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Struct,
    PolymorphicStruct,
    Variant,
    Sequence,
    Map,
    MapEntry,
}

// ============================================================================
// Output
// ============================================================================

macro_rules! impl_write_scalar {
    ($($name:ident => $cursor_fn:ident: $type:ty),+ $(,)?) => {
        $(
            fn $name(&mut self, value: $type, _: Option<&Deployment>) -> SerResult<()> {
                self.check()?;
                self.cursor.align(std::mem::size_of::<$type>());
                self.cursor.$cursor_fn(value);
                Ok(())
            }
        )+
    };
}

/// Output stream writing into a growable byte buffer.
#[derive(Debug, Default)]
pub struct MemoryOutputStream {
    cursor: CursorMut,
    frames: Vec<Frame>,
    limits: StreamLimits,
    error: Option<SerError>,
}

impl MemoryOutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: CursorMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Stream rejecting values that a [`MemoryInputStream`] with the same
    /// limits would refuse to decode.
    pub fn with_limits(limits: StreamLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &StreamLimits {
        &self.limits
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.as_slice()
    }

    pub fn len(&self) -> usize {
        self.cursor.offset()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.offset() == 0
    }

    /// Consume the stream. Fails if an error is latched or a container is
    /// still open.
    pub fn finish(self) -> SerResult<Vec<u8>> {
        self.check()?;
        if let Some(open) = self.frames.last() {
            return Err(SerError::Unbalanced {
                reason: format!("{:?} still open", open),
            });
        }
        Ok(self.cursor.into_inner())
    }

    fn write_length(&mut self, len: usize, deployment: Option<&Deployment>) -> SerResult<()> {
        let width = length_width(deployment).map_err(|e| self.raise(e))?;
        let max = match width {
            1 => u8::MAX as usize,
            2 => u16::MAX as usize,
            _ => u32::MAX as usize,
        };
        if len > max {
            let offset = self.cursor.offset();
            return Err(self.raise(SerError::WriteFailed {
                offset,
                reason: format!("length {} does not fit a {}-byte prefix", len, width),
            }));
        }
        self.cursor.align(width);
        match width {
            1 => self.cursor.write_u8(len as u8),
            2 => self.cursor.write_u16_le(len as u16),
            _ => self.cursor.write_u32_le(len as u32),
        }
        Ok(())
    }

    fn exceeded(&mut self, what: &'static str, limit: usize, actual: usize) -> SerError {
        let err = limit_exceeded("MemoryOutputStream", what, limit, actual, self.cursor.offset());
        self.raise(err)
    }

    fn check_length(&mut self, what: &'static str, limit: usize, len: usize) -> SerResult<()> {
        if len > limit {
            return Err(self.exceeded(what, limit, len));
        }
        Ok(())
    }

    fn open(&mut self, frame: Frame) -> SerResult<()> {
        if self.frames.len() >= self.limits.max_depth {
            let depth = self.frames.len() + 1;
            return Err(self.exceeded("depth", self.limits.max_depth, depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    fn close(&mut self, expected: Frame) -> SerResult<()> {
        self.check()?;
        match self.frames.pop() {
            Some(frame) if frame == expected => Ok(()),
            found => Err(self.raise(SerError::Unbalanced {
                reason: format!("end of {:?} while {:?} is open", expected, found),
            })),
        }
    }
}

impl OutputStream for MemoryOutputStream {
    fn write_bool(&mut self, value: bool, _: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        self.cursor.write_u8(u8::from(value));
        Ok(())
    }

    impl_write_scalar! {
        write_i8 => write_i8: i8,
        write_i16 => write_i16_le: i16,
        write_i32 => write_i32_le: i32,
        write_i64 => write_i64_le: i64,
        write_u8 => write_u8: u8,
        write_u16 => write_u16_le: u16,
        write_u32 => write_u32_le: u32,
        write_u64 => write_u64_le: u64,
        write_f32 => write_f32_le: f32,
        write_f64 => write_f64_le: f64,
    }

    fn write_string(&mut self, value: &str, deployment: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        self.check_length("string", self.limits.max_string_length, value.len())?;
        self.write_length(value.len() + 1, deployment)?;
        self.cursor.write_bytes(value.as_bytes());
        self.cursor.write_u8(0);
        Ok(())
    }

    fn write_byte_buffer(
        &mut self,
        value: &[u8],
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        self.check()?;
        self.check_length("byte buffer", self.limits.max_string_length, value.len())?;
        self.write_length(value.len(), deployment)?;
        self.cursor.write_bytes(value);
        Ok(())
    }

    fn begin_write_struct(&mut self, _: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        self.open(Frame::Struct)?;
        self.cursor.align(STRUCT_ALIGNMENT);
        Ok(())
    }

    fn end_write_struct(&mut self) -> SerResult<()> {
        self.close(Frame::Struct)
    }

    fn begin_write_polymorphic_struct(
        &mut self,
        serial: Serial,
        _: Option<&Deployment>,
    ) -> SerResult<()> {
        self.check()?;
        self.open(Frame::PolymorphicStruct)?;
        self.cursor.align(4);
        self.cursor.write_u32_le(serial);
        self.cursor.align(STRUCT_ALIGNMENT);
        Ok(())
    }

    fn end_write_polymorphic_struct(&mut self) -> SerResult<()> {
        self.close(Frame::PolymorphicStruct)
    }

    fn begin_write_variant(&mut self, tag: u32, _: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        let Ok(tag) = u8::try_from(tag) else {
            let offset = self.cursor.offset();
            return Err(self.raise(SerError::WriteFailed {
                offset,
                reason: format!("variant tag {} does not fit one byte", tag),
            }));
        };
        self.open(Frame::Variant)?;
        self.cursor.write_u8(tag);
        Ok(())
    }

    fn end_write_variant(&mut self) -> SerResult<()> {
        self.close(Frame::Variant)
    }

    fn begin_write_sequence(
        &mut self,
        len: usize,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        self.check()?;
        self.check_length("sequence", self.limits.max_sequence_length, len)?;
        self.open(Frame::Sequence)?;
        self.write_length(len, deployment)
    }

    fn end_write_sequence(&mut self) -> SerResult<()> {
        self.close(Frame::Sequence)
    }

    fn begin_write_map(&mut self, len: usize, deployment: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        self.check_length("sequence", self.limits.max_sequence_length, len)?;
        self.open(Frame::Map)?;
        self.write_length(len, deployment)
    }

    fn end_write_map(&mut self) -> SerResult<()> {
        self.close(Frame::Map)
    }

    fn begin_write_map_entry(&mut self) -> SerResult<()> {
        self.check()?;
        self.open(Frame::MapEntry)
    }

    fn end_write_map_entry(&mut self) -> SerResult<()> {
        self.close(Frame::MapEntry)
    }

    fn error(&self) -> Option<&SerError> {
        self.error.as_ref()
    }

    fn set_error(&mut self, err: SerError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFrame {
    Plain(Frame),
    Counted { kind: Frame, remaining: usize },
}

macro_rules! impl_read_scalar {
    ($($name:ident => $cursor_fn:ident: $type:ty),+ $(,)?) => {
        $(
            fn $name(&mut self, _: Option<&Deployment>) -> SerResult<$type> {
                self.check()?;
                let result = self
                    .cursor
                    .align(std::mem::size_of::<$type>())
                    .and_then(|()| self.cursor.$cursor_fn());
                self.latch(result)
            }
        )+
    };
}

/// Input stream reading from a borrowed byte slice.
#[derive(Debug)]
pub struct MemoryInputStream<'a> {
    cursor: Cursor<'a>,
    frames: Vec<ReadFrame>,
    limits: StreamLimits,
    error: Option<SerError>,
}

impl<'a> MemoryInputStream<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_limits(bytes, StreamLimits::default())
    }

    pub fn with_limits(bytes: &'a [u8], limits: StreamLimits) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            frames: Vec::new(),
            limits,
            error: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Succeeds only if no error is latched, every container was closed and
    /// the whole buffer was consumed.
    pub fn finish(self) -> SerResult<()> {
        self.check()?;
        if let Some(open) = self.frames.last() {
            return Err(SerError::Unbalanced {
                reason: format!("{:?} still open", open),
            });
        }
        if !self.cursor.is_eof() {
            return Err(SerError::InvalidData {
                reason: format!("{} trailing bytes", self.cursor.remaining()),
            });
        }
        Ok(())
    }

    fn latch<T>(&mut self, result: SerResult<T>) -> SerResult<T> {
        result.map_err(|e| self.raise(e))
    }

    fn exceeded(&mut self, what: &'static str, limit: usize, actual: usize) -> SerError {
        let err = limit_exceeded("MemoryInputStream", what, limit, actual, self.cursor.offset());
        self.raise(err)
    }

    fn read_length(&mut self, deployment: Option<&Deployment>) -> SerResult<usize> {
        let width = length_width(deployment);
        let width = self.latch(width)?;
        let result = self.cursor.align(width).and_then(|()| match width {
            1 => self.cursor.read_u8().map(usize::from),
            2 => self.cursor.read_u16_le().map(usize::from),
            _ => self.cursor.read_u32_le().map(|v| v as usize),
        });
        self.latch(result)
    }

    fn open(&mut self, frame: ReadFrame) -> SerResult<()> {
        if self.frames.len() >= self.limits.max_depth {
            let depth = self.frames.len() + 1;
            return Err(self.exceeded("depth", self.limits.max_depth, depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    fn close(&mut self, expected: Frame) -> SerResult<()> {
        self.check()?;
        let reason = match self.frames.pop() {
            Some(ReadFrame::Plain(kind)) if kind == expected => return Ok(()),
            Some(ReadFrame::Counted { kind, remaining: 0 }) if kind == expected => return Ok(()),
            Some(ReadFrame::Counted { kind, remaining }) if kind == expected => {
                format!("{} {:?} elements left unread", remaining, kind)
            }
            found => format!("end of {:?} while {:?} is open", expected, found),
        };
        Err(self.raise(SerError::Unbalanced { reason }))
    }

    fn has_more(&mut self, expected: Frame) -> bool {
        if self.has_error() {
            return false;
        }
        match self.frames.last_mut() {
            Some(ReadFrame::Counted { kind, remaining }) if *kind == expected => {
                if *remaining == 0 {
                    return false;
                }
                *remaining -= 1;
                true
            }
            found => {
                let reason = format!("{:?} element requested while {:?} is open", expected, found);
                self.raise(SerError::Unbalanced { reason });
                false
            }
        }
    }

    fn begin_counted(&mut self, kind: Frame, deployment: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        let len = self.read_length(deployment)?;
        if len > self.limits.max_sequence_length {
            return Err(self.exceeded("sequence", self.limits.max_sequence_length, len));
        }
        self.open(ReadFrame::Counted {
            kind,
            remaining: len,
        })
    }
}

impl InputStream for MemoryInputStream<'_> {
    fn read_bool(&mut self, _: Option<&Deployment>) -> SerResult<bool> {
        self.check()?;
        let result = self.cursor.read_u8();
        match self.latch(result)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.raise(SerError::InvalidData {
                reason: format!("boolean byte {}", other),
            })),
        }
    }

    impl_read_scalar! {
        read_i8 => read_i8: i8,
        read_i16 => read_i16_le: i16,
        read_i32 => read_i32_le: i32,
        read_i64 => read_i64_le: i64,
        read_u8 => read_u8: u8,
        read_u16 => read_u16_le: u16,
        read_u32 => read_u32_le: u32,
        read_u64 => read_u64_le: u64,
        read_f32 => read_f32_le: f32,
        read_f64 => read_f64_le: f64,
    }

    fn read_string(&mut self, deployment: Option<&Deployment>) -> SerResult<String> {
        self.check()?;
        let len = self.read_length(deployment)?;
        if len == 0 {
            return Err(self.raise(SerError::InvalidData {
                reason: "string length must include the terminator".into(),
            }));
        }
        if len - 1 > self.limits.max_string_length {
            return Err(self.exceeded("string", self.limits.max_string_length, len - 1));
        }
        let result = self.cursor.read_bytes(len);
        let bytes = self.latch(result)?;
        let (text, terminator) = bytes.split_at(len - 1);
        if terminator.first() != Some(&0) {
            return Err(self.raise(SerError::InvalidData {
                reason: "string is not NUL-terminated".into(),
            }));
        }
        match std::str::from_utf8(text) {
            Ok(text) => Ok(text.to_owned()),
            Err(e) => Err(self.raise(SerError::InvalidData {
                reason: format!("string is not UTF-8: {}", e),
            })),
        }
    }

    fn read_byte_buffer(&mut self, deployment: Option<&Deployment>) -> SerResult<Vec<u8>> {
        self.check()?;
        let len = self.read_length(deployment)?;
        if len > self.limits.max_string_length {
            return Err(self.exceeded("byte buffer", self.limits.max_string_length, len));
        }
        let result = self.cursor.read_bytes(len).map(<[u8]>::to_vec);
        self.latch(result)
    }

    fn begin_read_struct(&mut self, _: Option<&Deployment>) -> SerResult<()> {
        self.check()?;
        let result = self.cursor.align(STRUCT_ALIGNMENT);
        self.latch(result)?;
        self.open(ReadFrame::Plain(Frame::Struct))
    }

    fn end_read_struct(&mut self) -> SerResult<()> {
        self.close(Frame::Struct)
    }

    fn begin_read_polymorphic_struct(&mut self, _: Option<&Deployment>) -> SerResult<Serial> {
        self.check()?;
        let result = self
            .cursor
            .align(4)
            .and_then(|()| self.cursor.read_u32_le())
            .and_then(|serial| self.cursor.align(STRUCT_ALIGNMENT).map(|()| serial));
        let serial = self.latch(result)?;
        self.open(ReadFrame::Plain(Frame::PolymorphicStruct))?;
        Ok(serial)
    }

    fn end_read_polymorphic_struct(&mut self) -> SerResult<()> {
        self.close(Frame::PolymorphicStruct)
    }

    fn begin_read_variant(&mut self, _: Option<&Deployment>) -> SerResult<u32> {
        self.check()?;
        let result = self.cursor.read_u8();
        let tag = self.latch(result)?;
        self.open(ReadFrame::Plain(Frame::Variant))?;
        Ok(u32::from(tag))
    }

    fn end_read_variant(&mut self) -> SerResult<()> {
        self.close(Frame::Variant)
    }

    fn begin_read_sequence(&mut self, deployment: Option<&Deployment>) -> SerResult<()> {
        self.begin_counted(Frame::Sequence, deployment)
    }

    fn has_more_sequence_elements(&mut self) -> bool {
        self.has_more(Frame::Sequence)
    }

    fn end_read_sequence(&mut self) -> SerResult<()> {
        self.close(Frame::Sequence)
    }

    fn begin_read_map(&mut self, deployment: Option<&Deployment>) -> SerResult<()> {
        self.begin_counted(Frame::Map, deployment)
    }

    fn has_more_map_entries(&mut self) -> bool {
        self.has_more(Frame::Map)
    }

    fn end_read_map(&mut self) -> SerResult<()> {
        self.close(Frame::Map)
    }

    fn begin_read_map_entry(&mut self) -> SerResult<()> {
        self.check()?;
        self.open(ReadFrame::Plain(Frame::MapEntry))
    }

    fn end_read_map_entry(&mut self) -> SerResult<()> {
        self.close(Frame::MapEntry)
    }

    fn error(&self) -> Option<&SerError> {
        self.error.as_ref()
    }

    fn set_error(&mut self, err: SerError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
