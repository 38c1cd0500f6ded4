// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Little-endian byte cursors backing the memory streams.

use super::{SerError, SerResult};

/// Generate append methods for primitive types.
macro_rules! impl_write_le {
    ($($name:ident: $type:ty),+ $(,)?) => {
        $(
            pub fn $name(&mut self, value: $type) {
                self.buffer.extend_from_slice(&value.to_le_bytes());
            }
        )+
    };
}

/// Generate bounds-checked read methods for primitive types.
macro_rules! impl_read_le {
    ($($name:ident: $type:ty),+ $(,)?) => {
        $(
            pub fn $name(&mut self) -> SerResult<$type> {
                const SIZE: usize = std::mem::size_of::<$type>();
                let mut bytes = [0u8; SIZE];
                bytes.copy_from_slice(self.read_bytes(SIZE)?);
                Ok(<$type>::from_le_bytes(bytes))
            }
        )+
    };
}

/// Growable write cursor. Offsets are relative to the start of the buffer,
/// which is also the alignment origin.
#[derive(Debug, Default)]
pub struct CursorMut {
    buffer: Vec<u8>,
}

impl CursorMut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    impl_write_le!(
        write_u8: u8,
        write_u16_le: u16,
        write_u32_le: u32,
        write_u64_le: u64,
        write_i8: i8,
        write_i16_le: i16,
        write_i32_le: i32,
        write_i64_le: i64,
        write_f32_le: f32,
        write_f64_le: f64,
    );

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Pad with zeros up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) {
        if alignment <= 1 {
            return;
        }
        let aligned = align_up(self.buffer.len(), alignment);
        self.buffer.resize(aligned, 0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Immutable cursor for reading (bounds-checked, zero-copy).
#[derive(Debug)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(
        read_u8: u8,
        read_u16_le: u16,
        read_u32_le: u32,
        read_u64_le: u64,
        read_i8: i8,
        read_i16_le: i16,
        read_i32_le: i32,
        read_i64_le: i64,
        read_f32_le: f32,
        read_f64_le: f64,
    );

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            })?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn align(&mut self, alignment: usize) -> SerResult<()> {
        if alignment <= 1 {
            return Ok(());
        }
        let aligned = align_up(self.offset, alignment);
        if aligned > self.buffer.len() {
            return Err(SerError::ReadFailed {
                offset: aligned,
                reason: "unexpected end of buffer".into(),
            });
        }
        self.offset = aligned;
        Ok(())
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

fn align_up(offset: usize, alignment: usize) -> usize {
    let mask = alignment - 1;
    (offset + mask) & !mask
}
