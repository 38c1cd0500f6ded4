// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Abstract stream contract implemented by transport bindings.
//!
//! # Error latch
//!
//! Every stream carries one error slot. The first error raised is kept for
//! the rest of the stream's life ([`OutputStream::set_error`] must ignore
//! later errors) and every subsequent call returns it without touching the
//! underlying buffer. Composite values therefore only need `?` after each
//! element to abort cleanly.
//!
//! # Bracketing
//!
//! Containers are written as `begin_* / elements / end_*`. The begin call
//! carries whatever framing data the binding might need (lengths, tags,
//! serials); the generic code never assumes how, or whether, it is encoded.

use super::{Deployment, SerError, SerResult, Serial};

/// Sink side of the stream protocol.
pub trait OutputStream {
    fn write_bool(&mut self, value: bool, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_i8(&mut self, value: i8, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_i16(&mut self, value: i16, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_i32(&mut self, value: i32, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_i64(&mut self, value: i64, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_u8(&mut self, value: u8, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_u16(&mut self, value: u16, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_u32(&mut self, value: u32, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_u64(&mut self, value: u64, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_f32(&mut self, value: f32, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_f64(&mut self, value: f64, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_string(&mut self, value: &str, deployment: Option<&Deployment>) -> SerResult<()>;
    fn write_byte_buffer(
        &mut self,
        value: &[u8],
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;

    fn begin_write_struct(&mut self, deployment: Option<&Deployment>) -> SerResult<()>;
    fn end_write_struct(&mut self) -> SerResult<()>;

    fn begin_write_polymorphic_struct(
        &mut self,
        serial: Serial,
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;
    fn end_write_polymorphic_struct(&mut self) -> SerResult<()>;

    /// `tag` is the 0-based index of the held alternative.
    fn begin_write_variant(&mut self, tag: u32, deployment: Option<&Deployment>)
        -> SerResult<()>;
    fn end_write_variant(&mut self) -> SerResult<()> {
        self.check()
    }

    fn begin_write_sequence(&mut self, len: usize, deployment: Option<&Deployment>)
        -> SerResult<()>;
    fn end_write_sequence(&mut self) -> SerResult<()>;

    fn begin_write_map(&mut self, len: usize, deployment: Option<&Deployment>) -> SerResult<()>;
    fn end_write_map(&mut self) -> SerResult<()>;

    fn begin_write_map_entry(&mut self) -> SerResult<()> {
        self.check()
    }
    fn end_write_map_entry(&mut self) -> SerResult<()> {
        self.check()
    }

    /// Latched error, if any.
    fn error(&self) -> Option<&SerError>;

    /// Latch `err`. Must keep the first error if one is already set.
    fn set_error(&mut self, err: SerError);

    fn has_error(&self) -> bool {
        self.error().is_some()
    }

    fn check(&self) -> SerResult<()> {
        match self.error() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Latch `err` and return the error callers should propagate.
    fn raise(&mut self, err: SerError) -> SerError {
        if let Some(first) = self.error() {
            return first.clone();
        }
        self.set_error(err.clone());
        err
    }
}

/// Source side of the stream protocol, mirroring [`OutputStream`].
pub trait InputStream {
    fn read_bool(&mut self, deployment: Option<&Deployment>) -> SerResult<bool>;
    fn read_i8(&mut self, deployment: Option<&Deployment>) -> SerResult<i8>;
    fn read_i16(&mut self, deployment: Option<&Deployment>) -> SerResult<i16>;
    fn read_i32(&mut self, deployment: Option<&Deployment>) -> SerResult<i32>;
    fn read_i64(&mut self, deployment: Option<&Deployment>) -> SerResult<i64>;
    fn read_u8(&mut self, deployment: Option<&Deployment>) -> SerResult<u8>;
    fn read_u16(&mut self, deployment: Option<&Deployment>) -> SerResult<u16>;
    fn read_u32(&mut self, deployment: Option<&Deployment>) -> SerResult<u32>;
    fn read_u64(&mut self, deployment: Option<&Deployment>) -> SerResult<u64>;
    fn read_f32(&mut self, deployment: Option<&Deployment>) -> SerResult<f32>;
    fn read_f64(&mut self, deployment: Option<&Deployment>) -> SerResult<f64>;
    fn read_string(&mut self, deployment: Option<&Deployment>) -> SerResult<String>;
    fn read_byte_buffer(&mut self, deployment: Option<&Deployment>) -> SerResult<Vec<u8>>;

    fn begin_read_struct(&mut self, deployment: Option<&Deployment>) -> SerResult<()>;
    fn end_read_struct(&mut self) -> SerResult<()>;

    /// Returns the serial identifying the concrete type that follows.
    fn begin_read_polymorphic_struct(&mut self, deployment: Option<&Deployment>)
        -> SerResult<Serial>;
    fn end_read_polymorphic_struct(&mut self) -> SerResult<()>;

    /// Returns the tag written by [`OutputStream::begin_write_variant`].
    fn begin_read_variant(&mut self, deployment: Option<&Deployment>) -> SerResult<u32>;
    fn end_read_variant(&mut self) -> SerResult<()> {
        self.check()
    }

    fn begin_read_sequence(&mut self, deployment: Option<&Deployment>) -> SerResult<()>;
    /// False once all elements were read or an error is latched.
    fn has_more_sequence_elements(&mut self) -> bool;
    fn end_read_sequence(&mut self) -> SerResult<()>;

    fn begin_read_map(&mut self, deployment: Option<&Deployment>) -> SerResult<()>;
    /// False once all entries were read or an error is latched.
    fn has_more_map_entries(&mut self) -> bool;
    fn end_read_map(&mut self) -> SerResult<()>;

    fn begin_read_map_entry(&mut self) -> SerResult<()> {
        self.check()
    }
    fn end_read_map_entry(&mut self) -> SerResult<()> {
        self.check()
    }

    fn error(&self) -> Option<&SerError>;
    fn set_error(&mut self, err: SerError);

    fn has_error(&self) -> bool {
        self.error().is_some()
    }

    fn check(&self) -> SerResult<()> {
        match self.error() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn raise(&mut self, err: SerError) -> SerError {
        if let Some(first) = self.error() {
            return first.clone();
        }
        self.set_error(err.clone());
        err
    }
}
