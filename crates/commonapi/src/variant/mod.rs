// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged union over a closed, statically known set of alternatives.
//!
//! The alternative set is an ordinary Rust enum declared with [`variant!`],
//! so construction, destruction, copying and comparison are the enum's own.
//! [`Variant<A>`] adds the empty state and the typed accessors that
//! generated code relies on:
//!
//! | Operation          | Empty Variant                 | Holding `T`          |
//! |--------------------|-------------------------------|----------------------|
//! | `get::<T>()`       | `Err(TypeMismatch)`           | `Ok(&T)`             |
//! | `get::<U>()`       | `Err(TypeMismatch)`           | `Err(TypeMismatch)`  |
//! | `is_type::<T>()`   | `false`                       | `true`               |
//! | `value_type()`     | `A::COUNT`                    | index of `T`         |
//!
//! Alternative indices follow declaration order and double as the wire tag.
//!
//! [`variant!`]: crate::variant!

pub mod macros;

use crate::error::{Error, Result};
use crate::ser::{
    child_of, Deployment, InputStream, OutputStream, ReadValue, SerError, SerResult,
    TypeOutputStream, WriteType, WriteValue,
};

/// The closed set of alternatives of a Variant. Implemented by [`variant!`].
///
/// [`variant!`]: crate::variant!
pub trait Alternatives: Sized {
    /// Alternative type names, by index.
    const NAMES: &'static [&'static str];

    /// Number of alternatives; also the empty sentinel of `value_type()`.
    const COUNT: usize = Self::NAMES.len();

    /// Index of the held alternative.
    fn index(&self) -> usize;

    fn name(&self) -> &'static str {
        Self::NAMES.get(self.index()).copied().unwrap_or("<unknown>")
    }

    /// Write the held value (without tag).
    fn write_alternative(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;

    /// Read the alternative at `index`. Latches
    /// [`SerError::UnknownDiscriminator`] when `index >= COUNT`.
    fn read_alternative(
        index: usize,
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self>;
}

/// `T` is one of the alternatives of `Self`.
pub trait Alternative<T>: Alternatives {
    const INDEX: usize;

    fn wrap(value: T) -> Self;
    fn peek(&self) -> Option<&T>;
    fn peek_mut(&mut self) -> Option<&mut T>;
    /// Extract `T`, handing `self` back if it holds another alternative.
    fn unwrap_into(self) -> std::result::Result<T, Self>;
}

/// Holds at most one value of the alternative set `A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant<A> {
    slot: Option<A>,
}

impl<A> Default for Variant<A> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<A> From<A> for Variant<A> {
    fn from(alternative: A) -> Self {
        Self {
            slot: Some(alternative),
        }
    }
}

impl<A: Alternatives> Variant<A> {
    /// `value_type()` of an empty Variant.
    pub const EMPTY: usize = A::COUNT;

    pub const fn empty() -> Self {
        Self { slot: None }
    }

    pub fn new<T>(value: T) -> Self
    where
        A: Alternative<T>,
    {
        Self {
            slot: Some(A::wrap(value)),
        }
    }

    /// Replace the held value; the previous one is dropped.
    pub fn set<T>(&mut self, value: T)
    where
        A: Alternative<T>,
    {
        self.slot = Some(A::wrap(value));
    }

    pub fn get<T>(&self) -> Result<&T>
    where
        A: Alternative<T>,
    {
        match self.slot.as_ref().and_then(<A as Alternative<T>>::peek) {
            Some(value) => Ok(value),
            None => Err(Self::mismatch::<T>(self.type_name())),
        }
    }

    pub fn get_mut<T>(&mut self) -> Result<&mut T>
    where
        A: Alternative<T>,
    {
        let found = self.type_name();
        match self.slot.as_mut().and_then(<A as Alternative<T>>::peek_mut) {
            Some(value) => Ok(value),
            None => Err(Self::mismatch::<T>(found)),
        }
    }

    /// Consume the Variant, returning it unchanged if it does not hold `T`.
    pub fn into_value<T>(self) -> std::result::Result<T, Self>
    where
        A: Alternative<T>,
    {
        match self.slot {
            Some(alternative) => alternative.unwrap_into().map_err(Self::from),
            None => Err(Self::empty()),
        }
    }

    pub fn is_type<T>(&self) -> bool
    where
        A: Alternative<T>,
    {
        self.slot
            .as_ref()
            .is_some_and(|alternative| alternative.index() == <A as Alternative<T>>::INDEX)
    }

    /// Index of the held alternative, or [`Self::EMPTY`].
    pub fn value_type(&self) -> usize {
        self.slot.as_ref().map_or(A::COUNT, A::index)
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.slot.as_ref().map(A::name)
    }

    pub fn has_value(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Move the value out into a new Variant, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        Self {
            slot: self.slot.take(),
        }
    }

    /// Drop the held value.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn alternative(&self) -> Option<&A> {
        self.slot.as_ref()
    }

    pub fn into_alternative(self) -> Option<A> {
        self.slot
    }

    /// Read a value whose tag was supplied out of band.
    pub fn read_with_tag(
        tag: u32,
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        let index = usize::try_from(tag).unwrap_or(usize::MAX);
        if index >= A::COUNT {
            log::warn!(
                "[Variant::read_with_tag] unknown discriminator {} ({} alternatives)",
                tag,
                A::COUNT
            );
        }
        A::read_alternative(index, stream, child_of(deployment, index)).map(Self::from)
    }

    fn mismatch<T>(found: Option<&'static str>) -> Error
    where
        A: Alternative<T>,
    {
        Error::TypeMismatch {
            expected: A::NAMES
                .get(<A as Alternative<T>>::INDEX)
                .copied()
                .unwrap_or("<unknown>"),
            found,
        }
    }
}

// ============================================================================
// Stream support
// ============================================================================

impl<A: Alternatives> WriteValue for Variant<A> {
    /// Tag, then the held value with the deployment child at its index.
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        let Some(alternative) = self.slot.as_ref() else {
            return Err(stream.raise(SerError::EmptyVariant));
        };
        let index = alternative.index();
        stream.begin_write_variant(index as u32, deployment)?;
        alternative.write_alternative(stream, child_of(deployment, index))?;
        stream.end_write_variant()
    }
}

impl<A: Alternatives> ReadValue for Variant<A> {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        let tag = stream.begin_read_variant(deployment)?;
        let value = Self::read_with_tag(tag, stream, deployment)?;
        stream.end_read_variant()?;
        Ok(value)
    }
}

impl<A: Alternatives> WriteType for Variant<A> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        stream.write_variant_type();
    }
}
