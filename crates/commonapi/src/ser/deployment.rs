// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-value binding hints threaded through (de)serialization.
//!
//! A [`Deployment`] never becomes part of the value. Composite values hand
//! child `i` to their `i`-th member: struct fields and tuple items by
//! position, sequence elements use child 0, maps use child 0 for keys and
//! child 1 for values, and Variants use the child at the alternative index.
//! A missing hint or child means "default representation".

use super::{InputStream, OutputStream, ReadValue, SerResult, WriteValue};
use std::collections::BTreeMap;

/// Width in bytes (1, 2 or 4) of length prefixes written by the memory streams.
pub const LENGTH_WIDTH_HINT: &str = "length_width";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployment {
    hints: BTreeMap<String, Hint>,
    children: Vec<Option<Deployment>>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hint(mut self, name: impl Into<String>, hint: Hint) -> Self {
        self.hints.insert(name.into(), hint);
        self
    }

    /// Attach the deployment of member `index`, leaving earlier slots unset.
    pub fn with_child(mut self, index: usize, child: Deployment) -> Self {
        if self.children.len() <= index {
            self.children.resize(index + 1, None);
        }
        self.children[index] = Some(child);
        self
    }

    pub fn hint(&self, name: &str) -> Option<&Hint> {
        self.hints.get(name)
    }

    pub fn int_hint(&self, name: &str) -> Option<i64> {
        match self.hints.get(name) {
            Some(Hint::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn bool_hint(&self, name: &str) -> Option<bool> {
        match self.hints.get(name) {
            Some(Hint::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text_hint(&self, name: &str) -> Option<&str> {
        match self.hints.get(name) {
            Some(Hint::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Deployment> {
        self.children.get(index).and_then(Option::as_ref)
    }
}

/// Child `index` of an optional deployment.
pub fn child_of(deployment: Option<&Deployment>, index: usize) -> Option<&Deployment> {
    deployment.and_then(|d| d.child(index))
}

/// A value paired with the deployment used for one write or read.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployable<'d, T> {
    pub value: T,
    pub deployment: &'d Deployment,
}

impl<'d, T> Deployable<'d, T> {
    pub fn new(value: T, deployment: &'d Deployment) -> Self {
        Self { value, deployment }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Read a `T` using `deployment`.
    pub fn read_from(stream: &mut dyn InputStream, deployment: &'d Deployment) -> SerResult<Self>
    where
        T: ReadValue,
    {
        let value = T::read_value(stream, Some(deployment))?;
        Ok(Self { value, deployment })
    }
}

impl<T: WriteValue> WriteValue for Deployable<'_, T> {
    /// The attached deployment always wins over the one passed in.
    fn write_value(&self, stream: &mut dyn OutputStream, _: Option<&Deployment>) -> SerResult<()> {
        self.value.write_value(stream, Some(self.deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_lookup_is_typed() {
        let depl = Deployment::new()
            .with_hint(LENGTH_WIDTH_HINT, Hint::Int(2))
            .with_hint("object_path", Hint::Bool(true))
            .with_hint("name", Hint::Text("x".into()));
        assert_eq!(depl.int_hint(LENGTH_WIDTH_HINT), Some(2));
        assert_eq!(depl.bool_hint("object_path"), Some(true));
        assert_eq!(depl.text_hint("name"), Some("x"));
        assert_eq!(depl.int_hint("object_path"), None);
        assert_eq!(depl.hint("missing"), None);
    }

    #[test]
    fn test_sparse_children() {
        let field = Deployment::new().with_hint(LENGTH_WIDTH_HINT, Hint::Int(1));
        let depl = Deployment::new().with_child(2, field.clone());
        assert!(depl.child(0).is_none());
        assert!(depl.child(1).is_none());
        assert_eq!(depl.child(2), Some(&field));
        assert!(depl.child(3).is_none());
        assert_eq!(child_of(Some(&depl), 2), Some(&field));
        assert!(child_of(None, 2).is_none());
    }
}
