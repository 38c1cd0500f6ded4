// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic structs: composites whose concrete type is chosen at decode
//! time by a serial number.
//!
//! The [`PolymorphicRegistry`] is an ordinary value owned by whoever decodes
//! (typically one per generated interface). Nothing is process-global.
//!
//! # Performance
//!
//! - **Concurrent**: `DashMap` lookup, safe to share between decoding threads
//! - **O(1)**: register and create are constant time

use super::{Deployment, InputStream, OutputStream, SerError, SerResult};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies the concrete type of a polymorphic struct on the wire.
pub type Serial = u32;

/// Implemented by every concrete type of a polymorphic hierarchy. Make it a
/// supertrait of the hierarchy's base trait so that `dyn Base` can key a
/// [`PolymorphicRegistry`].
pub trait PolymorphicStruct {
    fn serial(&self) -> Serial;

    /// Write all fields, base fields first.
    fn write_fields(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;

    /// Fill a default-constructed instance from the stream.
    fn read_fields(
        &mut self,
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;
}

type Constructor<B> = Arc<dyn Fn() -> Box<B> + Send + Sync>;

/// Serial to constructor lookup for one polymorphic hierarchy `B`.
pub struct PolymorphicRegistry<B: ?Sized> {
    constructors: DashMap<Serial, Constructor<B>>,
}

impl<B: ?Sized> Default for PolymorphicRegistry<B> {
    fn default() -> Self {
        Self {
            constructors: DashMap::new(),
        }
    }
}

impl<B: ?Sized> fmt::Debug for PolymorphicRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serials: Vec<Serial> = self.constructors.iter().map(|e| *e.key()).collect();
        serials.sort_unstable();
        f.debug_struct("PolymorphicRegistry")
            .field("serials", &serials)
            .finish()
    }
}

impl<B: ?Sized + PolymorphicStruct> PolymorphicRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `serial`, replacing any previous entry.
    /// Returns true if an entry was replaced.
    pub fn register<F>(&self, serial: Serial, constructor: F) -> bool
    where
        F: Fn() -> Box<B> + Send + Sync + 'static,
    {
        let replaced = self
            .constructors
            .insert(serial, Arc::new(constructor))
            .is_some();
        log::debug!(
            "[PolymorphicRegistry::register] serial={} replaced={}",
            serial,
            replaced
        );
        replaced
    }

    pub fn unregister(&self, serial: Serial) -> bool {
        self.constructors.remove(&serial).is_some()
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.constructors.contains_key(&serial)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Default-construct the type registered for `serial`.
    pub fn create(&self, serial: Serial) -> Option<Box<B>> {
        // Clone the Arc so the shard lock is not held while constructing.
        let constructor = self.constructors.get(&serial).map(|c| Arc::clone(c.value()))?;
        Some(constructor())
    }

    /// Write the serial, then the fields of `value`.
    pub fn write(
        value: &B,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.begin_write_polymorphic_struct(value.serial(), deployment)?;
        value.write_fields(stream, deployment)?;
        stream.end_write_polymorphic_struct()
    }

    /// Read a serial, construct the registered type and fill it.
    ///
    /// An unregistered serial latches [`SerError::UnknownDiscriminator`].
    pub fn read(
        &self,
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Box<B>> {
        let serial = stream.begin_read_polymorphic_struct(deployment)?;
        let Some(mut instance) = self.create(serial) else {
            log::warn!("[PolymorphicRegistry::read] unknown serial {}", serial);
            return Err(stream.raise(SerError::UnknownDiscriminator {
                discriminator: serial,
            }));
        };
        instance.read_fields(stream, deployment)?;
        stream.end_read_polymorphic_struct()?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{MemoryInputStream, MemoryOutputStream, ReadValue, WriteValue};

    trait Shape: PolymorphicStruct + Send + Sync {
        fn area(&self) -> f64;
    }

    #[derive(Default)]
    struct Square {
        side: f64,
    }

    #[derive(Default)]
    struct Rect {
        width: f64,
        height: f64,
    }

    impl PolymorphicStruct for Square {
        fn serial(&self) -> Serial {
            1
        }
        fn write_fields(&self, s: &mut dyn OutputStream, _: Option<&Deployment>) -> SerResult<()> {
            self.side.write_value(s, None)
        }
        fn read_fields(&mut self, s: &mut dyn InputStream, _: Option<&Deployment>) -> SerResult<()> {
            self.side = f64::read_value(s, None)?;
            Ok(())
        }
    }

    impl PolymorphicStruct for Rect {
        fn serial(&self) -> Serial {
            2
        }
        fn write_fields(&self, s: &mut dyn OutputStream, _: Option<&Deployment>) -> SerResult<()> {
            self.width.write_value(s, None)?;
            self.height.write_value(s, None)
        }
        fn read_fields(&mut self, s: &mut dyn InputStream, _: Option<&Deployment>) -> SerResult<()> {
            self.width = f64::read_value(s, None)?;
            self.height = f64::read_value(s, None)?;
            Ok(())
        }
    }

    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    impl Shape for Rect {
        fn area(&self) -> f64 {
            self.width * self.height
        }
    }

    fn registry() -> PolymorphicRegistry<dyn Shape> {
        let registry = PolymorphicRegistry::<dyn Shape>::new();
        registry.register(1, || Box::new(Square::default()) as Box<dyn Shape>);
        registry.register(2, || Box::new(Rect::default()) as Box<dyn Shape>);
        registry
    }

    #[test]
    fn test_roundtrip_through_registry() {
        let registry = registry();
        let shapes: Vec<Box<dyn Shape>> = vec![
            Box::new(Rect {
                width: 2.0,
                height: 3.0,
            }),
            Box::new(Square { side: 4.0 }),
        ];

        let mut out = MemoryOutputStream::new();
        for shape in &shapes {
            PolymorphicRegistry::write(shape.as_ref(), &mut out, None).expect("write");
        }
        let bytes = out.finish().expect("finish");

        let mut input = MemoryInputStream::new(&bytes);
        let first = registry.read(&mut input, None).expect("first");
        let second = registry.read(&mut input, None).expect("second");
        input.finish().expect("consumed");
        assert_eq!(first.serial(), 2);
        assert_eq!(first.area(), 6.0);
        assert_eq!(second.area(), 16.0);
    }

    #[test]
    fn test_unknown_serial_latches() {
        let registry = registry();
        assert!(registry.unregister(2));
        assert!(!registry.contains(2));

        let mut out = MemoryOutputStream::new();
        let rect: Box<dyn Shape> = Box::new(Rect::default());
        PolymorphicRegistry::write(rect.as_ref(), &mut out, None).expect("write");
        let bytes = out.finish().expect("finish");

        let mut input = MemoryInputStream::new(&bytes);
        let err = registry.read(&mut input, None).err();
        assert_eq!(err, Some(SerError::UnknownDiscriminator { discriminator: 2 }));
        assert!(input.has_error());
    }

    #[test]
    fn test_register_replaces() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.register(1, || Box::new(Rect::default()) as Box<dyn Shape>));
        assert_eq!(registry.create(1).map(|s| s.serial()), Some(2));
        assert!(registry.create(9).is_none());
    }
}
