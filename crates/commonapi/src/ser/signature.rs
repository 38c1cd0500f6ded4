// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for bindings that announce signatures on the wire.

use super::{ByteBuffer, RangedInteger};
use std::collections::{BTreeMap, HashMap};

/// Receives a type description, one call per scalar kind plus begin/end
/// pairs for containers.
pub trait TypeOutputStream {
    fn write_bool_type(&mut self);
    fn write_i8_type(&mut self);
    fn write_i16_type(&mut self);
    fn write_i32_type(&mut self);
    fn write_i64_type(&mut self);
    fn write_u8_type(&mut self);
    fn write_u16_type(&mut self);
    fn write_u32_type(&mut self);
    fn write_u64_type(&mut self);
    fn write_f32_type(&mut self);
    fn write_f64_type(&mut self);
    fn write_string_type(&mut self);
    fn write_byte_buffer_type(&mut self);
    /// Variants carry their own type at runtime.
    fn write_variant_type(&mut self);

    fn begin_write_sequence_type(&mut self);
    fn end_write_sequence_type(&mut self);
    fn begin_write_map_type(&mut self);
    fn end_write_map_type(&mut self);
    fn begin_write_struct_type(&mut self);
    fn end_write_struct_type(&mut self);
}

/// A type that can describe itself to a [`TypeOutputStream`].
pub trait WriteType {
    fn write_type(stream: &mut dyn TypeOutputStream);
}

/// Renders D-Bus style signatures: `b y n q i u x t d s`, `ay` for byte
/// buffers, `a<elem>` for sequences, `a{<key><value>}` for maps, `(...)`
/// for structs and `(yv)` for variants.
#[derive(Debug, Default, Clone)]
pub struct SignatureWriter {
    signature: String,
}

impl SignatureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn into_signature(self) -> String {
        self.signature
    }

    /// Signature of `T`.
    pub fn of<T: WriteType + ?Sized>() -> String {
        let mut writer = Self::new();
        T::write_type(&mut writer);
        writer.signature
    }
}

impl TypeOutputStream for SignatureWriter {
    fn write_bool_type(&mut self) {
        self.signature.push('b');
    }
    fn write_i8_type(&mut self) {
        self.signature.push('y');
    }
    fn write_i16_type(&mut self) {
        self.signature.push('n');
    }
    fn write_i32_type(&mut self) {
        self.signature.push('i');
    }
    fn write_i64_type(&mut self) {
        self.signature.push('x');
    }
    fn write_u8_type(&mut self) {
        self.signature.push('y');
    }
    fn write_u16_type(&mut self) {
        self.signature.push('q');
    }
    fn write_u32_type(&mut self) {
        self.signature.push('u');
    }
    fn write_u64_type(&mut self) {
        self.signature.push('t');
    }
    // No single-precision type in the alphabet.
    fn write_f32_type(&mut self) {
        self.signature.push('d');
    }
    fn write_f64_type(&mut self) {
        self.signature.push('d');
    }
    fn write_string_type(&mut self) {
        self.signature.push('s');
    }
    fn write_byte_buffer_type(&mut self) {
        self.signature.push_str("ay");
    }
    fn write_variant_type(&mut self) {
        self.signature.push_str("(yv)");
    }

    fn begin_write_sequence_type(&mut self) {
        self.signature.push('a');
    }
    fn end_write_sequence_type(&mut self) {}

    fn begin_write_map_type(&mut self) {
        self.signature.push_str("a{");
    }
    fn end_write_map_type(&mut self) {
        self.signature.push('}');
    }

    fn begin_write_struct_type(&mut self) {
        self.signature.push('(');
    }
    fn end_write_struct_type(&mut self) {
        self.signature.push(')');
    }
}

macro_rules! impl_scalar_type {
    ($($type:ty => $method:ident),+ $(,)?) => {
        $(
            impl WriteType for $type {
                fn write_type(stream: &mut dyn TypeOutputStream) {
                    stream.$method();
                }
            }
        )+
    };
}

impl_scalar_type! {
    bool => write_bool_type,
    i8 => write_i8_type,
    i16 => write_i16_type,
    i32 => write_i32_type,
    i64 => write_i64_type,
    u8 => write_u8_type,
    u16 => write_u16_type,
    u32 => write_u32_type,
    u64 => write_u64_type,
    f32 => write_f32_type,
    f64 => write_f64_type,
    str => write_string_type,
    String => write_string_type,
    ByteBuffer => write_byte_buffer_type,
}

impl<const MIN: i32, const MAX: i32> WriteType for RangedInteger<MIN, MAX> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        stream.write_i32_type();
    }
}

impl<T: WriteType + ?Sized> WriteType for Box<T> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        T::write_type(stream);
    }
}

impl<T: WriteType> WriteType for [T] {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        stream.begin_write_sequence_type();
        T::write_type(stream);
        stream.end_write_sequence_type();
    }
}

impl<T: WriteType> WriteType for Vec<T> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        <[T]>::write_type(stream);
    }
}

fn write_map_type<K: WriteType, V: WriteType>(stream: &mut dyn TypeOutputStream) {
    stream.begin_write_map_type();
    K::write_type(stream);
    V::write_type(stream);
    stream.end_write_map_type();
}

impl<K: WriteType, V: WriteType, S> WriteType for HashMap<K, V, S> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        write_map_type::<K, V>(stream);
    }
}

impl<K: WriteType, V: WriteType> WriteType for BTreeMap<K, V> {
    fn write_type(stream: &mut dyn TypeOutputStream) {
        write_map_type::<K, V>(stream);
    }
}

macro_rules! impl_tuple_type {
    ($(($($name:ident),+))+) => {
        $(
            impl<$($name: WriteType),+> WriteType for ($($name,)+) {
                fn write_type(stream: &mut dyn TypeOutputStream) {
                    stream.begin_write_struct_type();
                    $( $name::write_type(stream); )+
                    stream.end_write_struct_type();
                }
            }
        )+
    };
}

impl_tuple_type! {
    (A)
    (A, B)
    (A, B, C)
    (A, B, C, D)
    (A, B, C, D, E)
    (A, B, C, D, E, F)
    (A, B, C, D, E, F, G)
    (A, B, C, D, E, F, G, H)
}
