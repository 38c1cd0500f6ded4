// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value-side traits and the built-in serializable kinds.

use super::{child_of, Deployment, InputStream, OutputStream, SerError, SerResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

/// A value that can drive an [`OutputStream`].
pub trait WriteValue {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()>;
}

/// A value that can be rebuilt from an [`InputStream`].
pub trait ReadValue: Sized {
    fn read_value(stream: &mut dyn InputStream, deployment: Option<&Deployment>)
        -> SerResult<Self>;
}

// ============================================================================
// Scalars
// ============================================================================

macro_rules! impl_scalar_value {
    ($($type:ty => $write:ident, $read:ident;)+) => {
        $(
            impl WriteValue for $type {
                fn write_value(
                    &self,
                    stream: &mut dyn OutputStream,
                    deployment: Option<&Deployment>,
                ) -> SerResult<()> {
                    stream.$write(*self, deployment)
                }
            }

            impl ReadValue for $type {
                fn read_value(
                    stream: &mut dyn InputStream,
                    deployment: Option<&Deployment>,
                ) -> SerResult<Self> {
                    stream.$read(deployment)
                }
            }
        )+
    };
}

impl_scalar_value! {
    bool => write_bool, read_bool;
    i8 => write_i8, read_i8;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    u8 => write_u8, read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl WriteValue for str {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.write_string(self, deployment)
    }
}

impl WriteValue for String {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.write_string(self, deployment)
    }
}

impl ReadValue for String {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        stream.read_string(deployment)
    }
}

impl<T: WriteValue + ?Sized> WriteValue for &T {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        (**self).write_value(stream, deployment)
    }
}

impl<T: WriteValue + ?Sized> WriteValue for Box<T> {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        (**self).write_value(stream, deployment)
    }
}

impl<T: ReadValue> ReadValue for Box<T> {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        T::read_value(stream, deployment).map(Box::new)
    }
}

// ============================================================================
// Byte buffer
// ============================================================================

/// Opaque bytes, written as one length-prefixed run instead of a sequence
/// of `u8` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteBuffer(pub Vec<u8>);

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Deref for ByteBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for ByteBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl WriteValue for ByteBuffer {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.write_byte_buffer(&self.0, deployment)
    }
}

impl ReadValue for ByteBuffer {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        stream.read_byte_buffer(deployment).map(ByteBuffer)
    }
}

// ============================================================================
// Sequences and maps
// ============================================================================

impl<T: WriteValue> WriteValue for [T] {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.begin_write_sequence(self.len(), deployment)?;
        let element = child_of(deployment, 0);
        for item in self {
            item.write_value(stream, element)?;
        }
        stream.end_write_sequence()
    }
}

impl<T: WriteValue> WriteValue for Vec<T> {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        self.as_slice().write_value(stream, deployment)
    }
}

impl<T: ReadValue> ReadValue for Vec<T> {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        stream.begin_read_sequence(deployment)?;
        let element = child_of(deployment, 0);
        let mut items = Vec::new();
        while stream.has_more_sequence_elements() {
            items.push(T::read_value(stream, element)?);
        }
        stream.check()?;
        stream.end_read_sequence()?;
        Ok(items)
    }
}

fn write_map_entries<'a, K, V, I>(
    stream: &mut dyn OutputStream,
    len: usize,
    entries: I,
    deployment: Option<&Deployment>,
) -> SerResult<()>
where
    K: WriteValue + 'a,
    V: WriteValue + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    stream.begin_write_map(len, deployment)?;
    let (key_depl, value_depl) = (child_of(deployment, 0), child_of(deployment, 1));
    for (key, value) in entries {
        stream.begin_write_map_entry()?;
        key.write_value(stream, key_depl)?;
        value.write_value(stream, value_depl)?;
        stream.end_write_map_entry()?;
    }
    stream.end_write_map()
}

/// Drives the map-entry loop, handing each decoded pair to `insert`.
/// `insert` returns false when the key was already present.
fn read_map_entries<K, V>(
    stream: &mut dyn InputStream,
    deployment: Option<&Deployment>,
    mut insert: impl FnMut(K, V) -> bool,
) -> SerResult<()>
where
    K: ReadValue,
    V: ReadValue,
{
    stream.begin_read_map(deployment)?;
    let (key_depl, value_depl) = (child_of(deployment, 0), child_of(deployment, 1));
    while stream.has_more_map_entries() {
        stream.begin_read_map_entry()?;
        let key = K::read_value(stream, key_depl)?;
        let value = V::read_value(stream, value_depl)?;
        stream.end_read_map_entry()?;
        if !insert(key, value) {
            return Err(stream.raise(SerError::InvalidData {
                reason: "duplicate map key".into(),
            }));
        }
    }
    stream.check()?;
    stream.end_read_map()
}

impl<K: WriteValue, V: WriteValue, S> WriteValue for HashMap<K, V, S> {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        write_map_entries(stream, self.len(), self.iter(), deployment)
    }
}

impl<K, V> ReadValue for HashMap<K, V>
where
    K: ReadValue + Eq + Hash,
    V: ReadValue,
{
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        let mut map = HashMap::new();
        read_map_entries(stream, deployment, |k, v| map.insert(k, v).is_none())?;
        Ok(map)
    }
}

impl<K: WriteValue, V: WriteValue> WriteValue for BTreeMap<K, V> {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        write_map_entries(stream, self.len(), self.iter(), deployment)
    }
}

impl<K, V> ReadValue for BTreeMap<K, V>
where
    K: ReadValue + Ord,
    V: ReadValue,
{
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        let mut map = BTreeMap::new();
        read_map_entries(stream, deployment, |k, v| map.insert(k, v).is_none())?;
        Ok(map)
    }
}

// ============================================================================
// Tuples (anonymous structs)
// ============================================================================

macro_rules! impl_tuple_value {
    ($(($($idx:tt $name:ident),+))+) => {
        $(
            impl<$($name: WriteValue),+> WriteValue for ($($name,)+) {
                fn write_value(
                    &self,
                    stream: &mut dyn OutputStream,
                    deployment: Option<&Deployment>,
                ) -> SerResult<()> {
                    stream.begin_write_struct(deployment)?;
                    $( self.$idx.write_value(stream, child_of(deployment, $idx))?; )+
                    stream.end_write_struct()
                }
            }

            impl<$($name: ReadValue),+> ReadValue for ($($name,)+) {
                fn read_value(
                    stream: &mut dyn InputStream,
                    deployment: Option<&Deployment>,
                ) -> SerResult<Self> {
                    stream.begin_read_struct(deployment)?;
                    let value = ($($name::read_value(stream, child_of(deployment, $idx))?,)+);
                    stream.end_read_struct()?;
                    Ok(value)
                }
            }
        )+
    };
}

impl_tuple_value! {
    (0 A)
    (0 A, 1 B)
    (0 A, 1 B, 2 C)
    (0 A, 1 B, 2 C, 3 D)
    (0 A, 1 B, 2 C, 3 D, 4 E)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H)
}

// ============================================================================
// Interface version
// ============================================================================

crate::stream_struct! {
    /// Interface version carried by every generated interface.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Version {
        pub major: u32,
        pub minor: u32,
    }
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

// ============================================================================
// Ranged integer
// ============================================================================

/// An `i32` constrained to `MIN..=MAX`. Written as a plain `i32`; decoding
/// an out-of-range value latches [`SerError::InvalidData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangedInteger<const MIN: i32, const MAX: i32>(i32);

impl<const MIN: i32, const MAX: i32> RangedInteger<MIN, MAX> {
    pub fn new(value: i32) -> Option<Self> {
        Self::in_range(value).then_some(Self(value))
    }

    pub fn in_range(value: i32) -> bool {
        (MIN..=MAX).contains(&value)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn validate(&self) -> bool {
        Self::in_range(self.0)
    }
}

impl<const MIN: i32, const MAX: i32> Default for RangedInteger<MIN, MAX> {
    /// Zero when in range, otherwise the lower bound.
    fn default() -> Self {
        if Self::in_range(0) {
            Self(0)
        } else {
            Self(MIN)
        }
    }
}

impl<const MIN: i32, const MAX: i32> TryFrom<i32> for RangedInteger<MIN, MAX> {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        Self::new(value).ok_or(value)
    }
}

impl<const MIN: i32, const MAX: i32> WriteValue for RangedInteger<MIN, MAX> {
    fn write_value(
        &self,
        stream: &mut dyn OutputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<()> {
        stream.write_i32(self.0, deployment)
    }
}

impl<const MIN: i32, const MAX: i32> ReadValue for RangedInteger<MIN, MAX> {
    fn read_value(
        stream: &mut dyn InputStream,
        deployment: Option<&Deployment>,
    ) -> SerResult<Self> {
        let value = stream.read_i32(deployment)?;
        Self::new(value).ok_or_else(|| {
            stream.raise(SerError::InvalidData {
                reason: format!("{} outside {}..={}", value, MIN, MAX),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{decode, encode, MemoryInputStream};

    #[test]
    fn test_scalars_roundtrip() {
        let value = (true, -5_i8, 1000_i16, -70000_i32, i64::MIN, 0xFE_u8, 0xBEEF_u16);
        let bytes = encode(&value, None).expect("encode");
        assert_eq!(decode::<(bool, i8, i16, i32, i64, u8, u16)>(&bytes, None).expect("decode"), value);

        let value = (u32::MAX, u64::MAX, 1.5_f32, -2.25_f64);
        let bytes = encode(&value, None).expect("encode");
        assert_eq!(decode::<(u32, u64, f32, f64)>(&bytes, None).expect("decode"), value);
    }

    #[test]
    fn test_nested_containers_roundtrip() {
        let mut map: BTreeMap<String, Vec<ByteBuffer>> = BTreeMap::new();
        map.insert("a".into(), vec![ByteBuffer(vec![1, 2]), ByteBuffer::default()]);
        map.insert("b".into(), Vec::new());
        let bytes = encode(&map, None).expect("encode");
        assert_eq!(decode::<BTreeMap<String, Vec<ByteBuffer>>>(&bytes, None).expect("decode"), map);
    }

    #[test]
    fn test_hash_map_roundtrip() {
        let map: HashMap<u16, String> = [(1, "one".to_string()), (2, "two".to_string())]
            .into_iter()
            .collect();
        let bytes = encode(&map, None).expect("encode");
        assert_eq!(decode::<HashMap<u16, String>>(&bytes, None).expect("decode"), map);
    }

    #[test]
    fn test_duplicate_map_key_is_rejected() {
        // Same key twice, encoded through a sequence of pairs with the map layout.
        let pairs: Vec<(u32, u32)> = vec![(1, 10), (1, 11)];
        let mut out = crate::ser::MemoryOutputStream::new();
        out.begin_write_map(pairs.len(), None).expect("begin");
        for (k, v) in &pairs {
            k.write_value(&mut out, None).expect("key");
            v.write_value(&mut out, None).expect("value");
        }
        out.end_write_map().expect("end");
        let bytes = out.finish().expect("finish");

        let mut input = MemoryInputStream::new(&bytes);
        let err = BTreeMap::<u32, u32>::read_value(&mut input, None).unwrap_err();
        assert!(matches!(err, SerError::InvalidData { .. }));
        assert!(input.has_error());
    }

    #[test]
    fn test_version_display_and_order() {
        let v = Version::new(1, 2);
        assert_eq!(v.to_string(), "v1.2");
        assert!(Version::new(1, 0) < v);
        let bytes = encode(&v, None).expect("encode");
        assert_eq!(decode::<Version>(&bytes, None).expect("decode"), v);
    }

    #[test]
    fn test_ranged_integer_validation() {
        type Percent = RangedInteger<0, 100>;
        assert!(Percent::new(101).is_none());
        assert_eq!(Percent::new(42).map(Percent::get), Some(42));
        assert_eq!(Percent::default().get(), 0);
        assert_eq!(RangedInteger::<5, 9>::default().get(), 5);
        assert_eq!(Percent::try_from(-1), Err(-1));

        let bytes = encode(&200_i32, None).expect("encode");
        let mut input = MemoryInputStream::new(&bytes);
        assert!(matches!(
            Percent::read_value(&mut input, None),
            Err(SerError::InvalidData { .. })
        ));
        assert!(input.has_error());
    }
}
