// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative helpers for generated structs and enumerations.
//!
//! ```rust
//! use commonapi::{stream_enum, stream_struct};
//!
//! stream_enum! {
//!     pub enum Mode: u8 {
//!         Off = 0,
//!         Eco = 1,
//!         Boost = 7,
//!     }
//! }
//!
//! stream_struct! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Setting {
//!         pub name: String,
//!         pub mode: Mode,
//!     }
//! }
//!
//! let setting = Setting { name: "fan".into(), mode: Mode::Boost };
//! let bytes = commonapi::encode(&setting, None).unwrap();
//! assert_eq!(commonapi::decode::<Setting>(&bytes, None).unwrap(), setting);
//! ```

/// Declare a struct whose fields are written in declaration order between
/// `begin_write_struct` / `end_write_struct`. Field `i` receives child `i`
/// of the struct's deployment.
///
/// Every field type must implement `WriteValue`, `ReadValue` and
/// `WriteType`; the struct gets all three.
#[macro_export]
macro_rules! stream_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::ser::WriteValue for $name {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn write_value(
                &self,
                stream: &mut dyn $crate::ser::OutputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<()> {
                $crate::ser::OutputStream::begin_write_struct(stream, deployment)?;
                let mut index = 0usize;
                $(
                    $crate::ser::WriteValue::write_value(
                        &self.$field,
                        stream,
                        $crate::ser::child_of(deployment, index),
                    )?;
                    index += 1;
                )*
                $crate::ser::OutputStream::end_write_struct(stream)
            }
        }

        impl $crate::ser::ReadValue for $name {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn read_value(
                stream: &mut dyn $crate::ser::InputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<Self> {
                $crate::ser::InputStream::begin_read_struct(stream, deployment)?;
                let mut index = 0usize;
                $(
                    let $field = <$ty as $crate::ser::ReadValue>::read_value(
                        stream,
                        $crate::ser::child_of(deployment, index),
                    )?;
                    index += 1;
                )*
                $crate::ser::InputStream::end_read_struct(stream)?;
                ::core::result::Result::Ok(Self { $($field),* })
            }
        }

        impl $crate::ser::WriteType for $name {
            fn write_type(stream: &mut dyn $crate::ser::TypeOutputStream) {
                $crate::ser::TypeOutputStream::begin_write_struct_type(stream);
                $( <$ty as $crate::ser::WriteType>::write_type(stream); )*
                $crate::ser::TypeOutputStream::end_write_struct_type(stream);
            }
        }
    };
}

/// Declare an enumeration backed by an integer type. The first enumerator
/// is the default. Decoding a value that matches no enumerator latches
/// `SerError::InvalidEnumValue`.
///
/// `Debug, Clone, Copy, PartialEq, Eq, Hash` are derived by the macro.
#[macro_export]
macro_rules! stream_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $base:ident {
            $(#[$first_meta:meta])* $first:ident = $first_value:expr
            $(, $(#[$vmeta:meta])* $variant:ident = $value:expr)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($base)]
        $vis enum $name {
            $(#[$first_meta])* $first = $first_value,
            $( $(#[$vmeta])* $variant = $value, )*
        }

        impl $name {
            /// All enumerators in declaration order.
            pub const VALUES: &'static [$name] = &[$name::$first $(, $name::$variant)*];

            pub const fn value(self) -> $base {
                self as $base
            }

            pub fn from_value(value: $base) -> ::core::option::Option<Self> {
                Self::VALUES.iter().copied().find(|e| e.value() == value)
            }
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl $crate::ser::WriteValue for $name {
            fn write_value(
                &self,
                stream: &mut dyn $crate::ser::OutputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<()> {
                <$base as $crate::ser::WriteValue>::write_value(&self.value(), stream, deployment)
            }
        }

        impl $crate::ser::ReadValue for $name {
            fn read_value(
                stream: &mut dyn $crate::ser::InputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<Self> {
                let raw = <$base as $crate::ser::ReadValue>::read_value(stream, deployment)?;
                match Self::from_value(raw) {
                    ::core::option::Option::Some(value) => ::core::result::Result::Ok(value),
                    ::core::option::Option::None => ::core::result::Result::Err(
                        $crate::ser::InputStream::raise(
                            stream,
                            $crate::ser::SerError::InvalidEnumValue { value: raw as i128 },
                        ),
                    ),
                }
            }
        }

        impl $crate::ser::WriteType for $name {
            fn write_type(stream: &mut dyn $crate::ser::TypeOutputStream) {
                <$base as $crate::ser::WriteType>::write_type(stream);
            }
        }
    };
}
