// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `variant!`: declares the alternative set of a [`Variant`](crate::Variant).

/// Declare an enum whose tuple variants are the alternatives of a Variant.
///
/// Generates [`Alternatives`](crate::variant::Alternatives) plus one
/// [`Alternative<T>`](crate::variant::Alternative) impl per alternative,
/// with indices assigned in declaration order starting at 0. Declaring
/// two alternatives of the same type fails to compile (conflicting
/// `Alternative<T>` impls).
///
/// Every alternative type must implement `WriteValue` and `ReadValue`.
///
/// ```rust
/// use commonapi::{variant, Variant};
///
/// variant! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Payload {
///         Flag(bool),
///         Count(u64),
///     }
/// }
///
/// let mut v: Variant<Payload> = Variant::new(true);
/// assert_eq!(v.value_type(), 0);
/// v.set(7_u64);
/// assert_eq!(v.value_type(), 1);
/// ```
///
/// ```compile_fail
/// commonapi::variant! {
///     pub enum Ambiguous {
///         First(u32),
///         Second(u32),
///     }
/// }
/// ```
#[macro_export]
macro_rules! variant {
    (@alts $name:ident, $idx:expr, $alt:ident($ty:ty) $(, $rest:ident($rest_ty:ty))*) => {
        impl $crate::variant::Alternative<$ty> for $name {
            const INDEX: usize = $idx;

            fn wrap(value: $ty) -> Self {
                $name::$alt(value)
            }

            fn peek(&self) -> ::core::option::Option<&$ty> {
                match self {
                    $name::$alt(value) => ::core::option::Option::Some(value),
                    #[allow(unreachable_patterns)]
                    _ => ::core::option::Option::None,
                }
            }

            fn peek_mut(&mut self) -> ::core::option::Option<&mut $ty> {
                match self {
                    $name::$alt(value) => ::core::option::Option::Some(value),
                    #[allow(unreachable_patterns)]
                    _ => ::core::option::Option::None,
                }
            }

            fn unwrap_into(self) -> ::core::result::Result<$ty, Self> {
                match self {
                    $name::$alt(value) => ::core::result::Result::Ok(value),
                    #[allow(unreachable_patterns)]
                    other => ::core::result::Result::Err(other),
                }
            }
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                $name::$alt(value)
            }
        }

        $crate::variant!(@alts $name, $idx + 1 $(, $rest($rest_ty))*);
    };
    (@alts $name:ident, $idx:expr) => {};
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$alt_meta:meta])* $alt:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$alt_meta])* $alt($ty), )+
        }

        impl $crate::variant::Alternatives for $name {
            const NAMES: &'static [&'static str] = &[$(::core::stringify!($ty)),+];

            fn index(&self) -> usize {
                match self {
                    $( $name::$alt(_) => <Self as $crate::variant::Alternative<$ty>>::INDEX, )+
                }
            }

            fn write_alternative(
                &self,
                stream: &mut dyn $crate::ser::OutputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<()> {
                match self {
                    $( $name::$alt(value) => $crate::ser::WriteValue::write_value(value, stream, deployment), )+
                }
            }

            fn read_alternative(
                index: usize,
                stream: &mut dyn $crate::ser::InputStream,
                deployment: ::core::option::Option<&$crate::ser::Deployment>,
            ) -> $crate::ser::SerResult<Self> {
                $(
                    if index == <Self as $crate::variant::Alternative<$ty>>::INDEX {
                        return <$ty as $crate::ser::ReadValue>::read_value(stream, deployment)
                            .map($name::$alt);
                    }
                )+
                ::core::result::Result::Err($crate::ser::InputStream::raise(
                    stream,
                    $crate::ser::SerError::UnknownDiscriminator {
                        discriminator: <u32 as ::core::convert::TryFrom<usize>>::try_from(index)
                            .unwrap_or(u32::MAX),
                    },
                ))
            }
        }

        $crate::variant!(@alts $name, 0usize $(, $alt($ty))+);
    };
}
