// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # CommonAPI core
//!
//! Value representation and change notification primitives shared by
//! generated proxy/stub code and transport bindings.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                 Generated proxies / stubs (external)                |
//! +---------------------------------------------------------------------+
//! |   variant        |   ser (stream protocol)     |   event            |
//! |   Variant<A>     |   OutputStream/InputStream  |   Event<T, H>      |
//! |   variant!       |   Deployment, registry      |   Subscription     |
//! +---------------------------------------------------------------------+
//! |                 Transport bindings (external)                       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use commonapi::{variant, Variant, Event};
//!
//! variant! {
//!     /// Alternatives carried by a status broadcast.
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub enum Status {
//!         Code(i32),
//!         Ratio(f64),
//!         Text(String),
//!     }
//! }
//!
//! let v: Variant<Status> = Variant::new(5_i32);
//! assert!(v.is_type::<i32>());
//! assert_eq!(*v.get::<i32>().unwrap(), 5);
//! assert!(v.get::<f64>().is_err());
//!
//! let event: Event<Variant<Status>> = Event::new();
//! let token = event.subscribe(|status| assert!(status.has_value()));
//! event.notify(&v);
//! assert!(event.unsubscribe(token));
//! ```
//!
//! ## Features
//!
//! - `config-loaders` (default): YAML loading for [`StreamLimits`].

pub mod config;
pub mod error;
pub mod event;
pub mod ser;
pub mod variant;

pub use config::StreamLimits;
pub use error::{Error, Result};
pub use event::{Event, EventHooks, NoHooks, Subscription, SubscriptionStatus};
pub use ser::{
    decode, encode, ByteBuffer, Deployable, Deployment, Hint, InputStream, MemoryInputStream,
    MemoryOutputStream, OutputStream, PolymorphicRegistry, PolymorphicStruct, RangedInteger,
    ReadValue, SerError, SerResult, Serial, SignatureWriter, TypeOutputStream, Version,
    WriteType, WriteValue,
};
pub use variant::{Alternative, Alternatives, Variant};
