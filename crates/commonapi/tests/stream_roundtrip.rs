// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::float_cmp)] // Test assertions with constants

//! Encode/decode round trips through the reference memory streams.

use commonapi::ser::{
    decode_with_limits, Deployable, Deployment, Hint, InputStream, OutputStream, SerError,
    LENGTH_WIDTH_HINT,
};
use commonapi::{
    decode, encode, stream_enum, stream_struct, variant, ByteBuffer, Error, MemoryInputStream,
    MemoryOutputStream, PolymorphicRegistry, PolymorphicStruct, ReadValue, SerResult, Serial,
    SignatureWriter, StreamLimits, Variant, Version, WriteValue,
};
use std::collections::{BTreeMap, HashMap};

stream_enum! {
    pub enum Availability: u8 {
        Unknown = 0,
        Available = 1,
        NotAvailable = 2,
    }
}

variant! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Setting {
        Flag(bool),
        Level(i64),
        Label(String),
        Blob(ByteBuffer),
    }
}

stream_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Service {
        pub name: String,
        pub version: Version,
        pub state: Availability,
        pub ports: Vec<u16>,
        pub settings: BTreeMap<String, Variant<Setting>>,
    }
}

stream_struct! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Registry {
        pub services: Vec<Service>,
        pub aliases: HashMap<String, String>,
        pub checksum: u64,
    }
}

fn random_string(rng: &mut fastrand::Rng) -> String {
    let len = rng.usize(0..24);
    (0..len).map(|_| rng.alphanumeric()).collect()
}

fn random_setting(rng: &mut fastrand::Rng) -> Variant<Setting> {
    match rng.u8(0..4) {
        0 => Variant::new(rng.bool()),
        1 => Variant::new(rng.i64(..)),
        2 => Variant::new(random_string(rng)),
        _ => {
            let len = rng.usize(0..64);
            Variant::new(ByteBuffer((0..len).map(|_| rng.u8(..)).collect()))
        }
    }
}

fn random_service(rng: &mut fastrand::Rng) -> Service {
    Service {
        name: random_string(rng),
        version: Version::new(rng.u32(..), rng.u32(..)),
        state: Availability::VALUES[rng.usize(0..Availability::VALUES.len())],
        ports: (0..rng.usize(0..8)).map(|_| rng.u16(..)).collect(),
        settings: (0..rng.usize(0..6))
            .map(|_| (random_string(rng), random_setting(rng)))
            .collect(),
    }
}

fn random_registry(rng: &mut fastrand::Rng) -> Registry {
    Registry {
        services: (0..rng.usize(0..5)).map(|_| random_service(rng)).collect(),
        aliases: (0..rng.usize(0..5))
            .map(|_| (random_string(rng), random_string(rng)))
            .collect(),
        checksum: rng.u64(..),
    }
}

#[test]
fn test_random_registries_roundtrip() {
    let mut rng = fastrand::Rng::with_seed(0x00C0_FFEE);
    for _ in 0..200 {
        let registry = random_registry(&mut rng);
        let bytes = encode(&registry, None).expect("encode");
        let back: Registry = decode(&bytes, None).expect("decode");
        assert_eq!(back, registry);
    }
}

#[test]
fn test_every_truncation_fails_cleanly() {
    let mut rng = fastrand::Rng::with_seed(7);
    let registry = Registry {
        services: vec![random_service(&mut rng), random_service(&mut rng)],
        ..Registry::default()
    };
    let bytes = encode(&registry, None).expect("encode");
    for cut in 0..bytes.len() {
        assert!(
            decode::<Registry>(&bytes[..cut], None).is_err(),
            "prefix of {} bytes decoded",
            cut
        );
    }
}

#[test]
fn test_random_garbage_never_panics() {
    let mut rng = fastrand::Rng::with_seed(42);
    let limits = StreamLimits::default()
        .with_max_sequence_length(256)
        .with_max_string_length(256);
    for _ in 0..500 {
        let len = rng.usize(0..128);
        let bytes: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
        let _ = decode_with_limits::<Registry>(&bytes, None, limits);
    }
}

#[test]
fn test_struct_deployment_reaches_nested_fields() {
    let narrow = Deployment::new().with_hint(LENGTH_WIDTH_HINT, Hint::Int(1));
    // Service field 3 is `ports`.
    let service = Deployment::new().with_child(3, narrow.clone());
    let depl = Deployment::new().with_child(0, Deployment::new().with_child(0, service));

    let mut rng = fastrand::Rng::with_seed(3);
    let registry = Registry {
        services: vec![random_service(&mut rng)],
        ..Registry::default()
    };
    let with = encode(&registry, Some(&depl)).expect("encode");
    let without = encode(&registry, None).expect("encode");
    assert_ne!(with, without);
    assert_eq!(decode::<Registry>(&with, Some(&depl)).expect("decode"), registry);
    // Reading with a different deployment than the writer used is not a round trip.
    assert_ne!(decode::<Registry>(&with, None).ok(), Some(registry));
}

#[test]
fn test_deployable_wrapper() {
    let depl = Deployment::new().with_hint(LENGTH_WIDTH_HINT, Hint::Int(2));
    let value = Deployable::new(vec![1_i8, -1], &depl);
    let bytes = encode(&value, None).expect("encode");
    assert_eq!(bytes, vec![2, 0, 1, 0xFF]);

    let mut input = MemoryInputStream::new(&bytes);
    let back = Deployable::<Vec<i8>>::read_from(&mut input, &depl).expect("read");
    assert_eq!(back.into_value(), vec![1, -1]);
}

#[test]
fn test_unknown_enum_value_maps_to_serialization_error() {
    let bytes = encode(&9_u8, None).expect("encode");
    let err = decode::<Availability>(&bytes, None).unwrap_err();
    assert_eq!(
        err,
        Error::SerializationError(SerError::InvalidEnumValue { value: 9 })
    );
}

#[test]
fn test_signatures() {
    assert_eq!(SignatureWriter::of::<Version>(), "(uu)");
    assert_eq!(SignatureWriter::of::<Service>(), "(s(uu)yaqa{s(yv)})");
    assert_eq!(SignatureWriter::of::<Registry>(), "(a(s(uu)yaqa{s(yv)})a{ss}t)");
}

// Polymorphic hierarchy declared the way generated code declares it.

trait Event: PolymorphicStruct + Send + Sync {
    fn describe(&self) -> String;
}

#[derive(Default)]
struct Started {
    at: u64,
}

#[derive(Default)]
struct Stopped {
    at: u64,
    reason: String,
}

impl PolymorphicStruct for Started {
    fn serial(&self) -> Serial {
        10
    }
    fn write_fields(&self, s: &mut dyn OutputStream, d: Option<&Deployment>) -> SerResult<()> {
        s.begin_write_struct(d)?;
        self.at.write_value(s, None)?;
        s.end_write_struct()
    }
    fn read_fields(&mut self, s: &mut dyn InputStream, d: Option<&Deployment>) -> SerResult<()> {
        s.begin_read_struct(d)?;
        self.at = u64::read_value(s, None)?;
        s.end_read_struct()
    }
}

impl PolymorphicStruct for Stopped {
    fn serial(&self) -> Serial {
        11
    }
    fn write_fields(&self, s: &mut dyn OutputStream, d: Option<&Deployment>) -> SerResult<()> {
        (self.at, self.reason.as_str()).write_value(s, d)
    }
    fn read_fields(&mut self, s: &mut dyn InputStream, d: Option<&Deployment>) -> SerResult<()> {
        let (at, reason) = <(u64, String)>::read_value(s, d)?;
        self.at = at;
        self.reason = reason;
        Ok(())
    }
}

impl Event for Started {
    fn describe(&self) -> String {
        format!("started@{}", self.at)
    }
}

impl Event for Stopped {
    fn describe(&self) -> String {
        format!("stopped@{}: {}", self.at, self.reason)
    }
}

#[test]
fn test_polymorphic_sequence() {
    let registry: PolymorphicRegistry<dyn Event> = PolymorphicRegistry::new();
    registry.register(10, || Box::new(Started::default()) as Box<dyn Event>);
    registry.register(11, || Box::new(Stopped::default()) as Box<dyn Event>);

    let events: Vec<Box<dyn Event>> = vec![
        Box::new(Started { at: 1 }),
        Box::new(Stopped {
            at: 2,
            reason: "shutdown".into(),
        }),
        Box::new(Started { at: 3 }),
    ];

    let mut out = MemoryOutputStream::new();
    out.begin_write_sequence(events.len(), None).expect("begin");
    for event in &events {
        PolymorphicRegistry::write(event.as_ref(), &mut out, None).expect("write");
    }
    out.end_write_sequence().expect("end");
    let bytes = out.finish().expect("finish");

    let mut input = MemoryInputStream::new(&bytes);
    input.begin_read_sequence(None).expect("begin");
    let mut decoded = Vec::new();
    while input.has_more_sequence_elements() {
        decoded.push(registry.read(&mut input, None).expect("read"));
    }
    input.end_read_sequence().expect("end");
    input.finish().expect("finish");

    let described: Vec<String> = decoded.iter().map(|e| e.describe()).collect();
    assert_eq!(
        described,
        vec!["started@1", "stopped@2: shutdown", "started@3"]
    );

    // Decoding with a registry that lacks serial 11 stops at the second element.
    assert!(registry.unregister(11));
    let mut input = MemoryInputStream::new(&bytes);
    input.begin_read_sequence(None).expect("begin");
    assert!(input.has_more_sequence_elements());
    registry.read(&mut input, None).expect("first");
    assert!(input.has_more_sequence_elements());
    let err = registry.read(&mut input, None).err();
    assert_eq!(err, Some(SerError::UnknownDiscriminator { discriminator: 11 }));
    assert!(!input.has_more_sequence_elements());
    assert_eq!(
        Error::from(input.error().cloned().expect("latched")),
        Error::UnknownDiscriminator(11)
    );
}
