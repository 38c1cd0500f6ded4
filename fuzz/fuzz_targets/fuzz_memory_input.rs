// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use commonapi::ser::decode_with_limits;
use commonapi::{variant, ByteBuffer, StreamLimits, Variant, Version};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

variant! {
    pub enum Any {
        Flag(bool),
        Number(i64),
        Text(String),
        Bytes(ByteBuffer),
        List(Vec<u32>),
    }
}

type Document = (Version, Vec<BTreeMap<String, Variant<Any>>>);

fuzz_target!(|data: &[u8]| {
    let limits = StreamLimits::default()
        .with_max_sequence_length(4096)
        .with_max_string_length(4096);

    let _ = decode_with_limits::<Document>(data, None, limits);
    let _ = decode_with_limits::<Vec<Variant<Any>>>(data, None, limits);
});
