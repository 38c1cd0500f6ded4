// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "config-loaders")]

//! Loading stream limits from YAML files.

use commonapi::config::DEFAULT_MAX_SEQUENCE_LENGTH;
use commonapi::{decode, encode, Error, StreamLimits};
use std::io::Write;

#[test]
fn test_load_limits_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "max_depth: 4\nmax_string_length: 8").expect("write yaml");

    let limits = StreamLimits::from_yaml_file(file.path()).expect("load");
    assert_eq!(limits.max_depth, 4);
    assert_eq!(limits.max_string_length, 8);
    assert_eq!(limits.max_sequence_length, DEFAULT_MAX_SEQUENCE_LENGTH);

    let bytes = encode("longer than eight", None).expect("encode");
    let err = commonapi::ser::decode_with_limits::<String>(&bytes, None, limits).unwrap_err();
    assert!(matches!(err, Error::SerializationError(_)));
    assert_eq!(decode::<String>(&bytes, None).expect("default limits"), "longer than eight");
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("limits.yaml");
    assert!(matches!(
        StreamLimits::from_yaml_file(&missing),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_zero_limit_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "max_depth: 0").expect("write yaml");
    assert!(matches!(
        StreamLimits::from_yaml_file(file.path()),
        Err(Error::Config(_))
    ));
}
