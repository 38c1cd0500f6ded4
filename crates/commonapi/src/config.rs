// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream configuration: compile-time defaults and decode limits.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: constants below, used when nothing else is given
//! - **Level 2 (Dynamic)**: [`StreamLimits`], built in code or loaded from YAML
//!   (feature `config-loaders`)
//!
//! # Example YAML
//!
//! ```yaml
//! max_depth: 32
//! max_string_length: 65536
//! # max_sequence_length omitted: default applies
//! ```

use crate::error::{Error, Result};

// =======================================================================
// Stream defaults
// =======================================================================

/// Maximum container nesting accepted while decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum string or byte buffer length in bytes (16 MiB).
pub const DEFAULT_MAX_STRING_LENGTH: usize = 16 * 1024 * 1024;

/// Maximum element count of a sequence or map.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 1024 * 1024;

/// Width in bytes of length prefixes when no deployment overrides it.
pub const DEFAULT_LENGTH_WIDTH: usize = 4;

/// Alignment applied at the start of every struct by the memory streams.
pub const STRUCT_ALIGNMENT: usize = 8;

/// Limits enforced by the memory streams. Input streams reject corrupted
/// input requesting unbounded recursion or allocation; output streams
/// reject values that could not be decoded back under the same limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct StreamLimits {
    pub max_depth: usize,
    pub max_string_length: usize,
    pub max_sequence_length: usize,
}

impl Default for StreamLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
        }
    }
}

impl StreamLimits {
    /// Builder-style override of the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_string_length(mut self, len: usize) -> Self {
        self.max_string_length = len;
        self
    }

    pub fn with_max_sequence_length(mut self, len: usize) -> Self {
        self.max_sequence_length = len;
        self
    }

    /// Reject limits that would make every decode fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be > 0".into()));
        }
        if self.max_string_length == 0 {
            return Err(Error::Config("max_string_length must be > 0".into()));
        }
        if self.max_sequence_length == 0 {
            return Err(Error::Config("max_sequence_length must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(feature = "config-loaders")]
impl StreamLimits {
    /// Parse limits from a YAML document. Missing keys keep their default.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let limits: StreamLimits = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))?;
        limits.validate()?;
        log::debug!("[StreamLimits::from_yaml_str] loaded {:?}", limits);
        Ok(limits)
    }

    /// Load limits from a YAML file.
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }
}
