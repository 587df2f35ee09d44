// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX payload model.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A GPX file read into memory, owned by exactly one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpxPayload {
    /// Display name of the file (e.g. "track.gpx")
    pub file_name: String,
    /// Raw file contents (base64 on the wire)
    #[serde(with = "base64_bytes")]
    pub raw_bytes: Vec<u8>,
}

impl GpxPayload {
    pub fn new(file_name: impl Into<String>, raw_bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            raw_bytes,
        }
    }

    /// Size of the file contents in bytes.
    pub fn len(&self) -> usize {
        self.raw_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_bytes.is_empty()
    }

    /// Hex SHA-256 of the file contents, for log correlation.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.raw_bytes))
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
