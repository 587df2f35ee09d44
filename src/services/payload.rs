// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reading a chosen GPX file into memory.
//!
//! Failures here abandon the upload before any connection is made.

use crate::error::{AppError, Result};
use crate::models::GpxPayload;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Fixed chunk size for payload reads.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Read `reader` to end of stream in fixed-size chunks.
pub fn read_chunked<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut buffer = [0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => data.extend_from_slice(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(AppError::PayloadRead(e.to_string())),
        }
    }

    Ok(data)
}

/// Display name of the file at `path` (its final path component).
pub fn resolve_display_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::NameResolution(path.display().to_string()))
}

/// Load the GPX file at `path` as an upload payload.
pub fn load_payload<P: AsRef<Path>>(path: P) -> Result<GpxPayload> {
    let path = path.as_ref();
    let file_name = resolve_display_name(path)?;

    let file = File::open(path)
        .map_err(|e| AppError::PayloadRead(format!("{}: {}", path.display(), e)))?;
    let raw_bytes = read_chunked(file)?;

    tracing::debug!(file_name = %file_name, bytes = raw_bytes.len(), "Read GPX payload");
    Ok(GpxPayload::new(file_name, raw_bytes))
}
