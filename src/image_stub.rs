// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Image output is an external collaborator's job (spec §9: "out of scope").
//! `Log::raw_body_bytes`/`Log::class_name_of` give the collaborator what it
//! needs to decode a frame; `ImageSink` is the seam it plugs into. The
//! default implementation here writes the raw bytes unmodified so the CLI
//! runs end to end without an image codec dependency.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Receives raw message bodies the CLI believes are image payloads (by
/// class name) and decides what to do with them.
pub trait ImageSink {
    fn write(&mut self, class_name: &str, raw: &[u8], out_path: &Path) -> Result<()>;

    /// File extension used for the artifact this sink produces, without the
    /// leading dot.
    fn extension(&self) -> &str;
}

/// Writes the class's raw body bytes to disk unchanged. Stands in for a
/// YUYV/JPEG decoder a caller can swap in by implementing [`ImageSink`]
/// themselves.
pub struct PassthroughSink;

impl ImageSink for PassthroughSink {
    fn write(&mut self, _class_name: &str, raw: &[u8], out_path: &Path) -> Result<()> {
        fs::write(out_path, raw).map_err(|e| crate::error::LogError::io("writing image artifact", e))
    }

    fn extension(&self) -> &str {
        "bin"
    }
}

pub fn artifact_path(base: &Path, stem: &str, sink: &dyn ImageSink) -> PathBuf {
    base.join(format!("{stem}.{}", sink.extension()))
}
