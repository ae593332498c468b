// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk magic-byte dispatch (spec §4.D): named op-code consts, one
//! parser per record kind, and a sniff pass over the leading bytes to
//! pick which parser applies.

pub mod indices;
pub mod message_ids;
pub mod settings;
pub mod type_info;

use crate::error::{LogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    UncompressedContent,
    CompressedContent,
    MessageIds,
    TypeInfo,
    Settings,
    Indices,
}

impl ChunkKind {
    pub fn from_magic(byte: u8) -> Option<ChunkKind> {
        match byte {
            0 => Some(ChunkKind::UncompressedContent),
            1 => Some(ChunkKind::CompressedContent),
            2 => Some(ChunkKind::MessageIds),
            3 => Some(ChunkKind::TypeInfo),
            4 => Some(ChunkKind::Settings),
            5 => Some(ChunkKind::Indices),
            _ => None,
        }
    }

    pub fn magic(self) -> u8 {
        match self {
            ChunkKind::UncompressedContent => 0,
            ChunkKind::CompressedContent => 1,
            ChunkKind::MessageIds => 2,
            ChunkKind::TypeInfo => 3,
            ChunkKind::Settings => 4,
            ChunkKind::Indices => 5,
        }
    }
}

/// Reads the next chunk's magic byte at `offset`, without consuming it.
/// Returns `BadMagic` for an unrecognized byte so the caller can treat the
/// remainder as trailing garbage to truncate (spec §4.D).
pub fn peek_magic(data: &[u8], offset: u64) -> Result<ChunkKind> {
    let byte = *data
        .get(offset as usize)
        .ok_or_else(|| LogError::ContentTruncated { at_byte: offset })?;
    ChunkKind::from_magic(byte).ok_or(LogError::BadMagic { offset, byte })
}
