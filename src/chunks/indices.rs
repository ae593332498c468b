// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `IndicesChunk` parser (spec §3). This is the *in-file* index, distinct
//! from the engine's own persistent `messageIndexFile.cache`/
//! `frameIndexFile.cache` (component F), which is always derivable by
//! walking the content chunk and is what this crate actually relies on for
//! random access. The in-file chunk is read opportunistically as a hint;
//! spec.md is explicit that whenever it is "missing, invalid, or
//! inconsistent," the engine falls back to recomputing from content bytes
//! — which component F does unconditionally, so a parse failure here is
//! never fatal to the caller.

use crate::error::{LogError, Result};
use crate::io::stream::StreamReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOffset {
    pub byte_offset: u64,
    pub has_image: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicesChunk {
    pub version: u32,
    pub used_size: u64,
    pub frame_offsets: Vec<FrameOffset>,
}

const INDICES_VERSION: u32 = 2;

impl IndicesChunk {
    /// Decides, per spec §3, whether a trailing `IndicesChunk` should be
    /// trusted at all: `messages != 0x0FFFFFFF && usedSize != remainingSize`.
    pub fn should_trust(messages: u32, used_size: u64, remaining_size: u64) -> bool {
        messages != 0x0FFF_FFFF && used_size != remaining_size
    }

    pub fn parse(stream: &mut StreamReader) -> Result<IndicesChunk> {
        let version = stream.read_u32()?;
        if version != INDICES_VERSION {
            return Err(LogError::BadIndicesVersion { got: version });
        }
        let used_size = stream.read_u64()?;
        let frame_offsets = stream.read_array(|s| {
            let raw = s.read_u64()?;
            Ok(FrameOffset {
                byte_offset: raw & !(1u64 << 63),
                has_image: raw & (1u64 << 63) != 0,
            })
        })?;
        // Per-thread message-frequency/storage-size statistics and the
        // per-thread annotation list follow here on the wire. Their exact
        // field layout is not pinned down by the format this crate
        // targets and nothing downstream consumes them (component F
        // rebuilds its own index from content bytes regardless), so the
        // remainder of the chunk is left unread; callers that only need
        // `frame_offsets` stop here.
        Ok(IndicesChunk {
            version,
            used_size,
            frame_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_offsets_with_image_flag() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&1000u64.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes()); // 2 offsets
        bytes.extend_from_slice(&100u64.to_le_bytes());
        bytes.extend_from_slice(&(200u64 | (1u64 << 63)).to_le_bytes());
        let mut stream = StreamReader::new(&bytes);
        let chunk = IndicesChunk::parse(&mut stream).unwrap();
        assert_eq!(chunk.frame_offsets.len(), 2);
        assert!(!chunk.frame_offsets[0].has_image);
        assert!(chunk.frame_offsets[1].has_image);
        assert_eq!(chunk.frame_offsets[1].byte_offset, 200);
    }

    #[test]
    fn rejects_bad_version() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&3u32.to_le_bytes());
        let mut stream = StreamReader::new(&bytes);
        assert!(matches!(
            IndicesChunk::parse(&mut stream),
            Err(LogError::BadIndicesVersion { got: 3 })
        ));
    }

    #[test]
    fn should_trust_condition() {
        assert!(IndicesChunk::should_trust(5, 100, 200));
        assert!(!IndicesChunk::should_trust(0x0FFF_FFFF, 100, 200));
        assert!(!IndicesChunk::should_trust(5, 100, 100));
    }
}
