// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `ContentChunk` (uncompressed) — the queue header plus the message
//! stream that the frame splitter groups into frames (spec §3, §4.E).

pub mod frame_splitter;

use crate::chunks::message_ids::MessageIdTable;
use crate::content::frame_splitter::{split_frames, RawFrame};
use crate::error::Result;
use crate::io::stream::{used_size as compute_used_size, StreamReader};

pub struct ContentChunkHeader {
    pub high: u8,
    pub messages: u32,
    pub low: u64,
    pub used_size: u64,
    /// Position right after the queue header, i.e. where the message
    /// stream begins.
    pub body_start: u64,
}

impl ContentChunkHeader {
    pub fn parse(stream: &mut StreamReader) -> Result<ContentChunkHeader> {
        let (high, messages, low) = stream.read_queue_header()?;
        Ok(ContentChunkHeader {
            high,
            messages,
            low,
            used_size: compute_used_size(high, low),
            body_start: stream.tell(),
        })
    }

    /// Whether a trailing `IndicesChunk` should be trusted, per spec §3:
    /// `messages != 0x0FFFFFFF && usedSize != remainingSize`, where
    /// `remainingSize` is measured from the content chunk's own body
    /// start to end of file.
    pub fn has_index(&self, file_size: u64) -> bool {
        let remaining = file_size.saturating_sub(self.body_start);
        crate::chunks::indices::IndicesChunk::should_trust(self.messages, self.used_size, remaining)
    }
}

/// Splits the full content chunk (magic byte already consumed by the
/// caller's dispatch loop) into frames, returning the frames and the
/// absolute offset one past the last complete frame.
pub fn eval_content_chunk(
    data: &[u8],
    chunk_magic_offset: u64,
    id_table: &MessageIdTable,
) -> Result<(ContentChunkHeader, Vec<RawFrame>, u64)> {
    let mut stream = StreamReader::at(data, chunk_magic_offset as usize);
    let header = ContentChunkHeader::parse(&mut stream)?;
    let (frames, end) = split_frames(data, header.body_start, header.used_size, data.len() as u64, id_table);
    Ok((header, frames, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::stream::pack_queue_header;

    fn id_table(names: &[&str]) -> MessageIdTable {
        let mut bytes = vec![names.len() as u8];
        for n in names {
            bytes.extend_from_slice(&(n.len() as u32).to_le_bytes());
            bytes.extend_from_slice(n.as_bytes());
        }
        let mut stream = StreamReader::new(&bytes);
        MessageIdTable::parse(&mut stream).unwrap()
    }

    fn encode_string(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    fn encode_message(log_id: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![log_id];
        out.extend_from_slice(&(body.len() as u32).to_le_bytes()[..3]);
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn parses_queue_header_and_splits_frames() {
        let table = id_table(&["idFrameBegin", "idFrameFinished"]);
        let tn = encode_string("Upper");
        let mut body = vec![];
        body.extend_from_slice(&encode_message(0, &tn));
        body.extend_from_slice(&encode_message(1, &tn));

        let header_word = pack_queue_header(0, body.len() as u32, body.len() as u64);
        let mut data = vec![];
        data.extend_from_slice(&header_word.to_le_bytes());
        data.extend_from_slice(&body);

        let (header, frames, end) = eval_content_chunk(&data, 0, &table).unwrap();
        assert_eq!(header.used_size, body.len() as u64);
        assert_eq!(frames.len(), 1);
        assert_eq!(end, data.len() as u64);
    }

    #[test]
    fn has_index_false_when_messages_unknown() {
        let header = ContentChunkHeader {
            high: 0,
            messages: 0x0FFF_FFFF,
            low: 10,
            used_size: 10,
            body_start: 8,
        };
        assert!(!header.has_index(100));
    }
}
