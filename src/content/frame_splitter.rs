// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Frame splitter (spec §4.E): walks the content chunk's message stream
//! and groups messages into frames delimited by `idFrameBegin`/
//! `idFrameFinished` pairs. Grounded on
//! `original_source/LogInterface/UncompressedChunk.py`'s `eval` loop,
//! which performs exactly this grouping before handing frames to
//! per-thread bookkeeping.
//!
//! Any anomaly (a message crossing the usedSize boundary, a `Finished`
//! without a matching `Begin`, an out-of-range id, or trailing bytes too
//! short for a header) stops the scan at the last complete frame boundary
//! rather than propagating a hard error — this is the "truncate to the
//! last complete frame" policy of spec §6, applied uniformly so the index
//! engine (component F) always has a well-defined resume point.

use crate::chunks::message_ids::{MessageIdTable, MessageRole, MISSING_MESSAGE_ID};
use crate::io::stream::StreamReader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub log_id: u8,
    pub payload_size: u32,
    pub start_byte: u64,
    pub end_byte: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub messages: Vec<RawMessage>,
    pub dummies: Vec<RawMessage>,
    pub thread_name: String,
    pub start_byte: u64,
    pub end_byte: u64,
}

/// Splits `data[content_start .. content_start + min(used_size, file_size -
/// content_start))` into frames. Returns the frames found and the absolute
/// byte offset one past the last complete frame — the point at which a
/// subsequent append-only scan should resume.
pub fn split_frames(
    data: &[u8],
    content_start: u64,
    used_size: u64,
    file_size: u64,
    id_table: &MessageIdTable,
) -> (Vec<RawFrame>, u64) {
    let limit = content_start + used_size.min(file_size.saturating_sub(content_start));
    let mut cursor = content_start;
    let mut frames = Vec::new();

    'outer: while cursor < limit {
        let frame_start = cursor;
        let mut messages: Vec<RawMessage> = Vec::new();
        let mut dummies: Vec<RawMessage> = Vec::new();

        loop {
            if limit - cursor < 4 {
                // Trailing garbage shorter than a header: stop cleanly.
                break 'outer;
            }
            let mut header_reader = StreamReader::at(data, cursor as usize);
            let (log_id, payload_size) = match header_reader.read_message_header() {
                Ok(v) => v,
                Err(_) => break 'outer,
            };
            let body_start = cursor + 4;
            let body_end = body_start + payload_size as u64;
            if body_end > limit {
                tracing::warn!(at_byte = cursor, "message payload crosses content boundary, truncating");
                break 'outer;
            }
            let msg = RawMessage {
                log_id,
                payload_size,
                start_byte: cursor,
                end_byte: body_end,
            };
            cursor = body_end;

            if log_id == MISSING_MESSAGE_ID {
                tracing::warn!(at_byte = msg.start_byte, "message with missing MessageID, recorded as dummy");
                dummies.push(msg);
                continue;
            }
            if log_id as usize >= id_table.len() {
                tracing::warn!(log_id, table_len = id_table.len(), "message id out of range, truncating");
                break 'outer;
            }

            let role = id_table.role(log_id);
            messages.push(msg);

            match role {
                MessageRole::FrameFinished => {
                    let first = messages.first().expect("just pushed at least one message");
                    let first_role = id_table.role(first.log_id);
                    let last = messages.last().unwrap();
                    let first_body = &data[(first.start_byte + 4) as usize..first.end_byte as usize];
                    let last_body = &data[(last.start_byte + 4) as usize..last.end_byte as usize];
                    if first_role == MessageRole::FrameBegin && first_body == last_body {
                        break;
                    } else {
                        tracing::warn!(
                            at_byte = frame_start,
                            "FrameFinished without a matching FrameBegin, truncating"
                        );
                        break 'outer;
                    }
                }
                MessageRole::FrameBegin if messages.len() > 1 => {
                    let last = messages.pop().expect("len() > 1 checked above");
                    dummies.append(&mut messages);
                    messages.push(last);
                }
                _ => {}
            }
        }

        if messages.is_empty() {
            break;
        }
        let first = messages.first().unwrap();
        let last = messages.last().unwrap();
        let thread_name = {
            let body = &data[(first.start_byte + 4) as usize..first.end_byte as usize];
            let mut r = StreamReader::new(body);
            r.read_string().unwrap_or_default()
        };
        frames.push(RawFrame {
            start_byte: first.start_byte,
            end_byte: last.end_byte,
            thread_name,
            messages,
            dummies,
        });
    }

    (frames, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_table(names: &[&str]) -> MessageIdTable {
        let mut bytes = vec![names.len() as u8];
        for n in names {
            bytes.extend_from_slice(&(n.len() as u32).to_le_bytes());
            bytes.extend_from_slice(n.as_bytes());
        }
        let mut stream = StreamReader::new(&bytes);
        MessageIdTable::parse(&mut stream).unwrap()
    }

    fn encode_message(log_id: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![log_id];
        let size = body.len() as u32;
        out.extend_from_slice(&size.to_le_bytes()[..3]);
        out.extend_from_slice(body);
        out
    }

    fn encode_string(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn minimal_frame_scenario() {
        // spec §8 scenario 3
        let table = id_table(&["idFrameBegin", "idFrameFinished"]);
        let thread_name = encode_string("Cognition");
        let mut content = vec![];
        content.extend_from_slice(&encode_message(0, &thread_name));
        content.extend_from_slice(&encode_message(1, &thread_name));
        let used_size = content.len() as u64;

        let (frames, end) = split_frames(&content, 0, used_size, content.len() as u64, &table);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].thread_name, "Cognition");
        assert_eq!(frames[0].messages.len(), 2);
        assert_eq!(end, content.len() as u64);
    }

    #[test]
    fn nested_begin_demotes_earlier_messages_to_dummies() {
        let table = id_table(&["idFrameBegin", "idFrameFinished", "idRobotPose"]);
        let tn = encode_string("Motion");
        let mut content = vec![];
        content.extend_from_slice(&encode_message(0, &tn)); // begin
        content.extend_from_slice(&encode_message(2, &[1, 2, 3, 4])); // a pose, will become dummy
        content.extend_from_slice(&encode_message(0, &tn)); // nested begin -> restarts frame
        content.extend_from_slice(&encode_message(1, &tn)); // finish
        let used_size = content.len() as u64;

        let (frames, _end) = split_frames(&content, 0, used_size, content.len() as u64, &table);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].messages.len(), 2);
        assert_eq!(frames[0].dummies.len(), 2);
    }

    #[test]
    fn truncates_on_unmatched_finish() {
        let table = id_table(&["idFrameBegin", "idFrameFinished"]);
        let tn1 = encode_string("Motion");
        let tn2 = encode_string("Upper");
        let mut content = vec![];
        content.extend_from_slice(&encode_message(0, &tn1));
        content.extend_from_slice(&encode_message(1, &tn2)); // mismatched thread name payload
        let used_size = content.len() as u64;

        let (frames, end) = split_frames(&content, 0, used_size, content.len() as u64, &table);
        assert!(frames.is_empty());
        assert_eq!(end, 0);
    }

    #[test]
    fn stops_cleanly_on_trailing_garbage() {
        let table = id_table(&["idFrameBegin", "idFrameFinished"]);
        let tn = encode_string("Motion");
        let mut content = vec![];
        content.extend_from_slice(&encode_message(0, &tn));
        content.extend_from_slice(&encode_message(1, &tn));
        let complete_end = content.len() as u64;
        content.extend_from_slice(&[0xAB, 0xCD]); // too short for another header
        let used_size = content.len() as u64;

        let (frames, end) = split_frames(&content, 0, used_size, content.len() as u64, &table);
        assert_eq!(frames.len(), 1);
        assert_eq!(end, complete_end);
    }

    #[test]
    fn missing_message_id_is_recorded_as_dummy_and_skipped() {
        let table = id_table(&["idFrameBegin", "idFrameFinished"]);
        let tn = encode_string("Motion");
        let mut content = vec![];
        content.extend_from_slice(&encode_message(0, &tn));
        content.extend_from_slice(&encode_message(MISSING_MESSAGE_ID, &[9, 9]));
        content.extend_from_slice(&encode_message(1, &tn));
        let used_size = content.len() as u64;

        let (frames, _end) = split_frames(&content, 0, used_size, content.len() as u64, &table);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].messages.len(), 2);
        assert_eq!(frames[0].dummies.len(), 1);
    }
}
