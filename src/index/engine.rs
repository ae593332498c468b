// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Index engine (spec §4.F): owns both persistent index files, validates
//! and repairs them on open, and appends new records as more of the log
//! becomes readable. A first pass discovers frame/message offsets and
//! persists them to disk instead of recomputing them every open.

use std::path::{Path, PathBuf};

use crate::content::frame_splitter::RawFrame;
use crate::error::Result;
use crate::index::frame_index::{FrameIndexFile, FrameIndexRecord};
use crate::index::message_index::{MessageIndexFile, MessageIndexRecord};

pub const MESSAGE_INDEX_FILENAME: &str = "messageIndexFile.cache";
pub const FRAME_INDEX_FILENAME: &str = "frameIndexFile.cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// Absolute byte offset in the log at which content scanning should
    /// resume.
    pub next_byte: u64,
    pub message_count: u64,
    pub frame_count: u64,
}

pub struct IndexEngine {
    messages: MessageIndexFile,
    frames: FrameIndexFile,
}

impl IndexEngine {
    pub fn open(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = cache_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(IndexEngine {
            messages: MessageIndexFile::open_or_create(dir.join(MESSAGE_INDEX_FILENAME))?,
            frames: FrameIndexFile::open_or_create(dir.join(FRAME_INDEX_FILENAME))?,
        })
    }

    pub fn message_index_path(&self) -> &Path {
        self.messages.path()
    }

    pub fn frame_index_path(&self) -> &Path {
        self.frames.path()
    }

    /// Step 1-4 of spec §4.F: drop ragged trailing partial records, then
    /// repeatedly drop the last frame (and the messages that belong to it)
    /// until the tail is internally consistent. Returns the byte offset at
    /// which content scanning should resume.
    pub fn validate_and_repair(&mut self) -> Result<ResumePoint> {
        self.messages.truncate_ragged_tail()?;
        self.frames.truncate_ragged_tail()?;

        loop {
            let frame_count = self.frames.record_count()?;
            if frame_count == 0 {
                self.messages.truncate_to(0)?;
                return Ok(ResumePoint {
                    next_byte: 0,
                    message_count: 0,
                    frame_count: 0,
                });
            }

            let last_frame = self.frames.read(frame_count - 1)?;
            let msg_count = self.messages.record_count()?;

            let frame_index_ok = last_frame.abs_frame_index as u64 == frame_count - 1;
            let range_ok = frame_index_ok && last_frame.end_abs_message <= msg_count;

            if !range_ok {
                tracing::debug!(frame_count, "index repair: dropping last frame record (out of range)");
                self.drop_last_frame(frame_count, last_frame.first_abs_message)?;
                continue;
            }

            let mut consistent = true;
            for idx in last_frame.first_abs_message..last_frame.end_abs_message {
                let rec = self.messages.read(idx)?;
                if rec.abs_message_index != idx || rec.abs_frame_index != frame_count - 1 {
                    consistent = false;
                    break;
                }
            }
            if !consistent {
                tracing::debug!(frame_count, "index repair: dropping last frame record (message mismatch)");
                self.drop_last_frame(frame_count, last_frame.first_abs_message)?;
                continue;
            }

            let next_byte = if last_frame.end_abs_message > 0 {
                self.messages.read(last_frame.end_abs_message - 1)?.end_byte
            } else {
                0
            };
            return Ok(ResumePoint {
                next_byte,
                message_count: last_frame.end_abs_message,
                frame_count,
            });
        }
    }

    fn drop_last_frame(&mut self, frame_count: u64, message_floor: u64) -> Result<()> {
        self.frames.truncate_to(frame_count - 1)?;
        self.messages.truncate_to(message_floor)?;
        Ok(())
    }

    /// Appends one frame's worth of records: one `FrameIndexRecord` plus
    /// one `MessageIndexRecord` per message (spec §4.F). `abs_message_base`
    /// is the absolute index of `raw.messages[0]`.
    pub fn append_frame(
        &mut self,
        abs_frame_index: u64,
        abs_message_base: u64,
        raw: &RawFrame,
    ) -> Result<()> {
        for (offset, msg) in raw.messages.iter().enumerate() {
            self.messages.append(&MessageIndexRecord {
                abs_message_index: abs_message_base + offset as u64,
                abs_frame_index,
                start_byte: msg.start_byte,
                end_byte: msg.end_byte,
            })?;
        }
        self.frames.append(&FrameIndexRecord {
            abs_frame_index: abs_frame_index as u32,
            thread_name: raw.thread_name.clone(),
            first_abs_message: abs_message_base,
            end_abs_message: abs_message_base + raw.messages.len() as u64,
        })?;
        Ok(())
    }

    pub fn message_record(&mut self, abs_index: u64) -> Result<MessageIndexRecord> {
        self.messages.read(abs_index)
    }

    pub fn frame_record(&mut self, abs_index: u64) -> Result<FrameIndexRecord> {
        self.frames.read(abs_index)
    }

    pub fn message_count(&mut self) -> Result<u64> {
        self.messages.record_count()
    }

    pub fn frame_count(&mut self) -> Result<u64> {
        self.frames.record_count()
    }

    pub fn all_messages(&mut self) -> Result<Vec<MessageIndexRecord>> {
        self.messages.read_all()
    }

    pub fn all_frames(&mut self) -> Result<Vec<FrameIndexRecord>> {
        self.frames.read_all()
    }

    /// Optional O(n) check from spec §4.F: every adjacent pair of message
    /// records is byte-contiguous and every adjacent pair of frame records
    /// is message-contiguous (spec §8 invariants 2-3).
    pub fn full_verify(&mut self) -> Result<bool> {
        let messages = self.messages.read_all()?;
        for w in messages.windows(2) {
            if w[1].start_byte != w[0].end_byte {
                return Ok(false);
            }
        }
        let frames = self.frames.read_all()?;
        for (i, w) in frames.windows(2).enumerate() {
            if w[1].first_abs_message != w[0].end_abs_message {
                return Ok(false);
            }
            if w[0].abs_frame_index as usize != i {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

pub fn cache_dir_for(log_path: impl AsRef<Path>, base: Option<&Path>) -> PathBuf {
    let log_path = log_path.as_ref();
    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    match base {
        Some(base) => base.join(&stem),
        None => log_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("cache")
            .join(&stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("logreader-engine-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_frame(thread: &str, start: u64) -> RawFrame {
        use crate::content::frame_splitter::RawMessage;
        RawFrame {
            messages: vec![
                RawMessage { log_id: 0, payload_size: 4, start_byte: start, end_byte: start + 8 },
                RawMessage { log_id: 1, payload_size: 4, start_byte: start + 8, end_byte: start + 16 },
            ],
            dummies: vec![],
            thread_name: thread.to_string(),
            start_byte: start,
            end_byte: start + 16,
        }
    }

    #[test]
    fn appends_and_resumes_cleanly() {
        let dir = tmp_dir("resume");
        let mut engine = IndexEngine::open(&dir).unwrap();
        engine.append_frame(0, 0, &sample_frame("Upper", 0)).unwrap();
        engine.append_frame(1, 2, &sample_frame("Upper", 16)).unwrap();

        let resume = engine.validate_and_repair().unwrap();
        assert_eq!(resume.frame_count, 2);
        assert_eq!(resume.message_count, 4);
        assert_eq!(resume.next_byte, 32);
        assert!(engine.full_verify().unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn repairs_corrupted_tail_by_dropping_last_frame() {
        let dir = tmp_dir("repair");
        let mut engine = IndexEngine::open(&dir).unwrap();
        engine.append_frame(0, 0, &sample_frame("Upper", 0)).unwrap();
        engine.append_frame(1, 2, &sample_frame("Upper", 16)).unwrap();

        // corrupt: overwrite the last frame record's abs_frame_index.
        {
            let bad = FrameIndexRecord {
                abs_frame_index: 99,
                thread_name: "Upper".into(),
                first_abs_message: 2,
                end_abs_message: 4,
            };
            let count = engine.frame_count().unwrap();
            engine.frames.truncate_to(count - 1).unwrap();
            engine.frames.append(&bad).unwrap();
        }

        let resume = engine.validate_and_repair().unwrap();
        assert_eq!(resume.frame_count, 1);
        assert_eq!(resume.message_count, 2);
        assert_eq!(resume.next_byte, 16);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_index_resumes_from_zero() {
        let dir = tmp_dir("empty");
        let mut engine = IndexEngine::open(&dir).unwrap();
        let resume = engine.validate_and_repair().unwrap();
        assert_eq!(resume, ResumePoint { next_byte: 0, message_count: 0, frame_count: 0 });
        std::fs::remove_dir_all(&dir).ok();
    }
}
