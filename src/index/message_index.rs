// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `messageIndexFile.cache`: append-only 32-byte records (spec §3, §6).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

pub const RECORD_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIndexRecord {
    pub abs_message_index: u64,
    pub abs_frame_index: u64,
    pub start_byte: u64,
    pub end_byte: u64,
}

impl MessageIndexRecord {
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..8].copy_from_slice(&self.abs_message_index.to_le_bytes());
        out[8..16].copy_from_slice(&self.abs_frame_index.to_le_bytes());
        out[16..24].copy_from_slice(&self.start_byte.to_le_bytes());
        out[24..32].copy_from_slice(&self.end_byte.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<MessageIndexRecord> {
        if bytes.len() != RECORD_LEN {
            return Err(LogError::Other(format!(
                "message index record must be {RECORD_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(MessageIndexRecord {
            abs_message_index: u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
            abs_frame_index: u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
            start_byte: u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
            end_byte: u64::from_le_bytes(bytes[24..32].try_into().unwrap()),
        })
    }
}

pub struct MessageIndexFile {
    file: File,
    path: PathBuf,
}

impl MessageIndexFile {
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| LogError::io(format!("opening {}", path.display()), e))?;
        Ok(MessageIndexFile { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of whole records currently on disk, dropping any ragged
    /// trailing partial record (spec §4.F step 1).
    pub fn record_count(&mut self) -> Result<u64> {
        let len = self.file.metadata()?.len();
        Ok(len / RECORD_LEN as u64)
    }

    pub fn truncate_ragged_tail(&mut self) -> Result<()> {
        let count = self.record_count()?;
        self.file.set_len(count * RECORD_LEN as u64)?;
        Ok(())
    }

    pub fn read(&mut self, index: u64) -> Result<MessageIndexRecord> {
        let mut buf = [0u8; RECORD_LEN];
        self.file.seek(SeekFrom::Start(index * RECORD_LEN as u64))?;
        self.file.read_exact(&mut buf)?;
        MessageIndexRecord::decode(&buf)
    }

    pub fn append(&mut self, record: &MessageIndexRecord) -> Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&record.encode())?;
        Ok(())
    }

    pub fn truncate_to(&mut self, record_count: u64) -> Result<()> {
        self.file.set_len(record_count * RECORD_LEN as u64)?;
        Ok(())
    }

    pub fn read_all(&mut self) -> Result<Vec<MessageIndexRecord>> {
        let count = self.record_count()?;
        let mut out = Vec::with_capacity(count as usize);
        for i in 0..count {
            out.push(self.read(i)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_roundtrips_through_32_bytes() {
        let r = MessageIndexRecord {
            abs_message_index: 1,
            abs_frame_index: 2,
            start_byte: 100,
            end_byte: 146,
        };
        let bytes = r.encode();
        assert_eq!(bytes.len(), RECORD_LEN);
        assert_eq!(MessageIndexRecord::decode(&bytes).unwrap(), r);
    }

    #[test]
    fn append_and_read_back() {
        let dir = std::env::temp_dir().join(format!("logreader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("messageIndexFile.cache");
        let _ = std::fs::remove_file(&path);
        let mut f = MessageIndexFile::open_or_create(&path).unwrap();
        for i in 0..3 {
            f.append(&MessageIndexRecord {
                abs_message_index: i,
                abs_frame_index: 0,
                start_byte: i * 10,
                end_byte: i * 10 + 10,
            })
            .unwrap();
        }
        assert_eq!(f.record_count().unwrap(), 3);
        let r1 = f.read(1).unwrap();
        assert_eq!(r1.start_byte, 10);
        std::fs::remove_file(&path).ok();
    }
}
