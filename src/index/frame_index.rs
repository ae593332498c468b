// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `frameIndexFile.cache`: append-only 32-byte records (spec §3, §6).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

pub const RECORD_LEN: usize = 32;
const THREAD_NAME_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIndexRecord {
    pub abs_frame_index: u32,
    pub thread_name: String,
    pub first_abs_message: u64,
    pub end_abs_message: u64,
}

impl FrameIndexRecord {
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&self.abs_frame_index.to_le_bytes());
        let name_bytes = self.thread_name.as_bytes();
        let n = name_bytes.len().min(THREAD_NAME_LEN);
        out[4..4 + n].copy_from_slice(&name_bytes[..n]);
        out[16..24].copy_from_slice(&self.first_abs_message.to_le_bytes());
        out[24..32].copy_from_slice(&self.end_abs_message.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<FrameIndexRecord> {
        if bytes.len() != RECORD_LEN {
            return Err(LogError::Other(format!(
                "frame index record must be {RECORD_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let abs_frame_index = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let name_raw = &bytes[4..16];
        let end = name_raw.iter().position(|&b| b == 0).unwrap_or(THREAD_NAME_LEN);
        let thread_name = String::from_utf8_lossy(&name_raw[..end]).into_owned();
        let first_abs_message = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        let end_abs_message = u64::from_le_bytes(bytes[24..32].try_into().unwrap());
        Ok(FrameIndexRecord {
            abs_frame_index,
            thread_name,
            first_abs_message,
            end_abs_message,
        })
    }
}

pub struct FrameIndexFile {
    file: File,
    path: PathBuf,
}

impl FrameIndexFile {
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| LogError::io(format!("opening {}", path.display()), e))?;
        Ok(FrameIndexFile { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_count(&mut self) -> Result<u64> {
        let len = self.file.metadata()?.len();
        Ok(len / RECORD_LEN as u64)
    }

    pub fn truncate_ragged_tail(&mut self) -> Result<()> {
        let count = self.record_count()?;
        self.file.set_len(count * RECORD_LEN as u64)?;
        Ok(())
    }

    pub fn read(&mut self, index: u64) -> Result<FrameIndexRecord> {
        let mut buf = [0u8; RECORD_LEN];
        self.file.seek(SeekFrom::Start(index * RECORD_LEN as u64))?;
        self.file.read_exact(&mut buf)?;
        FrameIndexRecord::decode(&buf)
    }

    pub fn append(&mut self, record: &FrameIndexRecord) -> Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&record.encode())?;
        Ok(())
    }

    pub fn truncate_to(&mut self, record_count: u64) -> Result<()> {
        self.file.set_len(record_count * RECORD_LEN as u64)?;
        Ok(())
    }

    pub fn read_all(&mut self) -> Result<Vec<FrameIndexRecord>> {
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
    fn record_roundtrips_and_pads_short_names() {
        let r = FrameIndexRecord {
            abs_frame_index: 3,
            thread_name: "Upper".to_string(),
            first_abs_message: 10,
            end_abs_message: 14,
        };
        let bytes = r.encode();
        assert_eq!(bytes.len(), RECORD_LEN);
        let decoded = FrameIndexRecord::decode(&bytes).unwrap();
        assert_eq!(decoded, r);
    }

    #[test]
    fn truncates_name_longer_than_12_bytes() {
        let r = FrameIndexRecord {
            abs_frame_index: 0,
            thread_name: "ThisNameIsWayTooLong".to_string(),
            first_abs_message: 0,
            end_abs_message: 0,
        };
        let decoded = FrameIndexRecord::decode(&r.encode()).unwrap();
        assert_eq!(decoded.thread_name, "ThisNameIsWa");
    }
}
