// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-message decoded-value cache on disk. One file per absolute message
//! index, named `Message_<absIndex>_repr`, holding a version byte followed
//! by the message's [`Value`] serialized with `serde_json`, the crate's
//! chosen serde-based wire format for decoded values.

use std::fs;
use std::path::{Path, PathBuf};

use crate::decode::value::Value;
use crate::error::{LogError, Result};

const CACHE_FORMAT_VERSION: u8 = 1;

pub struct ReprCache {
    dir: PathBuf,
}

impl ReprCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ReprCache { dir })
    }

    pub fn path_for(&self, abs_message_index: u64) -> PathBuf {
        self.dir.join(format!("Message_{abs_message_index}_repr"))
    }

    pub fn load(&self, abs_message_index: u64) -> Result<Option<Value>> {
        let path = self.path_for(abs_message_index);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LogError::io(format!("reading {}", path.display()), e)),
        };
        let Some((&version, payload)) = bytes.split_first() else {
            return Ok(None);
        };
        if version != CACHE_FORMAT_VERSION {
            return Ok(None);
        }
        match serde_json::from_slice(payload) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        }
    }

    pub fn store(&self, abs_message_index: u64, value: &Value) -> Result<()> {
        let path = self.path_for(abs_message_index);
        let mut out = vec![CACHE_FORMAT_VERSION];
        out.extend_from_slice(
            &serde_json::to_vec(value).map_err(|e| LogError::Other(format!("encoding repr cache entry: {e}")))?,
        );
        fs::write(&path, out).map_err(|e| LogError::io(format!("writing {}", path.display()), e))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::value::Scalar;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("logreader-repr-cache-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn round_trips_a_value_through_disk() {
        let dir = tmp_dir("roundtrip");
        let cache = ReprCache::new(&dir).unwrap();
        let value = Value::Struct {
            type_name: "RobotPose".into(),
            fields: vec![("x".into(), Value::Scalar(Scalar::F32(1.5)))],
        };
        cache.store(42, &value).unwrap();
        let loaded = cache.load(42).unwrap();
        assert_eq!(loaded, Some(value));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_entry_returns_none() {
        let dir = tmp_dir("missing");
        let cache = ReprCache::new(&dir).unwrap();
        assert_eq!(cache.load(7).unwrap(), None);
        fs::remove_dir_all(&dir).ok();
    }
}
