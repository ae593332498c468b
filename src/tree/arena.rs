// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Memory-mapped file ownership: the arena owns the mapping, every view
//! into the log borrows from it instead of transmuting lifetimes.

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

pub struct LogArena {
    mmap: memmap2::Mmap,
    path: PathBuf,
}

impl LogArena {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| LogError::io(format!("opening {}", path.display()), e))?;
        // SAFETY: the arena owns the mapping for its whole lifetime; every
        // slice handed out borrows from `self` and cannot outlive it.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| LogError::io(format!("mmapping {}", path.display()), e))?;
        Ok(LogArena { mmap, path })
    }

    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Deref for LogArena {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.mmap
    }
}

impl std::fmt::Debug for LogArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogArena")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}
