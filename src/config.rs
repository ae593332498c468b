// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Crate-wide configuration: a plain struct with a sensible `Default`
//! and `with_*` builder methods.

use std::path::PathBuf;

/// Above this size `Log::eval` defaults to accessor mode instead of
/// materializing the whole tree as instances.
pub const DEFAULT_LARGE_FILE_THRESHOLD_BYTES: u64 = 256 * 1024 * 1024;

/// Default capacity of the per-log LRU caches (decoded reprs, class-name
/// lists) described in spec §4.G.
pub const DEFAULT_LRU_CAPACITY: usize = 200;

#[derive(Debug, Clone)]
pub struct LogReaderConfig {
    /// Overrides the `cache/<stem>/` directory derived from the log path.
    pub cache_dir: Option<PathBuf>,
    /// Overrides the `output/<stem>/` directory the CLI's `parse` subcommand
    /// writes frame JSON/image artifacts into.
    pub output_dir: Option<PathBuf>,
    /// Worker count for the bulk parser. `None` = `available_parallelism()`.
    pub num_workers: Option<usize>,
    /// Size above which `Log::eval` prefers accessor mode.
    pub large_file_threshold_bytes: u64,
    /// Capacity of the per-log LRU caches.
    pub lru_capacity: usize,
    /// Write decoded representations to the on-disk repr cache as they are
    /// produced by the bulk parser.
    pub cache_to_disk: bool,
}

impl Default for LogReaderConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            output_dir: None,
            num_workers: None,
            large_file_threshold_bytes: DEFAULT_LARGE_FILE_THRESHOLD_BYTES,
            lru_capacity: DEFAULT_LRU_CAPACITY,
            cache_to_disk: true,
        }
    }
}

impl LogReaderConfig {
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = Some(n);
        self
    }

    pub fn with_large_file_threshold_bytes(mut self, bytes: u64) -> Self {
        self.large_file_threshold_bytes = bytes;
        self
    }

    pub fn with_lru_capacity(mut self, cap: usize) -> Self {
        self.lru_capacity = cap;
        self
    }

    pub fn with_cache_to_disk(mut self, enabled: bool) -> Self {
        self.cache_to_disk = enabled;
        self
    }

    pub fn resolved_num_workers(&self) -> usize {
        self.num_workers
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    pub fn is_large_file(&self, size_bytes: u64) -> bool {
        size_bytes >= self.large_file_threshold_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = LogReaderConfig::default();
        assert_eq!(cfg.large_file_threshold_bytes, 256 * 1024 * 1024);
        assert_eq!(cfg.lru_capacity, 200);
        assert!(cfg.cache_to_disk);
    }

    #[test]
    fn builder_overrides() {
        let cfg = LogReaderConfig::default()
            .with_num_workers(4)
            .with_lru_capacity(10)
            .with_large_file_threshold_bytes(100);
        assert_eq!(cfg.resolved_num_workers(), 4);
        assert_eq!(cfg.lru_capacity, 10);
        assert!(cfg.is_large_file(100));
        assert!(!cfg.is_large_file(99));
    }
}
