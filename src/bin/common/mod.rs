// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::path::Path;

use logreader::{Log, LogReaderConfig};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Baseline added to parsed `--start-time`/`--end-time` offsets so they
/// line up with in-log millisecond timestamps (spec.md §6).
pub const TIME_BASELINE_MS: u32 = 100_000;

/// Parses `[HH:]MM:SS[.mmm]` or `SS[.mmm]`, returning milliseconds since
/// the baseline used by in-log `FrameInfo.time` values.
pub fn parse_offset_ms(s: &str) -> CliResult<u32> {
    let (sub_secs, millis) = match s.split_once('.') {
        Some((secs, frac)) => {
            let frac = format!("{frac:0<3}");
            (secs.to_string(), frac[..3].parse::<u32>()?)
        }
        None => (s.to_string(), 0),
    };

    let parts: Vec<&str> = sub_secs.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => (0u32, 0u32, s.parse::<u32>()?),
        [m, s] => (0u32, m.parse::<u32>()?, s.parse::<u32>()?),
        [h, m, s] => (h.parse::<u32>()?, m.parse::<u32>()?, s.parse::<u32>()?),
        _ => return Err(anyhow::anyhow!("invalid time offset: {s}")),
    };

    let total_ms = ((hours * 3600 + minutes * 60 + seconds) * 1000) + millis;
    Ok(TIME_BASELINE_MS + total_ms)
}

/// Format a duration in milliseconds to human-readable string.
pub fn format_duration_ms(millis: u64) -> String {
    let secs = millis / 1000;
    let ms = millis % 1000;

    if secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{hours}h {minutes}m")
    } else if secs >= 60 {
        let minutes = secs / 60;
        let remaining_secs = secs % 60;
        format!("{minutes}m {remaining_secs}s")
    } else if secs > 0 {
        format!("{secs}.{ms:03}s")
    } else {
        format!("{ms}ms")
    }
}

/// Progress bar wrapper for consistent progress reporting.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    pub fn new(total: u64, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new(total);
            pb.set_style(
                indicatif::ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            pb.set_prefix(prefix);
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(pb) = &self.inner {
            pb.inc(delta);
        }
    }

    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}

/// Opens a log at the default configuration, overriding the worker count
/// when requested.
pub fn open_log(path: &Path, num_workers: Option<usize>) -> Result<Log> {
    let mut config = LogReaderConfig::default();
    if let Some(n) = num_workers {
        config = config.with_num_workers(n);
    }
    Ok(Log::open(path, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_seconds() {
        assert_eq!(parse_offset_ms("5").unwrap(), TIME_BASELINE_MS + 5000);
    }

    #[test]
    fn parses_minutes_seconds_millis() {
        assert_eq!(parse_offset_ms("1:02.500").unwrap(), TIME_BASELINE_MS + 62_500);
    }

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_offset_ms("1:00:00").unwrap(), TIME_BASELINE_MS + 3_600_000);
    }

    #[test]
    fn format_duration_matches_expected_buckets() {
        assert_eq!(format_duration_ms(500), "500ms");
        assert_eq!(format_duration_ms(1_500), "1.500s");
        assert_eq!(format_duration_ms(90_000), "1m 30s");
        assert_eq!(format_duration_ms(3_600_000), "1h 0m");
    }
}
