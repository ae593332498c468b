// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parse command - drives the bulk parser over a filtered index map and
//! writes per-frame JSON (and, for image-shaped classes, per-image
//! artifacts via `ImageSink`) to the log's output directory.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use serde::Serialize;

use crate::common::{format_duration_ms, open_log, parse_offset_ms, ProgressBar};
use logreader::{ImageSink, PassthroughSink};

const KNOWN_THREADS: &[&str] = &["Upper", "Lower", "Motion", "Audio", "Cognition", "Referee"];

#[derive(Args, Clone, Debug)]
pub struct ParseCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Worker count for the bulk parser (default: CPU count)
    #[arg(long = "numworkers")]
    num_workers: Option<usize>,

    /// Restrict to a comma-separated subset of thread names
    #[arg(long = "threads", value_delimiter = ',')]
    threads: Option<Vec<String>>,

    /// Start time as [HH:]MM:SS[.mmm] or SS[.mmm]
    #[arg(long = "start-time")]
    start_time: Option<String>,

    /// End time as [HH:]MM:SS[.mmm] or SS[.mmm]
    #[arg(long = "end-time")]
    end_time: Option<String>,

    /// Start frame (absolute index, inclusive)
    #[arg(long = "start-frame")]
    start_frame: Option<u64>,

    /// End frame (absolute index, inclusive)
    #[arg(long = "end-frame")]
    end_frame: Option<u64>,

    /// Print worker-pool timing to stderr
    #[arg(long)]
    profile: bool,
}

#[derive(Serialize)]
struct FrameArtifact {
    abs_frame_index: u64,
    thread: String,
    timestamp_ms: u32,
    messages: Vec<MessageArtifact>,
}

#[derive(Serialize)]
struct MessageArtifact {
    abs_message_index: u64,
    class_name: Option<String>,
    value: Option<logreader::decode::value::Value>,
}

impl ParseCmd {
    /// Runs the command, returning the process exit code directly (spec.md
    /// §6: `0` success, `2` bad argument, `1` other).
    pub fn run(self) -> i32 {
        if let Some(threads) = &self.threads {
            for t in threads {
                if !KNOWN_THREADS.contains(&t.as_str()) {
                    eprintln!("Error: unknown thread '{t}', expected one of {KNOWN_THREADS:?}");
                    return 2;
                }
            }
        }
        if let (Some(start), Some(end)) = (self.start_frame, self.end_frame) {
            if start > end {
                eprintln!("Error: --start-frame must be <= --end-frame");
                return 2;
            }
        }

        let start_ms = match self.start_time.as_deref().map(parse_offset_ms).transpose() {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error: invalid --start-time: {e}");
                return 2;
            }
        };
        let end_ms = match self.end_time.as_deref().map(parse_offset_ms).transpose() {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error: invalid --end-time: {e}");
                return 2;
            }
        };

        match self.execute(start_ms, end_ms) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        }
    }

    fn execute(&self, start_ms: Option<u32>, end_ms: Option<u32>) -> anyhow::Result<()> {
        let started = Instant::now();
        let log = open_log(&self.input, self.num_workers)?;

        let all_threads = log.thread_names();
        let selected: Vec<String> = match &self.threads {
            Some(t) => t.clone(),
            None => all_threads.iter().map(|s| s.to_string()).collect(),
        };

        fs::create_dir_all(log.output_dir())?;
        let mut sink = PassthroughSink;

        let total_frames: u64 = selected
            .iter()
            .map(|t| log.thread_view(t).len())
            .sum();
        let progress = ProgressBar::new(total_frames, "parse");

        let mut written = 0u64;
        for thread in &selected {
            let view = log.thread_view(thread);
            let thread_dir = log.output_dir().join(thread);
            fs::create_dir_all(&thread_dir)?;

            for pos in 0..view.len() {
                let Some(frame) = view.frame_at(pos) else { continue };
                let abs_frame_index = frame.abs_frame_index as u64;

                if let Some(start) = self.start_frame {
                    if abs_frame_index < start {
                        progress.inc(1);
                        continue;
                    }
                }
                if let Some(end) = self.end_frame {
                    if abs_frame_index > end {
                        progress.inc(1);
                        continue;
                    }
                }

                let timestamp_ms = view.timestamp_at(pos).unwrap_or(0);
                if let Some(start) = start_ms {
                    if timestamp_ms < start {
                        progress.inc(1);
                        continue;
                    }
                }
                if let Some(end) = end_ms {
                    if timestamp_ms > end {
                        progress.inc(1);
                        continue;
                    }
                }

                let Some(messages) = view.frames().messages_of(pos) else {
                    progress.inc(1);
                    continue;
                };

                let mut artifacts = Vec::new();
                for message in messages.iter() {
                    let class_name = log.class_name_of(message);
                    let value = log.decode_message(message.abs_message_index).ok();

                    if let Some(name) = &class_name {
                        if name.contains("Image") {
                            let raw = log.raw_body_bytes(message);
                            let out = thread_dir.join(format!(
                                "frame-{abs_frame_index:08}-msg-{}.{}",
                                message.abs_message_index,
                                sink.extension()
                            ));
                            sink.write(name, raw, &out)?;
                        }
                    }

                    artifacts.push(MessageArtifact {
                        abs_message_index: message.abs_message_index,
                        class_name,
                        value,
                    });
                }

                let frame_artifact = FrameArtifact {
                    abs_frame_index,
                    thread: thread.clone(),
                    timestamp_ms,
                    messages: artifacts,
                };
                let json = serde_json::to_string_pretty(&frame_artifact)?;
                fs::write(thread_dir.join(format!("frame-{abs_frame_index:08}.json")), json)?;
                written += 1;
                progress.inc(1);
            }
        }

        progress.finish_with_message(format!("{written} frames written"));
        if self.profile {
            eprintln!("parsed {written} frames in {}", format_duration_ms(started.elapsed().as_millis() as u64));
        }
        Ok(())
    }
}
