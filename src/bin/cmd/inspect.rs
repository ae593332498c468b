// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show chunk summary, thread list, frame/message counts.

use std::path::PathBuf;

use clap::Args;

use crate::common::{open_log, Result};

#[derive(Args, Clone, Debug)]
pub struct InspectCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        let log = open_log(&self.input, None)?;

        println!("=== {} ===", self.input.display());
        println!("Settings: {:?}", log.settings());
        println!("Frames: {}", log.frame_count());
        println!("Messages: {}", log.message_count());
        println!("Large file: {}", log.is_large_file());
        println!();

        println!("Threads:");
        for thread in log.thread_names() {
            let view = log.thread_view(thread);
            println!("  {thread}: {} frames", view.len());
        }

        if let Some(indices) = log.indices_chunk() {
            println!();
            println!("Indices chunk: {} entries", indices.frame_offsets.len());
        }

        Ok(())
    }
}
