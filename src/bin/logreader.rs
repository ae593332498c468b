// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # logreader CLI
//!
//! Command-line driver for the bulk parser and a quick chunk/thread
//! inspector.
//!
//! ## Usage
//!
//! ```sh
//! # Show chunk/thread summary
//! logreader inspect game.log
//!
//! # Decode every frame on two threads into output/game/<thread>/
//! logreader parse game.log --threads Upper,Motion
//!
//! # Restrict to a time window, using 8 worker threads
//! logreader parse game.log --start-time 1:02.500 --end-time 2:00 --numworkers 8
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{InspectCmd, ParseCmd};
use common::Result;

/// logreader - reader and bulk decoder for chunked telemetry logs.
#[derive(Parser, Clone)]
#[command(name = "logreader")]
#[command(about = "Reader and indexer for chunked robot telemetry logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Decode frames into per-frame JSON (and per-image artifacts)
    Parse(ParseCmd),

    /// Show chunk summary, thread list, and frame/message counts
    Inspect(InspectCmd),
}

fn run_inspect(cmd: InspectCmd) -> Result<()> {
    cmd.run()
}

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Parse(cmd) => cmd.run(),
        Commands::Inspect(cmd) => match run_inspect(cmd) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
    };

    process::exit(code);
}
