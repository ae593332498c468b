// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # logreader
//!
//! Reader and indexer for chunked robot telemetry logs: a memory-mapped
//! chunk scanner, a schema-driven decoder for the type-info chunk's
//! classes/enums, a persistent two-level frame/message index that resumes
//! instead of rescanning, and a parallel bulk parser over the result.
//!
//! ## Example: opening a log and walking its frames
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use logreader::{Log, LogReaderConfig};
//!
//! let log = Log::open("game.log", LogReaderConfig::default())?;
//! for thread in log.thread_names() {
//!     let view = log.thread_view(thread);
//!     println!("{thread}: {} frames", view.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The chunk/frame/message data model, the chunk dispatch loop, and the
//! index repair/resume rules are documented alongside their
//! implementations in [`chunks`], [`content`], and [`index`].

pub mod chunks;
pub mod config;
pub mod content;
pub mod decode;
pub mod error;
pub mod image_stub;
pub mod index;
pub mod io;
pub mod log;
pub mod parse;
pub mod schema;
pub mod thread;
pub mod tree;

pub use config::LogReaderConfig;
pub use error::{LogError, Result};
pub use image_stub::{ImageSink, PassthroughSink};
pub use log::{ChunkKey, ChunkRef, Log};
