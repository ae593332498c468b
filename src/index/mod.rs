// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Persistent two-level index (spec §4.F): an append-only message index and
//! an append-only frame index, combined by [`engine::IndexEngine`] into a
//! validate/repair/resume pipeline.

pub mod engine;
pub mod frame_index;
pub mod message_index;

pub use engine::{IndexEngine, ResumePoint};
pub use frame_index::{FrameIndexFile, FrameIndexRecord};
pub use message_index::{MessageIndexFile, MessageIndexRecord};
