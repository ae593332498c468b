// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The indexed in-memory tree: an owned [`instance::LogInstance`] plus the
//! lightweight [`accessor`] cursors views are built from.

pub mod accessor;
pub mod arena;
pub mod cache;
pub mod instance;

pub use accessor::{FrameAccessor, IndexMap, MessageAccessor};
pub use arena::LogArena;
pub use cache::LruCache;
pub use instance::LogInstance;
