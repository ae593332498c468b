// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level cursor over a mapped log file's wire format.

pub mod stream;
pub use stream::{pack_queue_header, used_size, Angle, StreamReader, Whence};
