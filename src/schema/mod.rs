// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema catalogue built from a log's `TypeInfoChunk` (spec §3, §4.B):
//! demangled primitive/class/enum names plus a precomputed read plan per
//! class. There is no text-grammar schema format here — every type comes
//! from the binary type-info chunk.

pub mod demangle;
pub mod registry;

pub use demangle::demangle;
pub use registry::{parse_type_expr, ReadPlan, ReadPlanEntry, TypeExpr, TypeRegistry};
