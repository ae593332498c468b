// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lightweight cursors over a [`super::instance::LogInstance`].
//!
//! An accessor never owns frame or message data; it holds an [`IndexMap`]
//! describing which absolute indices it covers and borrows the instance to
//! resolve them. `copy()` clones the cursor cheaply (a `Range` is just two
//! integers; a `List` clone is the only case that costs anything).
//! `freeze()` materializes a `Range` into an explicit `List` snapshot, so a
//! view handed to a caller does not silently grow if more frames are later
//! indexed into the same instance.

use std::ops::Range;

use crate::index::{FrameIndexRecord, MessageIndexRecord};
use crate::tree::instance::LogInstance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMap {
    Range(Range<u64>),
    List(Vec<u64>),
}

impl IndexMap {
    pub fn len(&self) -> u64 {
        match self {
            IndexMap::Range(r) => r.end.saturating_sub(r.start),
            IndexMap::List(v) => v.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute index at cursor position `pos`.
    pub fn get(&self, pos: u64) -> Option<u64> {
        match self {
            IndexMap::Range(r) => {
                let idx = r.start + pos;
                (idx < r.end).then_some(idx)
            }
            IndexMap::List(v) => v.get(pos as usize).copied(),
        }
    }

    pub fn freeze(&self) -> IndexMap {
        match self {
            IndexMap::Range(r) => IndexMap::List(r.clone().collect()),
            IndexMap::List(v) => IndexMap::List(v.clone()),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        match self {
            IndexMap::Range(r) => Box::new(r.clone()),
            IndexMap::List(v) => Box::new(v.iter().copied()),
        }
    }

    pub fn slice(&self, pos_range: Range<u64>) -> IndexMap {
        match self {
            IndexMap::Range(r) => {
                let start = r.start + pos_range.start.min(r.end - r.start);
                let end = (r.start + pos_range.end).min(r.end);
                IndexMap::Range(start..end.max(start))
            }
            IndexMap::List(v) => {
                let start = pos_range.start as usize;
                let end = (pos_range.end as usize).min(v.len());
                IndexMap::List(v.get(start.min(v.len())..end).map(|s| s.to_vec()).unwrap_or_default())
            }
        }
    }
}

#[derive(Clone)]
pub struct FrameAccessor<'a> {
    instance: &'a LogInstance,
    index_map: IndexMap,
}

impl<'a> FrameAccessor<'a> {
    pub fn new(instance: &'a LogInstance, index_map: IndexMap) -> Self {
        FrameAccessor { instance, index_map }
    }

    pub fn len(&self) -> u64 {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }

    pub fn get(&self, pos: u64) -> Option<&'a FrameIndexRecord> {
        self.index_map.get(pos).and_then(|idx| self.instance.frame(idx))
    }

    pub fn copy(&self) -> FrameAccessor<'a> {
        FrameAccessor { instance: self.instance, index_map: self.index_map.clone() }
    }

    pub fn freeze(&self) -> FrameAccessor<'a> {
        FrameAccessor { instance: self.instance, index_map: self.index_map.freeze() }
    }

    pub fn slice(&self, pos_range: Range<u64>) -> FrameAccessor<'a> {
        FrameAccessor { instance: self.instance, index_map: self.index_map.slice(pos_range) }
    }

    pub fn messages_of(&self, pos: u64) -> Option<MessageAccessor<'a>> {
        self.get(pos).map(|frame| self.instance.messages_of(frame))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a FrameIndexRecord> + '_ {
        self.index_map.iter().filter_map(move |idx| self.instance.frame(idx))
    }
}

#[derive(Clone)]
pub struct MessageAccessor<'a> {
    instance: &'a LogInstance,
    index_map: IndexMap,
}

impl<'a> MessageAccessor<'a> {
    pub fn new(instance: &'a LogInstance, index_map: IndexMap) -> Self {
        MessageAccessor { instance, index_map }
    }

    pub fn len(&self) -> u64 {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }

    pub fn get(&self, pos: u64) -> Option<&'a MessageIndexRecord> {
        self.index_map.get(pos).and_then(|idx| self.instance.message(idx))
    }

    pub fn copy(&self) -> MessageAccessor<'a> {
        MessageAccessor { instance: self.instance, index_map: self.index_map.clone() }
    }

    pub fn freeze(&self) -> MessageAccessor<'a> {
        MessageAccessor { instance: self.instance, index_map: self.index_map.freeze() }
    }

    pub fn slice(&self, pos_range: Range<u64>) -> MessageAccessor<'a> {
        MessageAccessor { instance: self.instance, index_map: self.index_map.slice(pos_range) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MessageIndexRecord> + '_ {
        self.index_map.iter().filter_map(move |idx| self.instance.message(idx))
    }
}
