// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `LogInstance`: the owned tree of indexed frames and messages, with the
//! per-thread groupings memoized once at load time. [`super::accessor`]
//! provides the lightweight cursors that views are built from instead of
//! copying this structure around.

use std::collections::HashMap;

use crate::index::{FrameIndexRecord, MessageIndexRecord};
use crate::tree::accessor::{FrameAccessor, IndexMap, MessageAccessor};

pub struct LogInstance {
    frames: Vec<FrameIndexRecord>,
    messages: Vec<MessageIndexRecord>,
    thread_frames: HashMap<String, Vec<u64>>,
}

impl LogInstance {
    pub fn new(frames: Vec<FrameIndexRecord>, messages: Vec<MessageIndexRecord>) -> Self {
        let mut thread_frames: HashMap<String, Vec<u64>> = HashMap::new();
        for frame in &frames {
            thread_frames
                .entry(frame.thread_name.clone())
                .or_default()
                .push(frame.abs_frame_index as u64);
        }
        LogInstance { frames, messages, thread_frames }
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn message_count(&self) -> u64 {
        self.messages.len() as u64
    }

    pub fn frame(&self, abs_index: u64) -> Option<&FrameIndexRecord> {
        self.frames.get(abs_index as usize)
    }

    pub fn message(&self, abs_index: u64) -> Option<&MessageIndexRecord> {
        self.messages.get(abs_index as usize)
    }

    /// The full frame-record slice in recorded order, for callers (the bulk
    /// parser, the root façade) that need to walk it directly rather than
    /// through an accessor.
    pub fn frame_records(&self) -> &[FrameIndexRecord] {
        &self.frames
    }

    /// The full message-record slice in recorded order.
    pub fn message_records(&self) -> &[MessageIndexRecord] {
        &self.messages
    }

    pub fn thread_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.thread_frames.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn frames_for_thread(&self, thread_name: &str) -> Option<&[u64]> {
        self.thread_frames.get(thread_name).map(|v| v.as_slice())
    }

    /// An accessor over every frame, in recorded order.
    pub fn all_frames(&self) -> FrameAccessor<'_> {
        FrameAccessor::new(self, IndexMap::Range(0..self.frame_count()))
    }

    /// An accessor over every message, in recorded order.
    pub fn all_messages(&self) -> MessageAccessor<'_> {
        MessageAccessor::new(self, IndexMap::Range(0..self.message_count()))
    }

    /// An accessor over just the frames belonging to one thread, in the
    /// order they were recorded.
    pub fn frames_of(&self, thread_name: &str) -> FrameAccessor<'_> {
        match self.frames_for_thread(thread_name) {
            Some(indices) => FrameAccessor::new(self, IndexMap::List(indices.to_vec())),
            None => FrameAccessor::new(self, IndexMap::List(Vec::new())),
        }
    }

    /// An accessor over the messages belonging to one frame.
    pub fn messages_of(&self, frame: &FrameIndexRecord) -> MessageAccessor<'_> {
        MessageAccessor::new(self, IndexMap::Range(frame.first_abs_message..frame.end_abs_message))
    }
}
