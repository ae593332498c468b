// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `MessageIDsChunk` parser and the `logId <-> canonical name` table it
//! produces (spec §3). The frame splitter (component E) only cares about
//! two canonical roles, `idFrameBegin`/`idFrameFinished`, so "canonical
//! id" here is the alias-normalized name string rather than a fixed,
//! exhaustively-enumerated representation registry.

use crate::error::Result;
use crate::io::stream::StreamReader;

/// Sentinel `logId` meaning "no MessageID assigned" (spec §4.E: `m.logId
/// == 255` is always out of range because `count` is a `u8`, so valid ids
/// only ever occupy `0..count`, `count <= 255`).
pub const MISSING_MESSAGE_ID: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    FrameBegin,
    FrameFinished,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageIdTable {
    /// Log-local name for each `logId`, indexed by `logId`.
    names: Vec<String>,
}

fn canonicalize_alias(name: &str) -> &str {
    match name {
        "idProcessBegin" => "idFrameBegin",
        "idProcessFinished" => "idFrameFinished",
        other => other,
    }
}

impl MessageIdTable {
    pub fn parse(stream: &mut StreamReader) -> Result<MessageIdTable> {
        let count = stream.read_u8()?;
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            names.push(stream.read_string()?);
        }
        Ok(MessageIdTable { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The alias-normalized canonical name for `log_id`, or `None` if out
    /// of range (spec: "unknown names map to undefined").
    pub fn canonical_name(&self, log_id: u8) -> Option<&str> {
        self.names
            .get(log_id as usize)
            .map(|n| canonicalize_alias(n.as_str()))
    }

    /// The log-local (pre-alias) name as written in the file.
    pub fn local_name(&self, log_id: u8) -> Option<&str> {
        self.names.get(log_id as usize).map(String::as_str)
    }

    pub fn role(&self, log_id: u8) -> MessageRole {
        match self.canonical_name(log_id) {
            Some("idFrameBegin") => MessageRole::FrameBegin,
            Some("idFrameFinished") => MessageRole::FrameFinished,
            _ => MessageRole::Other,
        }
    }

    /// The representation's class name: the canonical name with its
    /// leading `id` prefix stripped (spec §3 "Message").
    pub fn class_name(&self, log_id: u8) -> Option<String> {
        self.canonical_name(log_id)
            .map(|n| n.strip_prefix("id").unwrap_or(n).to_string())
    }

    pub fn log_id_for_canonical(&self, canonical: &str) -> Option<u8> {
        self.names
            .iter()
            .position(|n| canonicalize_alias(n) == canonical)
            .map(|idx| idx as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_table(names: &[&str]) -> Vec<u8> {
        let mut bytes = vec![names.len() as u8];
        for n in names {
            bytes.extend_from_slice(&(n.len() as u32).to_le_bytes());
            bytes.extend_from_slice(n.as_bytes());
        }
        bytes
    }

    #[test]
    fn parses_names_in_order() {
        let bytes = encode_table(&["idFrameBegin", "idFrameFinished", "idRobotPose"]);
        let mut stream = StreamReader::new(&bytes);
        let table = MessageIdTable::parse(&mut stream).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.class_name(2).as_deref(), Some("RobotPose"));
    }

    #[test]
    fn aliases_resolve_to_canonical_role() {
        let bytes = encode_table(&["idProcessBegin", "idProcessFinished"]);
        let mut stream = StreamReader::new(&bytes);
        let table = MessageIdTable::parse(&mut stream).unwrap();
        assert_eq!(table.role(0), MessageRole::FrameBegin);
        assert_eq!(table.role(1), MessageRole::FrameFinished);
        assert_eq!(table.canonical_name(0), Some("idFrameBegin"));
    }

    #[test]
    fn out_of_range_id_is_undefined() {
        let bytes = encode_table(&["idFrameBegin"]);
        let mut stream = StreamReader::new(&bytes);
        let table = MessageIdTable::parse(&mut stream).unwrap();
        assert_eq!(table.role(200), MessageRole::Other);
        assert_eq!(table.canonical_name(200), None);
    }
}
