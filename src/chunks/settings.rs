// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `SettingsChunk` parser (spec §3, §4.D).

use crate::error::{LogError, Result};
use crate::io::stream::StreamReader;

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChunk {
    pub setting_version: u32,
    pub head_name: String,
    pub body_name: String,
    pub player_number: i32,
    pub location: String,
    pub scenario: String,
}

impl SettingsChunk {
    /// Parses the chunk body. `stream` must be positioned right after the
    /// magic byte.
    pub fn parse(stream: &mut StreamReader) -> Result<SettingsChunk> {
        let setting_version = stream.read_u32()?;
        if setting_version != 1 {
            return Err(LogError::BadSettingsVersion { got: setting_version });
        }
        Ok(SettingsChunk {
            setting_version,
            head_name: stream.read_string()?,
            body_name: stream.read_string()?,
            player_number: stream.read_i32()?,
            location: stream.read_string()?,
            scenario: stream.read_string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_string(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn parses_in_declared_order() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&encode_string("Nao"));
        bytes.extend_from_slice(&encode_string("NaoV6"));
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.extend_from_slice(&encode_string("RoboCupField"));
        bytes.extend_from_slice(&encode_string("Default"));
        let mut stream = StreamReader::new(&bytes);
        let chunk = SettingsChunk::parse(&mut stream).unwrap();
        assert_eq!(chunk.head_name, "Nao");
        assert_eq!(chunk.player_number, 5);
        assert_eq!(chunk.scenario, "Default");
        assert!(stream.at_end());
    }

    #[test]
    fn rejects_bad_version() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        let mut stream = StreamReader::new(&bytes);
        assert!(matches!(
            SettingsChunk::parse(&mut stream),
            Err(LogError::BadSettingsVersion { got: 2 })
        ));
    }
}
