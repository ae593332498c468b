// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `TypeInfoChunk` parser (spec §3, §4.B): builds the raw primitive/class/
//! enum tables, then hands them to `TypeRegistry::build` which demangles
//! and precomputes read plans.

use crate::error::Result;
use crate::io::stream::StreamReader;
use crate::schema::registry::TypeRegistry;

pub struct TypeInfoChunk {
    pub needs_unification: bool,
    pub primitives: Vec<String>,
    pub classes: Vec<(String, Vec<(String, String)>)>,
    pub enums: Vec<(String, Vec<String>)>,
}

impl TypeInfoChunk {
    pub fn parse(stream: &mut StreamReader) -> Result<TypeInfoChunk> {
        let raw_prim_count = stream.read_u32()?;
        let needs_unification = raw_prim_count & 0x8000_0000 != 0;
        let prim_count = raw_prim_count & 0x7FFF_FFFF;

        let mut primitives = Vec::with_capacity(prim_count as usize);
        for _ in 0..prim_count {
            primitives.push(stream.read_string()?);
        }

        let class_count = stream.read_u32()?;
        let mut classes = Vec::with_capacity(class_count as usize);
        for _ in 0..class_count {
            let name = stream.read_string()?;
            let attr_count = stream.read_u32()?;
            let mut attrs = Vec::with_capacity(attr_count as usize);
            for _ in 0..attr_count {
                let attr_name = stream.read_string()?;
                let attr_type = stream.read_string()?;
                attrs.push((attr_name, attr_type));
            }
            classes.push((name, attrs));
        }

        let enum_count = stream.read_u32()?;
        let mut enums = Vec::with_capacity(enum_count as usize);
        for _ in 0..enum_count {
            let name = stream.read_string()?;
            let value_count = stream.read_u32()?;
            let mut values = Vec::with_capacity(value_count as usize);
            for _ in 0..value_count {
                values.push(stream.read_string()?);
            }
            enums.push((name, values));
        }

        Ok(TypeInfoChunk {
            needs_unification,
            primitives,
            classes,
            enums,
        })
    }

    pub fn into_registry(self) -> Result<TypeRegistry> {
        TypeRegistry::build(self.primitives, self.classes, self.enums, self.needs_unification)
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
    fn parses_minimal_type_info() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&(0x8000_0001u32).to_le_bytes()); // 1 primitive, flag set
        bytes.extend_from_slice(&encode_string("float"));
        bytes.extend_from_slice(&1u32.to_le_bytes()); // 1 class
        bytes.extend_from_slice(&encode_string("RobotPose"));
        bytes.extend_from_slice(&1u32.to_le_bytes()); // 1 attr
        bytes.extend_from_slice(&encode_string("x"));
        bytes.extend_from_slice(&encode_string("float"));
        bytes.extend_from_slice(&0u32.to_le_bytes()); // 0 enums

        let mut stream = StreamReader::new(&bytes);
        let chunk = TypeInfoChunk::parse(&mut stream).unwrap();
        assert!(chunk.needs_unification);
        assert_eq!(chunk.primitives, vec!["float".to_string()]);
        assert_eq!(chunk.classes.len(), 1);
        assert!(stream.at_end());

        let registry = chunk.into_registry().unwrap();
        assert!(registry.is_class("RobotPose"));
        assert!(registry.is_primitive("float"));
    }
}
