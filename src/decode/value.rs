// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The generic decoded value tree (spec §4.C, §9 "Polymorphism via tagged
//! variants"): a tagged-sum enum over scalars, sequences, and structs,
//! serde-serializable for the JSON frame dump (spec §6 output artifacts).

use serde::{Deserialize, Serialize};

use crate::io::stream::Angle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    SizeT(u64),
    Angle(f32),
    Str(String),
}

impl Scalar {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scalar::Bool(_) | Scalar::Str(_))
    }
}

impl From<Angle> for Scalar {
    fn from(a: Angle) -> Self {
        Scalar::Angle(a.0)
    }
}

/// The result of `Decoder::read_value`: a primitive scalar, a homogeneous
/// sequence (fixed or dynamic array, or string-array element), a named
/// enum variant, or a struct built from a class's read plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Enum { enum_name: String, index: u8, variant: String },
    Struct { type_name: String, fields: Vec<(String, Value)> },
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self.as_scalar()? {
            Scalar::U32(v) => Some(*v),
            Scalar::SizeT(v) => Some(*v as u32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_scalar()? {
            Scalar::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Struct { type_name, .. } => Some(type_name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_field_lookup() {
        let v = Value::Struct {
            type_name: "FrameInfo".into(),
            fields: vec![("time".into(), Value::Scalar(Scalar::U32(1000)))],
        };
        assert_eq!(v.as_struct_field("time").and_then(Value::as_u32), Some(1000));
        assert_eq!(v.as_struct_field("missing"), None);
    }

    #[test]
    fn scalar_is_numeric() {
        assert!(Scalar::F32(1.0).is_numeric());
        assert!(!Scalar::Bool(true).is_numeric());
        assert!(!Scalar::Str("x".into()).is_numeric());
    }
}
