// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven decoder (spec §4.C). Entry point `read_value` recurses
//! over a resolved `TypeExpr`, dispatching in the order fixed array,
//! dynamic array, primitive, enum, class — with `Annotation`, `FrameBegin`,
//! and `FrameFinished` handled as special-cased classes.
//!
//! Direct recursion rather than a flat op-list walk, since this format's
//! read plan is a tree of named types rather than a fixed wire layout.

use crate::decode::value::{Scalar, Value};
use crate::error::{LogError, Result};
use crate::io::stream::StreamReader;
use crate::schema::registry::{ReadPlan, TypeExpr, TypeRegistry};

pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Decoder { registry }
    }

    /// Decodes a value whose declared type is `type_name`, reading from
    /// `stream`. Does not enforce the "fully consumed" invariant — callers
    /// decoding a top-level message use `read_top_level`.
    pub fn read_value(&self, type_name: &str, stream: &mut StreamReader) -> Result<Value> {
        self.read_expr(&TypeExpr::Named(type_name.to_string()), stream)
    }

    fn read_expr(&self, expr: &TypeExpr, stream: &mut StreamReader) -> Result<Value> {
        match expr {
            TypeExpr::FixedArray(inner, n) => {
                let mut items = Vec::with_capacity(*n);
                for _ in 0..*n {
                    items.push(self.read_expr(inner, stream)?);
                }
                Ok(Value::Sequence(items))
            }
            TypeExpr::DynamicArray(inner) => {
                let n = stream.read_u32()? as usize;
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(self.read_expr(inner, stream)?);
                }
                Ok(Value::Sequence(items))
            }
            TypeExpr::Named(name) => self.read_named(name, stream),
        }
    }

    fn read_named(&self, name: &str, stream: &mut StreamReader) -> Result<Value> {
        if let Some(scalar) = read_primitive(name, stream)? {
            return Ok(Value::Scalar(scalar));
        }
        if self.registry.is_enum(name) {
            return self.read_enum(name, stream);
        }
        match name {
            "FrameBegin" | "FrameFinished" => return self.read_frame_marker(name, stream),
            _ => {}
        }
        if self.registry.is_class(name) {
            return self.read_class(name, stream);
        }
        Err(LogError::schema(name, "not a known primitive, enum, or class"))
    }

    fn read_enum(&self, name: &str, stream: &mut StreamReader) -> Result<Value> {
        let values = self.registry.enum_values(name)?;
        let idx = stream.read_u8()?;
        if idx as usize >= values.len() {
            return Err(LogError::EnumRange {
                value: idx,
                enum_name: name.to_string(),
                max: values.len(),
            });
        }
        Ok(Value::Enum {
            enum_name: name.to_string(),
            index: idx,
            variant: values[idx as usize].clone(),
        })
    }

    fn read_class(&self, name: &str, stream: &mut StreamReader) -> Result<Value> {
        if name == "Annotation" {
            // Annotation's true layout needs payload_end; callers that
            // reach a bare Annotation through a nested field (rather than
            // a top-level message) get the best-effort variant that treats
            // the remainder of `stream`'s backing slice as the text, which
            // is only correct when Annotation is itself the top-level type.
            let end = stream.size();
            return self.read_annotation(stream, end);
        }
        let plan: ReadPlan = self.registry.read_plan(name)?;
        let mut fields = Vec::with_capacity(plan.entries.len());
        for entry in &plan.entries {
            let value = self.read_expr(&entry.resolved_type, stream)?;
            fields.push((entry.attr_name.clone(), value));
        }
        Ok(Value::Struct {
            type_name: name.to_string(),
            fields,
        })
    }

    fn read_frame_marker(&self, name: &str, stream: &mut StreamReader) -> Result<Value> {
        let thread_name = stream.read_string()?;
        Ok(Value::Struct {
            type_name: name.to_string(),
            fields: vec![("threadName".to_string(), Value::Scalar(Scalar::Str(thread_name)))],
        })
    }

    /// `Annotation`'s irregular layout (spec §4.C): `annotationNumber: u32`
    /// unsigned; if its top bit is *clear*, a `frame: u32` follows; the
    /// remaining bytes up to `payload_end` are shell-tokenized ASCII text
    /// whose first token is `name` and whose remaining tokens (rejoined
    /// with single spaces) are `annotation`. The top bit is then cleared
    /// from the returned `annotationNumber`.
    ///
    /// `payload_end` is the absolute stream position one past the
    /// message's declared payload (confirmed against
    /// `original_source/LogInterface/DataClasses/Annotation.py`, which
    /// reads text to `sutil.size() - sutil.tell()`, i.e. to the end of the
    /// enclosing message, not a separately length-prefixed string).
    pub fn read_annotation(&self, stream: &mut StreamReader, payload_end: u64) -> Result<Value> {
        let raw_number = stream.read_u32()?;
        let has_frame = raw_number & 0x8000_0000 == 0;
        let frame = if has_frame { Some(stream.read_u32()?) } else { None };
        let annotation_number = raw_number & 0x7FFF_FFFF;

        let remaining = (payload_end - stream.tell()) as usize;
        let text_bytes = stream.read(remaining)?;
        let text = String::from_utf8_lossy(text_bytes);
        let tokens = shell_tokenize(&text);
        let (name, annotation) = match tokens.split_first() {
            Some((first, rest)) => (first.clone(), rest.join(" ")),
            None => (String::new(), String::new()),
        };

        let mut fields = vec![
            ("annotationNumber".to_string(), Value::Scalar(Scalar::U32(annotation_number))),
            ("name".to_string(), Value::Scalar(Scalar::Str(name))),
            ("annotation".to_string(), Value::Scalar(Scalar::Str(annotation))),
        ];
        if let Some(frame) = frame {
            fields.push(("frame".to_string(), Value::Scalar(Scalar::U32(frame))));
        }
        Ok(Value::Struct {
            type_name: "Annotation".to_string(),
            fields,
        })
    }

    /// Top-level decode: reads `type_name` from `stream` and enforces that
    /// every byte of `payload_size` was consumed (spec §4.C: "On a
    /// terminal (top-level) read, unused bytes in the expected payload
    /// window are an error").
    pub fn read_top_level(
        &self,
        type_name: &str,
        stream: &mut StreamReader,
        payload_size: u32,
    ) -> Result<Value> {
        let start = stream.tell();
        let value = if type_name == "Annotation" {
            self.read_annotation(stream, start + payload_size as u64)?
        } else {
            self.read_value(type_name, stream)?
        };
        let consumed = (stream.tell() - start) as usize;
        if consumed != payload_size as usize {
            return Err(LogError::BufferNotFullyConsumed {
                consumed,
                expected: payload_size as usize,
                type_name: type_name.to_string(),
            });
        }
        Ok(value)
    }
}

/// Maps a (possibly demangled) primitive type name to a scalar reader.
/// Names follow the wire's C-type naming plus `size_t`/`string` aliases.
fn read_primitive(name: &str, stream: &mut StreamReader) -> Result<Option<Scalar>> {
    Ok(Some(match name {
        "bool" => Scalar::Bool(stream.read_bool()?),
        "unsigned char" | "u8" | "uint8" => Scalar::U8(stream.read_u8()?),
        "char" | "signed char" | "i8" | "int8" => Scalar::I8(stream.read_i8()?),
        "unsigned short" | "u16" | "uint16" => Scalar::U16(stream.read_u16()?),
        "short" | "i16" | "int16" => Scalar::I16(stream.read_i16()?),
        "unsigned int" | "u32" | "uint32" => Scalar::U32(stream.read_u32()?),
        "int" | "i32" | "int32" => Scalar::I32(stream.read_i32()?),
        "unsigned long" | "u64" | "uint64" => Scalar::U64(stream.read_u64()?),
        "long" | "i64" | "int64" => Scalar::I64(stream.read_i64()?),
        "float" | "f32" => Scalar::F32(stream.read_f32()?),
        "double" | "f64" => Scalar::F64(stream.read_f64()?),
        "size_t" | "SizeT" => Scalar::SizeT(stream.read_size_t()?),
        "Angle" => Scalar::Angle(stream.read_f32()?),
        "std::string" | "string" => Scalar::Str(stream.read_string()?),
        _ => return Ok(None),
    }))
}

/// Shell-style tokenizer respecting double-quoted strings, matching
/// `shlex.shlex(..., whitespace_split=True)` used by the original
/// `Annotation.read`.
fn shell_tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for ch in text.trim_end_matches('\0').chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_registry() -> TypeRegistry {
        TypeRegistry::build(
            vec!["float".into(), "unsigned int".into()],
            vec![(
                "RobotPose".into(),
                vec![
                    ("x".into(), "float".into()),
                    ("y".into(), "float".into()),
                    ("confidence".into(), "unsigned int".into()),
                ],
            )],
            vec![("Role".into(), vec!["Striker".into(), "Goalie".into()])],
            true,
        )
        .unwrap()
    }

    #[test]
    fn decodes_a_class_in_declared_order() {
        let reg = make_registry();
        let decoder = Decoder::new(&reg);
        let mut bytes = vec![];
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&2.5f32.to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        let mut stream = StreamReader::new(&bytes);
        let v = decoder.read_value("RobotPose", &mut stream).unwrap();
        assert_eq!(v.as_struct_field("x").unwrap().as_scalar(), Some(&Scalar::F32(1.5)));
        assert_eq!(v.as_struct_field("confidence").and_then(Value::as_u32), Some(7));
    }

    #[test]
    fn decodes_enum_in_range() {
        let reg = make_registry();
        let decoder = Decoder::new(&reg);
        let bytes = [1u8];
        let mut stream = StreamReader::new(&bytes);
        let v = decoder.read_value("Role", &mut stream).unwrap();
        match v {
            Value::Enum { variant, index, .. } => {
                assert_eq!(variant, "Goalie");
                assert_eq!(index, 1);
            }
            _ => panic!("expected enum"),
        }
    }

    #[test]
    fn enum_out_of_range_is_error() {
        let reg = make_registry();
        let decoder = Decoder::new(&reg);
        let bytes = [5u8];
        let mut stream = StreamReader::new(&bytes);
        assert!(matches!(
            decoder.read_value("Role", &mut stream),
            Err(LogError::EnumRange { .. })
        ));
    }

    #[test]
    fn annotation_top_bit_set_has_no_frame() {
        let reg = TypeRegistry::empty();
        let decoder = Decoder::new(&reg);
        let mut bytes = vec![];
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x80]);
        bytes.extend_from_slice(b"policy_action \"1.0 2.0 3.0\"");
        let end = bytes.len() as u64;
        let mut stream = StreamReader::new(&bytes);
        let v = decoder.read_annotation(&mut stream, end).unwrap();
        assert_eq!(v.as_struct_field("name").and_then(Value::as_str), Some("policy_action"));
        assert_eq!(
            v.as_struct_field("annotation").and_then(Value::as_str),
            Some("1.0 2.0 3.0")
        );
        assert!(v.as_struct_field("frame").is_none());
    }

    #[test]
    fn annotation_top_bit_clear_has_frame() {
        let reg = TypeRegistry::empty();
        let decoder = Decoder::new(&reg);
        let mut bytes = vec![];
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(b"policy_action \"1.0 2.0 3.0\"");
        let end = bytes.len() as u64;
        let mut stream = StreamReader::new(&bytes);
        let v = decoder.read_annotation(&mut stream, end).unwrap();
        assert_eq!(v.as_struct_field("frame").and_then(Value::as_u32), Some(5));
    }

    #[test]
    fn top_level_enforces_full_consumption() {
        let reg = make_registry();
        let decoder = Decoder::new(&reg);
        let bytes = [0u8; 16];
        let mut stream = StreamReader::new(&bytes);
        let err = decoder.read_top_level("RobotPose", &mut stream, 8).unwrap_err();
        assert!(matches!(err, LogError::BufferNotFullyConsumed { .. }));
    }

    #[test]
    fn frame_begin_reads_thread_name() {
        let reg = TypeRegistry::empty();
        let decoder = Decoder::new(&reg);
        let mut bytes = vec![];
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(b"Cognition");
        let mut stream = StreamReader::new(&bytes);
        let v = decoder.read_value("FrameBegin", &mut stream).unwrap();
        assert_eq!(v.as_struct_field("threadName").and_then(Value::as_str), Some("Cognition"));
    }
}
