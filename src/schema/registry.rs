// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry built once per log from the `TypeInfoChunk` (spec §4.B).
//!
//! A `RwLock`-guarded name -> schema map with fallible accessors, plus
//! a precomputed read plan per class: an ordered list of decode
//! operations to apply to read a class's fields in declaration order.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{LogError, Result};
use crate::schema::demangle::demangle;

/// A parsed `attrType` string: a base name optionally wrapped in a fixed
/// or dynamic array (spec §3 "Type-name syntax").
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Named(String),
    FixedArray(Box<TypeExpr>, usize),
    DynamicArray(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn base_name(&self) -> &str {
        match self {
            TypeExpr::Named(n) => n,
            TypeExpr::FixedArray(inner, _) => inner.base_name(),
            TypeExpr::DynamicArray(inner) => inner.base_name(),
        }
    }
}

/// Parses a single `T`, `T[N]`, or `T*` type-name expression.
pub fn parse_type_expr(raw: &str) -> Result<TypeExpr> {
    let s = raw.trim();
    if let Some(base) = s.strip_suffix('*') {
        return Ok(TypeExpr::DynamicArray(Box::new(parse_type_expr(base)?)));
    }
    if s.ends_with(']') {
        let open = s.rfind('[').ok_or_else(|| {
            LogError::schema(s, "unbalanced fixed-array type name: missing '['")
        })?;
        let base = &s[..open];
        let count_str = &s[open + 1..s.len() - 1];
        let count: usize = count_str.parse().map_err(|_| {
            LogError::schema(s, format!("fixed-array length '{count_str}' is not a number"))
        })?;
        return Ok(TypeExpr::FixedArray(Box::new(parse_type_expr(base)?), count));
    }
    Ok(TypeExpr::Named(s.to_string()))
}

/// One step of a class's precomputed read plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPlanEntry {
    pub attr_name: String,
    pub resolved_type: TypeExpr,
}

#[derive(Debug, Clone, Default)]
pub struct ReadPlan {
    pub entries: Vec<ReadPlanEntry>,
}

struct RegistryInner {
    primitives: std::collections::HashSet<String>,
    classes: HashMap<String, Vec<(String, String)>>,
    enums: HashMap<String, Vec<String>>,
    read_plans: HashMap<String, ReadPlan>,
    needs_unification: bool,
}

/// Schema catalogue for one log: primitive names, class layouts, enum
/// value tables, and a read plan per class precomputed at construction.
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    /// Builds the registry from the raw tables read from `TypeInfoChunk`.
    /// `needs_unification` is the *clear* state of the top bit of
    /// `primCount` inverted: when the flag is clear, names are demangled.
    pub fn build(
        primitives: Vec<String>,
        classes: Vec<(String, Vec<(String, String)>)>,
        enums: Vec<(String, Vec<String>)>,
        needs_unification: bool,
    ) -> Result<Self> {
        let normalize = |s: &str| -> String {
            if needs_unification {
                s.to_string()
            } else {
                demangle(s)
            }
        };

        let primitives: std::collections::HashSet<String> =
            primitives.iter().map(|p| normalize(p)).collect();

        let mut class_map: HashMap<String, Vec<(String, String)>> = HashMap::new();
        for (name, attrs) in classes {
            let attrs = attrs
                .into_iter()
                .map(|(attr_name, attr_type)| (normalize(&attr_name), normalize(&attr_type)))
                .collect();
            class_map.insert(normalize(&name), attrs);
        }

        let mut enum_map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, values) in enums {
            enum_map.insert(normalize(&name), values);
        }

        let mut read_plans = HashMap::new();
        for (name, attrs) in &class_map {
            let mut entries = Vec::with_capacity(attrs.len());
            for (attr_name, attr_type) in attrs {
                entries.push(ReadPlanEntry {
                    attr_name: attr_name.clone(),
                    resolved_type: parse_type_expr(attr_type)?,
                });
            }
            read_plans.insert(name.clone(), ReadPlan { entries });
        }

        Ok(TypeRegistry {
            inner: RwLock::new(RegistryInner {
                primitives,
                classes: class_map,
                enums: enum_map,
                read_plans,
                needs_unification,
            }),
        })
    }

    pub fn empty() -> Self {
        TypeRegistry {
            inner: RwLock::new(RegistryInner {
                primitives: Default::default(),
                classes: Default::default(),
                enums: Default::default(),
                read_plans: Default::default(),
                needs_unification: true,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        self.read().primitives.contains(name)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.read().classes.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.read().enums.contains_key(name)
    }

    pub fn enum_values(&self, name: &str) -> Result<Vec<String>> {
        self.read()
            .enums
            .get(name)
            .cloned()
            .ok_or_else(|| LogError::schema(name, "unknown enum type"))
    }

    pub fn read_plan(&self, class_name: &str) -> Result<ReadPlan> {
        self.read()
            .read_plans
            .get(class_name)
            .cloned()
            .ok_or_else(|| LogError::schema(class_name, "unknown class type"))
    }

    pub fn class_names(&self) -> Vec<String> {
        self.read().classes.keys().cloned().collect()
    }

    pub fn needs_unification(&self) -> bool {
        self.read().needs_unification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_named_type() {
        assert_eq!(parse_type_expr("RobotPose").unwrap(), TypeExpr::Named("RobotPose".into()));
    }

    #[test]
    fn parses_fixed_array() {
        let e = parse_type_expr("float[3]").unwrap();
        assert_eq!(e, TypeExpr::FixedArray(Box::new(TypeExpr::Named("float".into())), 3));
    }

    #[test]
    fn parses_dynamic_array() {
        let e = parse_type_expr("RobotPose*").unwrap();
        assert_eq!(e, TypeExpr::DynamicArray(Box::new(TypeExpr::Named("RobotPose".into()))));
    }

    #[test]
    fn read_plan_is_precomputed_in_declared_order() {
        let reg = TypeRegistry::build(
            vec!["float".into(), "int32".into()],
            vec![(
                "RobotPose".into(),
                vec![
                    ("x".into(), "float".into()),
                    ("y".into(), "float".into()),
                    ("rotation".into(), "float[3]".into()),
                ],
            )],
            vec![],
            true,
        )
        .unwrap();
        let plan = reg.read_plan("RobotPose").unwrap();
        assert_eq!(plan.entries.len(), 3);
        assert_eq!(plan.entries[0].attr_name, "x");
        assert_eq!(plan.entries[2].resolved_type, TypeExpr::FixedArray(Box::new(TypeExpr::Named("float".into())), 3));
    }

    #[test]
    fn demangles_when_unification_flag_clear() {
        let reg = TypeRegistry::build(
            vec!["std::__1::string".into()],
            vec![],
            vec![],
            false,
        )
        .unwrap();
        assert!(reg.is_primitive("std::string"));
        assert!(!reg.is_primitive("std::__1::string"));
    }

    #[test]
    fn unknown_class_is_schema_error() {
        let reg = TypeRegistry::empty();
        assert!(reg.read_plan("Nope").is_err());
    }
}
