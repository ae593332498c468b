// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Crate-wide error type.
//!
//! One flat enum covering every fallible path in the log engine: stream
//! reads, chunk parsing, schema lookups, index validation, and accessor
//! bounds checks. Structural/per-message errors carry enough context to be
//! logged and reported without aborting a bulk parse (see `crate::parse`).

use std::fmt;
use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogError>;

#[derive(Debug)]
pub enum LogError {
    Io {
        context: String,
        source: std::io::Error,
    },
    BadMagic {
        offset: u64,
        byte: u8,
    },
    BadSettingsVersion {
        got: u32,
    },
    BadIndicesVersion {
        got: u32,
    },
    ContentTruncated {
        at_byte: u64,
    },
    MessageIdOutOfRange {
        log_id: u8,
        table_len: usize,
    },
    FrameMismatch {
        reason: String,
        abs_frame_index: u64,
    },
    EndOfStream {
        requested: usize,
        available: usize,
        cursor: u64,
    },
    EnumRange {
        value: u8,
        enum_name: String,
        max: usize,
    },
    SchemaError {
        type_name: String,
        reason: String,
    },
    BufferNotFullyConsumed {
        consumed: usize,
        expected: usize,
        type_name: String,
    },
    AccessorOutOfRange {
        index: u64,
        len: u64,
    },
    MissingIndexFile {
        path: PathBuf,
    },
    CacheLoadFailed {
        path: PathBuf,
        reason: String,
    },
    Unsupported {
        feature: String,
    },
    Other(String),
}

impl LogError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LogError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn schema(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        LogError::SchemaError {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn frame_mismatch(reason: impl Into<String>, abs_frame_index: u64) -> Self {
        LogError::FrameMismatch {
            reason: reason.into(),
            abs_frame_index,
        }
    }

    /// Short machine-stable name of the variant, used as a `tracing` field and
    /// in CLI output (spec: "the error kind").
    pub fn kind_name(&self) -> &'static str {
        match self {
            LogError::Io { .. } => "io",
            LogError::BadMagic { .. } => "bad_magic",
            LogError::BadSettingsVersion { .. } => "bad_settings_version",
            LogError::BadIndicesVersion { .. } => "bad_indices_version",
            LogError::ContentTruncated { .. } => "content_truncated",
            LogError::MessageIdOutOfRange { .. } => "message_id_out_of_range",
            LogError::FrameMismatch { .. } => "frame_mismatch",
            LogError::EndOfStream { .. } => "end_of_stream",
            LogError::EnumRange { .. } => "enum_range",
            LogError::SchemaError { .. } => "schema_error",
            LogError::BufferNotFullyConsumed { .. } => "buffer_not_fully_consumed",
            LogError::AccessorOutOfRange { .. } => "accessor_out_of_range",
            LogError::MissingIndexFile { .. } => "missing_index_file",
            LogError::CacheLoadFailed { .. } => "cache_load_failed",
            LogError::Unsupported { .. } => "unsupported",
            LogError::Other(_) => "other",
        }
    }

    /// Structured fields for `tracing` call sites.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("kind", self.kind_name().to_string())];
        match self {
            LogError::Io { context, source } => {
                fields.push(("context", context.clone()));
                fields.push(("source", source.to_string()));
            }
            LogError::BadMagic { offset, byte } => {
                fields.push(("offset", offset.to_string()));
                fields.push(("byte", format!("0x{byte:02x}")));
            }
            LogError::BadSettingsVersion { got } => fields.push(("got", got.to_string())),
            LogError::BadIndicesVersion { got } => fields.push(("got", got.to_string())),
            LogError::ContentTruncated { at_byte } => {
                fields.push(("at_byte", at_byte.to_string()))
            }
            LogError::MessageIdOutOfRange { log_id, table_len } => {
                fields.push(("log_id", log_id.to_string()));
                fields.push(("table_len", table_len.to_string()));
            }
            LogError::FrameMismatch {
                reason,
                abs_frame_index,
            } => {
                fields.push(("reason", reason.clone()));
                fields.push(("abs_frame_index", abs_frame_index.to_string()));
            }
            LogError::EndOfStream {
                requested,
                available,
                cursor,
            } => {
                fields.push(("requested", requested.to_string()));
                fields.push(("available", available.to_string()));
                fields.push(("cursor", cursor.to_string()));
            }
            LogError::EnumRange {
                value,
                enum_name,
                max,
            } => {
                fields.push(("value", value.to_string()));
                fields.push(("enum_name", enum_name.clone()));
                fields.push(("max", max.to_string()));
            }
            LogError::SchemaError { type_name, reason } => {
                fields.push(("type_name", type_name.clone()));
                fields.push(("reason", reason.clone()));
            }
            LogError::BufferNotFullyConsumed {
                consumed,
                expected,
                type_name,
            } => {
                fields.push(("consumed", consumed.to_string()));
                fields.push(("expected", expected.to_string()));
                fields.push(("type_name", type_name.clone()));
            }
            LogError::AccessorOutOfRange { index, len } => {
                fields.push(("index", index.to_string()));
                fields.push(("len", len.to_string()));
            }
            LogError::MissingIndexFile { path } => {
                fields.push(("path", path.display().to_string()))
            }
            LogError::CacheLoadFailed { path, reason } => {
                fields.push(("path", path.display().to_string()));
                fields.push(("reason", reason.clone()));
            }
            LogError::Unsupported { feature } => fields.push(("feature", feature.clone())),
            LogError::Other(msg) => fields.push(("message", msg.clone())),
        }
        fields
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io { context, source } => write!(f, "I/O error during {context}: {source}"),
            LogError::BadMagic { offset, byte } => {
                write!(f, "unrecognized chunk magic 0x{byte:02x} at offset {offset}")
            }
            LogError::BadSettingsVersion { got } => {
                write!(f, "settings chunk version {got} != 1")
            }
            LogError::BadIndicesVersion { got } => {
                write!(f, "indices chunk version {got} != 2")
            }
            LogError::ContentTruncated { at_byte } => {
                write!(f, "content chunk truncated at byte {at_byte}")
            }
            LogError::MessageIdOutOfRange { log_id, table_len } => write!(
                f,
                "message id {log_id} out of range for a {table_len}-entry message-id table"
            ),
            LogError::FrameMismatch {
                reason,
                abs_frame_index,
            } => write!(f, "frame {abs_frame_index}: {reason}"),
            LogError::EndOfStream {
                requested,
                available,
                cursor,
            } => write!(
                f,
                "end of stream: requested {requested} bytes, {available} available at cursor {cursor}"
            ),
            LogError::EnumRange {
                value,
                enum_name,
                max,
            } => write!(f, "enum {enum_name}: value {value} >= {max} variants"),
            LogError::SchemaError { type_name, reason } => {
                write!(f, "schema error for type '{type_name}': {reason}")
            }
            LogError::BufferNotFullyConsumed {
                consumed,
                expected,
                type_name,
            } => write!(
                f,
                "decoding '{type_name}' consumed {consumed} bytes, expected {expected}"
            ),
            LogError::AccessorOutOfRange { index, len } => {
                write!(f, "accessor index {index} out of range (len {len})")
            }
            LogError::MissingIndexFile { path } => {
                write!(f, "missing index file: {}", path.display())
            }
            LogError::CacheLoadFailed { path, reason } => write!(
                f,
                "failed to load cached representation from {}: {reason}",
                path.display()
            ),
            LogError::Unsupported { feature } => write!(f, "unsupported: {feature}"),
            LogError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io {
            context: "i/o".to_string(),
            source: err,
        }
    }
}
