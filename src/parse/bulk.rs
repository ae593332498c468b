// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parallel bulk decoding of every message in a log: a bounded
//! `rayon::ThreadPoolBuilder` pool, stateless per-item workers, results
//! collected and reapplied in input order so callers never see chunks
//! out of sequence.

use rayon::prelude::*;

use crate::chunks::message_ids::MessageIdTable;
use crate::config::LogReaderConfig;
use crate::decode::decoder::Decoder;
use crate::decode::value::Value;
use crate::error::{LogError, Result};
use crate::index::MessageIndexRecord;
use crate::io::stream::StreamReader;
use crate::parse::cache::ReprCache;
use crate::schema::registry::TypeRegistry;

pub struct ParseReport {
    pub failed: Vec<(u64, LogError)>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Decodes every message in `records` against `data`, using `id_table` to
/// resolve each message's class name and `registry` to decode it. Workers
/// are stateless: each message is read and decoded independently, then
/// results are placed back at their original position so output order
/// matches `records` order regardless of completion order.
pub fn parse_all(
    data: &[u8],
    records: &[MessageIndexRecord],
    id_table: &MessageIdTable,
    registry: &TypeRegistry,
    config: &LogReaderConfig,
    cache: Option<&ReprCache>,
) -> Result<(Vec<Option<Value>>, ParseReport)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.resolved_num_workers())
        .thread_name(|index| format!("logreader-parse-{index}"))
        .build()
        .map_err(|e| LogError::Other(format!("building worker pool: {e}")))?;

    let decoder = Decoder::new(registry);

    let results: Vec<(u64, std::result::Result<Value, LogError>)> = pool.install(|| {
        records
            .par_iter()
            .map(|record| {
                let idx = record.abs_message_index;
                if let Some(cache) = cache {
                    if let Ok(Some(cached)) = cache.load(idx) {
                        return (idx, Ok(cached));
                    }
                }
                let outcome = decode_one(data, record, id_table, &decoder);
                if let (Some(cache), Ok(value)) = (cache, &outcome) {
                    let _ = cache.store(idx, value);
                }
                (idx, outcome)
            })
            .collect()
    });

    let mut values = vec![None; results.len()];
    let mut failed = Vec::new();
    for (idx, outcome) in results {
        match outcome {
            Ok(value) => {
                if let Some(pos) = records.iter().position(|r| r.abs_message_index == idx) {
                    values[pos] = Some(value);
                }
            }
            Err(e) => {
                tracing::warn!(abs_message_index = idx, error = %e, "failed to decode message");
                failed.push((idx, e));
            }
        }
    }

    Ok((values, ParseReport { failed }))
}

/// Decodes a single message on demand (the root façade's accessor-mode
/// path: an LRU miss falls back here instead of joining a bulk pass).
pub fn decode_message(
    data: &[u8],
    record: &MessageIndexRecord,
    id_table: &MessageIdTable,
    registry: &TypeRegistry,
) -> Result<Value> {
    let decoder = Decoder::new(registry);
    decode_one(data, record, id_table, &decoder)
}

fn decode_one(
    data: &[u8],
    record: &MessageIndexRecord,
    id_table: &MessageIdTable,
    decoder: &Decoder,
) -> std::result::Result<Value, LogError> {
    let mut header_reader = StreamReader::at(data, record.start_byte as usize);
    let (log_id, payload_size) = header_reader.read_message_header()?;
    let class_name = id_table
        .class_name(log_id)
        .ok_or_else(|| LogError::MessageIdOutOfRange { log_id, table_len: id_table.len() })?;
    let body_start = record.start_byte as usize + 4;
    let body_end = record.end_byte as usize;
    let mut body_reader = StreamReader::at(data, body_start);
    let value = decoder.read_top_level(&class_name, &mut body_reader, payload_size)?;
    debug_assert_eq!(body_start + payload_size as usize, body_end);
    Ok(value)
}
