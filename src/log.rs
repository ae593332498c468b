// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Root log façade (spec §4.J): owns the memory-mapped log file, the chunk
//! table, the persistent index engine, and the per-log caches. One open
//! call picks a reading strategy and then exposes a uniform accessor
//! surface over it.
//!
//! `open` folds together what spec.md describes as `open()` followed by a
//! mandatory `eval()`: the frame/message index is always built eagerly,
//! since index records are small fixed-size structs independent of
//! message body size. What spec.md's `isLargeFile` flag actually governs
//! here is whether [`Log::parse_bytes`] is worth calling eagerly versus
//! leaning on [`Log::decode_message`]'s on-demand path — see
//! `Log::is_large_file`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::chunks::indices::IndicesChunk;
use crate::chunks::message_ids::MessageIdTable;
use crate::chunks::settings::SettingsChunk;
use crate::chunks::type_info::TypeInfoChunk;
use crate::chunks::{self, ChunkKind};
use crate::config::LogReaderConfig;
use crate::content::frame_splitter::{split_frames, RawFrame};
use crate::content::ContentChunkHeader;
use crate::decode::decoder::Decoder;
use crate::decode::value::Value;
use crate::error::{LogError, Result};
use crate::index::engine::cache_dir_for;
use crate::index::{IndexEngine, MessageIndexRecord};
use crate::io::stream::StreamReader;
use crate::parse::{self, ParseReport, ReprCache};
use crate::schema::registry::TypeRegistry;
use crate::thread::{read_stopwatch, StopwatchRecord, Timer, ThreadView};
use crate::tree::{FrameAccessor, LogArena, LogInstance, LruCache, MessageAccessor};

/// One entry of the chunk table built while scanning the file, in file
/// order (spec §4.D: "the driver loop ... dispatches").
#[derive(Debug, Clone, Copy)]
pub struct ChunkSummary {
    pub kind: ChunkKind,
    /// Absolute offset of the chunk's magic byte.
    pub offset: u64,
}

/// Lookup key for [`Log::chunk`]: spec §4.J says `key` "may be `int`,
/// `name`, or `ChunkKind`".
pub enum ChunkKey<'a> {
    Index(usize),
    Name(&'a str),
    Kind(ChunkKind),
}

/// A borrowed view of one parsed chunk, returned by [`Log::chunk`].
pub enum ChunkRef<'a> {
    Settings(&'a SettingsChunk),
    MessageIds(&'a MessageIdTable),
    TypeInfo(&'a TypeRegistry),
    Content(&'a ContentChunkHeader),
    Indices(&'a IndicesChunk),
}

pub struct Log {
    path: PathBuf,
    arena: LogArena,
    cache_dir: PathBuf,
    output_dir: PathBuf,
    config: LogReaderConfig,
    settings: SettingsChunk,
    id_table: MessageIdTable,
    registry: TypeRegistry,
    content_header: ContentChunkHeader,
    indices_chunk: Option<IndicesChunk>,
    chunk_order: Vec<ChunkSummary>,
    instance: LogInstance,
    declared_timestamps: HashMap<String, Vec<Option<u32>>>,
    timers: HashMap<String, Timer>,
    repr_cache: Option<ReprCache>,
    value_cache: Mutex<LruCache<u64, Value>>,
}

impl Log {
    /// Opens `path`, scans its chunks, resumes the persistent index from
    /// wherever a prior run (if any) left off, and appends any newly
    /// readable frames. Always builds a complete [`LogInstance`] over
    /// every frame/message discovered so far; it is the bulk-decode step
    /// in [`Log::parse_bytes`], not index construction, that the spec's
    /// large-file/accessor-mode distinction is meant to gate.
    pub fn open(path: impl AsRef<Path>, config: LogReaderConfig) -> Result<Log> {
        let path = path.as_ref().to_path_buf();
        let arena = LogArena::open(&path)?;
        let file_size = arena.len() as u64;
        let data = arena.data();

        let cache_dir = cache_dir_for(&path, config.cache_dir.as_deref());
        let output_dir = output_dir_for(&path, config.output_dir.as_deref());

        let mut engine = IndexEngine::open(&cache_dir)?;
        let resume = engine.validate_and_repair()?;

        let mut settings: Option<SettingsChunk> = None;
        let mut id_table: Option<MessageIdTable> = None;
        let mut registry: Option<TypeRegistry> = None;
        let mut content_header: Option<ContentChunkHeader> = None;
        let mut indices_chunk: Option<IndicesChunk> = None;
        let mut chunk_order = Vec::new();
        let mut pending_frames: Vec<RawFrame> = Vec::new();

        let mut offset = 0u64;
        while offset < file_size {
            let magic_offset = offset;
            let kind = match chunks::peek_magic(data, offset) {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!(at_byte = offset, error = %e, "unrecognized chunk magic, truncating scan");
                    break;
                }
            };
            offset += 1;

            match kind {
                ChunkKind::Settings => {
                    if settings.is_some() {
                        tracing::warn!(at_byte = magic_offset, "duplicate settings chunk, keeping the latest");
                    }
                    let mut stream = StreamReader::at(data, offset as usize);
                    settings = Some(SettingsChunk::parse(&mut stream)?);
                    offset = stream.tell();
                }
                ChunkKind::MessageIds => {
                    if id_table.is_some() {
                        tracing::warn!(at_byte = magic_offset, "duplicate message-id chunk, keeping the latest");
                    }
                    let mut stream = StreamReader::at(data, offset as usize);
                    id_table = Some(MessageIdTable::parse(&mut stream)?);
                    offset = stream.tell();
                }
                ChunkKind::TypeInfo => {
                    if registry.is_some() {
                        tracing::warn!(at_byte = magic_offset, "duplicate type-info chunk, keeping the latest");
                    }
                    let mut stream = StreamReader::at(data, offset as usize);
                    let chunk = TypeInfoChunk::parse(&mut stream)?;
                    offset = stream.tell();
                    registry = Some(chunk.into_registry()?);
                }
                ChunkKind::Indices => {
                    let mut stream = StreamReader::at(data, offset as usize);
                    match IndicesChunk::parse(&mut stream) {
                        Ok(chunk) => {
                            offset = stream.tell();
                            indices_chunk = Some(chunk);
                        }
                        Err(e) => {
                            tracing::warn!(at_byte = magic_offset, error = %e, "trailing indices chunk invalid, ignoring");
                            break;
                        }
                    }
                }
                ChunkKind::CompressedContent => {
                    return Err(LogError::Unsupported { feature: "compressed content chunk".to_string() });
                }
                ChunkKind::UncompressedContent => {
                    let table = id_table
                        .as_ref()
                        .ok_or_else(|| LogError::Other("content chunk encountered before a message-id chunk".to_string()))?;
                    let mut header_stream = StreamReader::at(data, offset as usize);
                    let header = ContentChunkHeader::parse(&mut header_stream)?;

                    let scan_start = resume.next_byte.max(header.body_start);
                    let full_limit = header.body_start + header.used_size.min(file_size.saturating_sub(header.body_start));
                    if scan_start < full_limit {
                        let (frames, _end) = split_frames(data, scan_start, full_limit - scan_start, file_size, table);
                        pending_frames.extend(frames);
                    }

                    offset = full_limit;
                    content_header = Some(header);
                }
            }
            chunk_order.push(ChunkSummary { kind, offset: magic_offset });
        }

        let settings = settings.ok_or_else(|| LogError::Other("log file has no settings chunk".to_string()))?;
        let id_table = id_table.ok_or_else(|| LogError::Other("log file has no message-id chunk".to_string()))?;
        let registry = registry.unwrap_or_else(TypeRegistry::empty);
        let content_header =
            content_header.ok_or_else(|| LogError::Other("log file has no content chunk".to_string()))?;

        let mut abs_frame_index = resume.frame_count;
        let mut abs_message_base = resume.message_count;
        let mut declared_timestamps: HashMap<String, Vec<Option<u32>>> = HashMap::new();
        let mut timers: HashMap<String, Timer> = HashMap::new();

        for raw in &pending_frames {
            engine.append_frame(abs_frame_index, abs_message_base, raw)?;

            let declared_time = find_frame_info_time(data, raw, &id_table, &registry);
            declared_timestamps.entry(raw.thread_name.clone()).or_default().push(declared_time);

            let stopwatch = find_stopwatch(data, raw, &id_table);
            let timer = timers.entry(raw.thread_name.clone()).or_default();
            match stopwatch {
                Some(sw) => timer.record_frame(&sw.names, &sw.infos, sw.thread_start_time, sw.frame_no),
                None => timer.record_frame(&HashMap::new(), &HashMap::new(), 0, 0),
            }

            abs_message_base += raw.messages.len() as u64;
            abs_frame_index += 1;
        }

        let frames = engine.all_frames()?;
        let messages = engine.all_messages()?;
        let instance = LogInstance::new(frames, messages);

        let repr_cache = if config.cache_to_disk { Some(ReprCache::new(cache_dir.clone())?) } else { None };
        let lru_capacity = config.lru_capacity;

        Ok(Log {
            path,
            arena,
            cache_dir,
            output_dir,
            config,
            settings,
            id_table,
            registry,
            content_header,
            indices_chunk,
            chunk_order,
            instance,
            declared_timestamps,
            timers,
            repr_cache,
            value_cache: Mutex::new(LruCache::new(lru_capacity)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn settings(&self) -> &SettingsChunk {
        &self.settings
    }

    pub fn message_id_map(&self) -> &MessageIdTable {
        &self.id_table
    }

    pub fn type_info(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn indices_chunk(&self) -> Option<&IndicesChunk> {
        self.indices_chunk.as_ref()
    }

    /// Above `large_file_threshold_bytes` a caller should prefer
    /// [`Log::decode_message`]'s on-demand path over an eager
    /// [`Log::parse_bytes`] pass.
    pub fn is_large_file(&self) -> bool {
        self.config.is_large_file(self.arena.len() as u64)
    }

    /// Resolves a chunk by position, alias name, or kind (spec §4.J).
    pub fn chunk(&self, key: ChunkKey<'_>) -> Option<ChunkRef<'_>> {
        let kind = match key {
            ChunkKey::Kind(kind) => kind,
            ChunkKey::Index(i) => self.chunk_order.get(i)?.kind,
            ChunkKey::Name(name) => match name {
                "settings" => ChunkKind::Settings,
                "messageIds" | "message_ids" => ChunkKind::MessageIds,
                "typeInfo" | "type_info" => ChunkKind::TypeInfo,
                "content" => ChunkKind::UncompressedContent,
                "indices" => ChunkKind::Indices,
                _ => return None,
            },
        };
        self.chunk_for_kind(kind)
    }

    fn chunk_for_kind(&self, kind: ChunkKind) -> Option<ChunkRef<'_>> {
        match kind {
            ChunkKind::Settings => Some(ChunkRef::Settings(&self.settings)),
            ChunkKind::MessageIds => Some(ChunkRef::MessageIds(&self.id_table)),
            ChunkKind::TypeInfo => Some(ChunkRef::TypeInfo(&self.registry)),
            ChunkKind::UncompressedContent | ChunkKind::CompressedContent => {
                Some(ChunkRef::Content(&self.content_header))
            }
            ChunkKind::Indices => self.indices_chunk.as_ref().map(ChunkRef::Indices),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.instance.frame_count()
    }

    pub fn message_count(&self) -> u64 {
        self.instance.message_count()
    }

    pub fn frames(&self) -> FrameAccessor<'_> {
        self.instance.all_frames()
    }

    pub fn messages(&self) -> MessageAccessor<'_> {
        self.instance.all_messages()
    }

    pub fn thread_names(&self) -> Vec<&str> {
        self.instance.thread_names()
    }

    /// Builds a thread's frame list plus resolved timestamps on demand,
    /// rather than storing one per thread up front (a `ThreadView`
    /// borrows the instance, so materializing all of them eagerly would
    /// make `Log` self-referential for no benefit).
    pub fn thread_view(&self, thread_name: &str) -> ThreadView<'_> {
        let empty = Vec::new();
        let declared = self.declared_timestamps.get(thread_name).unwrap_or(&empty);
        ThreadView::build(&self.instance, thread_name, declared)
    }

    pub fn timer(&self, thread_name: &str) -> Option<&Timer> {
        self.timers.get(thread_name)
    }

    /// The message's class name, resolved through the message-id table.
    pub fn class_name_of(&self, message: &MessageIndexRecord) -> Option<String> {
        let mut header = StreamReader::at(self.arena.data(), message.start_byte as usize);
        let (log_id, _) = header.read_message_header().ok()?;
        self.id_table.class_name(log_id)
    }

    /// Raw message body bytes (header excluded), for consumers like an
    /// image sink that only need the wire bytes, not a decoded `Value`.
    pub fn raw_body_bytes(&self, message: &MessageIndexRecord) -> &[u8] {
        let data = self.arena.data();
        let body_start = message.start_byte as usize + 4;
        &data[body_start..message.end_byte as usize]
    }

    /// Decodes one message, preferring the in-memory LRU cache, then the
    /// on-disk repr cache, and only decoding from the mmap as a last
    /// resort (spec §4.J/§4.H: accessor-mode random access).
    pub fn decode_message(&self, abs_index: u64) -> Result<Value> {
        if let Some(value) = self.value_cache.lock().unwrap_or_else(|e| e.into_inner()).get(&abs_index) {
            return Ok(value.clone());
        }

        if let Some(repr_cache) = &self.repr_cache {
            if let Ok(Some(value)) = repr_cache.load(abs_index) {
                self.value_cache.lock().unwrap_or_else(|e| e.into_inner()).put(abs_index, value.clone());
                return Ok(value);
            }
        }

        let record = self
            .instance
            .message(abs_index)
            .ok_or_else(|| LogError::AccessorOutOfRange { index: abs_index, len: self.instance.message_count() })?;
        let value = parse::decode_message(self.arena.data(), record, &self.id_table, &self.registry)?;

        if let Some(repr_cache) = &self.repr_cache {
            let _ = repr_cache.store(abs_index, &value);
        }
        self.value_cache.lock().unwrap_or_else(|e| e.into_inner()).put(abs_index, value.clone());
        Ok(value)
    }

    /// Bulk-decodes every message in the log in parallel (spec §4.H).
    /// Intended for the instance-mode/small-file path; large files should
    /// prefer [`Log::decode_message`] on demand instead of materializing
    /// every value at once.
    pub fn parse_bytes(&self) -> Result<(Vec<Option<Value>>, ParseReport)> {
        parse::parse_all(
            self.arena.data(),
            self.instance.message_records(),
            &self.id_table,
            &self.registry,
            &self.config,
            self.repr_cache.as_ref(),
        )
    }
}

/// Derives the `output/<stem>/` directory the CLI writes frame artifacts
/// into, the same sibling-of-the-log-file convention
/// `index::engine::cache_dir_for` uses for `cache/<stem>/`.
fn output_dir_for(log_path: &Path, base: Option<&Path>) -> PathBuf {
    let stem = log_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "log".to_string());
    match base {
        Some(base) => base.join(&stem),
        None => log_path.parent().unwrap_or_else(|| Path::new(".")).join("output").join(&stem),
    }
}

/// Scans a frame's messages for a `FrameInfo` and decodes its `time`
/// field generically (spec §9: `FrameInfo` needs no special-cased wire
/// format, unlike `Stopwatch`).
fn find_frame_info_time(
    data: &[u8],
    raw: &RawFrame,
    id_table: &MessageIdTable,
    registry: &TypeRegistry,
) -> Option<u32> {
    let decoder = Decoder::new(registry);
    for msg in &raw.messages {
        let Some(class_name) = id_table.class_name(msg.log_id) else { continue };
        if class_name != "FrameInfo" {
            continue;
        }
        let mut stream = StreamReader::at(data, msg.start_byte as usize + 4);
        return match decoder.read_top_level(&class_name, &mut stream, msg.payload_size) {
            Ok(value) => value.as_struct_field("time").and_then(|v| v.as_u32()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode FrameInfo for timestamp resolution");
                None
            }
        };
    }
    None
}

/// Scans a frame's messages for a `Stopwatch` and parses it through the
/// dedicated byte-level reader (spec §9: its id-keyed wire format does not
/// fit the registry's read-plan mechanism).
fn find_stopwatch(data: &[u8], raw: &RawFrame, id_table: &MessageIdTable) -> Option<StopwatchRecord> {
    for msg in &raw.messages {
        let Some(class_name) = id_table.class_name(msg.log_id) else { continue };
        if class_name != "Stopwatch" {
            continue;
        }
        let mut stream = StreamReader::at(data, msg.start_byte as usize + 4);
        return match read_stopwatch(&mut stream) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode Stopwatch for timer aggregation");
                None
            }
        };
    }
    None
}
