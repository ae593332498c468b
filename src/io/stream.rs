// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Typed little-endian primitive reads over a byte slice.
//!
//! `StreamReader` is the sequential cursor every other component reads
//! through — the chunk reader, the frame splitter, and the schema-driven
//! decoder all sit on top of it. It never buffers beyond the slice it is
//! handed (a memory-mapped file or an in-memory `Vec<u8>`), with none of
//! the alignment/origin-stack machinery this wire format does not use.

use crate::error::{LogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

/// A 32-bit float in radians, normalized on demand into `[-pi, pi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle(pub f32);

impl Angle {
    pub fn normalize(self) -> Angle {
        let two_pi = std::f32::consts::TAU;
        let mut x = self.0 % two_pi;
        if x >= std::f32::consts::PI {
            x -= two_pi;
        } else if x < -std::f32::consts::PI {
            x += two_pi;
        }
        Angle(x)
    }
}

/// Sequential reader over a borrowed byte slice.
pub struct StreamReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> StreamReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        StreamReader { data, offset: 0 }
    }

    pub fn at(data: &'a [u8], offset: usize) -> Self {
        StreamReader { data, offset }
    }

    pub fn tell(&self) -> u64 {
        self.offset as u64
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn remaining_size(&self) -> u64 {
        self.size() - self.tell()
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<()> {
        let base: i64 = match whence {
            Whence::Set => 0,
            Whence::Cur => self.offset as i64,
            Whence::End => self.data.len() as i64,
        };
        let target = base + offset;
        if target < 0 || target as usize > self.data.len() {
            return Err(LogError::EndOfStream {
                requested: offset.unsigned_abs() as usize,
                available: self.data.len(),
                cursor: self.offset as u64,
            });
        }
        self.offset = target as usize;
        Ok(())
    }

    /// Read `n` bytes, advancing the cursor.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.offset + n > self.data.len() {
            return Err(LogError::EndOfStream {
                requested: n,
                available: self.data.len() - self.offset,
                cursor: self.offset as u64,
            });
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Read `n` bytes without advancing the cursor.
    pub fn probe(&self, n: usize) -> Result<&'a [u8]> {
        if self.offset + n > self.data.len() {
            return Err(LogError::EndOfStream {
                requested: n,
                available: self.data.len() - self.offset,
                cursor: self.offset as u64,
            });
        }
        Ok(&self.data[self.offset..self.offset + n])
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read(2)?.try_into().unwrap()))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read(2)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read(8)?.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read(8)?.try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read(4)?.try_into().unwrap()))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read(8)?.try_into().unwrap()))
    }

    /// `size_t`: always 8 bytes per spec §3.
    pub fn read_size_t(&mut self) -> Result<u64> {
        self.read_u64()
    }

    pub fn read_angle(&mut self) -> Result<Angle> {
        Ok(Angle(self.read_f32()?))
    }

    /// `string`: 4-byte unsigned length prefix followed by that many bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads `n` bytes into raw form without string decoding (used for
    /// byte-identity comparisons such as the frame-begin/finish payload
    /// check).
    pub fn read_raw_string_bytes(&mut self) -> Result<&'a [u8]> {
        let start = self.offset;
        let len = self.read_u32()? as usize;
        self.skip(len)?;
        Ok(&self.data[start..self.offset])
    }

    /// Length-prefixed array reader: a `u32` count followed by that many
    /// elements, each read by `read_one`.
    pub fn read_array<T>(&mut self, mut read_one: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let n = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(read_one(self)?);
        }
        Ok(out)
    }

    /// Fixed-count variant with no length prefix (used for `T[N]`).
    pub fn read_n<T>(&mut self, n: usize, mut read_one: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(read_one(self)?);
        }
        Ok(out)
    }

    /// `(logId: u8, payloadSize: u24 LE)`. The 24-bit size is zero-extended
    /// into a `u32` (spec §9 Open Question (c)): top byte is `id`, low three
    /// bytes are `size`, little-endian.
    pub fn read_message_header(&mut self) -> Result<(u8, u32)> {
        let bytes = self.read(4)?;
        let log_id = bytes[0];
        let size = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], 0]);
        Ok((log_id, size))
    }

    /// Queue header: one 8-byte LE word. Bits `[0..32)` = `low`,
    /// `[32..60)` = `messages`, `[60..64)` = `high`.
    pub fn read_queue_header(&mut self) -> Result<(u8, u32, u64)> {
        let word = self.read_u64()?;
        let low = word & 0xFFFF_FFFF;
        let messages = ((word >> 32) & 0x0FFF_FFFF) as u32;
        let high = (word >> 60) as u8;
        Ok((high, messages, low))
    }
}

/// Packs `(high, messages, low)` back into the queue-header bit layout.
/// Used by tests and by the index-repair path, which re-derives `usedSize`.
pub fn pack_queue_header(high: u8, messages: u32, low: u64) -> u64 {
    ((high as u64 & 0xF) << 60) | ((messages as u64 & 0x0FFF_FFFF) << 32) | (low & 0xFFFF_FFFF)
}

pub fn used_size(high: u8, low: u64) -> u64 {
    ((high as u64) << 32) | low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut r = StreamReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0403);
        assert_eq!(r.read_u32().unwrap(), 0x0807_0605);
    }

    #[test]
    fn end_of_stream() {
        let data = [0u8; 2];
        let mut r = StreamReader::new(&data);
        assert!(r.read_u32().is_err());
    }

    #[test]
    fn read_string_roundtrip() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(b"Cognition");
        let mut r = StreamReader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), "Cognition");
        assert!(r.at_end());
    }

    #[test]
    fn message_header_roundtrip() {
        let data = [0x0B, 0x2A, 0x00, 0x00];
        let mut r = StreamReader::new(&data);
        let (id, size) = r.read_message_header().unwrap();
        assert_eq!(id, 11);
        assert_eq!(size, 42);
    }

    #[test]
    fn queue_header_roundtrip() {
        // high: 4 bits, messages: 28 bits, low: 32 bits (spec §3 bit layout).
        let high = 0x9u8;
        let messages = 0x0123ABCu32;
        let low = 0x6789ABCDu64;
        let word = pack_queue_header(high, messages, low);
        let mut bytes = vec![];
        bytes.extend_from_slice(&word.to_le_bytes());
        let mut r = StreamReader::new(&bytes);
        let (h, m, l) = r.read_queue_header().unwrap();
        assert_eq!(h, high);
        assert_eq!(m, messages);
        assert_eq!(l, low);
        assert_eq!(used_size(h, l), ((high as u64) << 32) | low);
    }

    #[test]
    fn angle_normalizes_into_range() {
        let a = Angle(std::f32::consts::PI * 3.0).normalize();
        assert!(a.0 >= -std::f32::consts::PI && a.0 < std::f32::consts::PI);
        let b = Angle(1.0).normalize();
        let c = Angle(1.0 + std::f32::consts::TAU).normalize();
        assert!((b.0 - c.0).abs() < 1e-4);
    }

    #[test]
    fn seek_and_tell() {
        let data = [0u8; 16];
        let mut r = StreamReader::new(&data);
        r.seek(4, Whence::Set).unwrap();
        assert_eq!(r.tell(), 4);
        r.seek(2, Whence::Cur).unwrap();
        assert_eq!(r.tell(), 6);
        r.seek(0, Whence::End).unwrap();
        assert_eq!(r.tell(), 16);
        assert!(r.at_end());
    }
}
