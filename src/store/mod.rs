// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Random-access storage primitives for the dictionary container.
//!
//! A dictionary file is consumed lazily: the container reads a handful of
//! directories up front and pulls element bytes on demand, so opening a
//! 100 MB dictionary to show its summary costs a few kilobytes of reads.
//! This module provides the pieces that make that work:
//!
//! - fixed-width and varint stream primitives with hard size limits,
//! - [`LazyList`] - a count + offset table + element data region, giving
//!   indexed access to variable-size records through a shared file handle,
//! - [`CompressedList`](compressed::CompressedList) - block-compressed
//!   element storage with per-block checksums,
//! - [`CachedList`](cache::CachedList) - a bounded element cache over any
//!   random-access collection.
//!
//! # Security Considerations
//!
//! Dictionary files come from the network. Every count and length decoded
//! here is validated against a MAX_* constant before a single byte is
//! allocated, and the varint decoder has a maximum iteration limit.
//!
//! # Cursor discipline
//!
//! [`LazyList::read`] consumes only the directory (count + offsets); it
//! leaves the stream cursor right after the offset table, NOT at the end of
//! the serialized region. Callers that parse sequential regions must
//! reposition to [`LazyList::end_offset`] themselves before reading on.

pub mod cache;
pub mod compressed;

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DictError, Result};

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum length of a single serialized text field: 1 MiB
pub const MAX_TEXT_LEN: usize = 1024 * 1024;

/// Maximum element count for any list directory
pub const MAX_LIST_LEN: usize = 16_777_216;

// ============================================================================
// SHARED FILE HANDLE
// ============================================================================

/// Anything the container can read a dictionary from.
///
/// `Send` so a lookup holding the handle may run on a worker thread while
/// the opening thread goes on with its life.
pub trait DictFile: Read + Seek + Send {}

impl<T: Read + Seek + Send> DictFile for T {}

/// A seekable handle shared by every lazy collection in one dictionary.
///
/// The mutex serializes seek+read sequences; lazy reads from two threads
/// will not interleave mid-record.
pub type SharedFile = Arc<Mutex<Box<dyn DictFile>>>;

/// Wrap a concrete reader into a [`SharedFile`].
pub fn shared_file<F: DictFile + 'static>(file: F) -> SharedFile {
    let boxed: Box<dyn DictFile> = Box::new(file);
    Arc::new(Mutex::new(boxed))
}

// ============================================================================
// STREAM PRIMITIVES
// ============================================================================

pub fn write_u16<W: Write + ?Sized>(w: &mut W, value: u16) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u16<R: Read + ?Sized>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn write_u32<W: Write + ?Sized>(w: &mut W, value: u32) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u32<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn write_i32<W: Write + ?Sized>(w: &mut W, value: i32) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_i32<R: Read + ?Sized>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn write_i64<W: Write + ?Sized>(w: &mut W, value: i64) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_i64<R: Read + ?Sized>(r: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

pub fn write_u64<W: Write + ?Sized>(w: &mut W, value: u64) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u64<R: Read + ?Sized>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Encode a varint (LEB128, low 7 bits first).
pub fn write_varint<W: Write + ?Sized>(w: &mut W, mut value: u64) -> Result<()> {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            w.write_all(&[byte])?;
            return Ok(());
        }
        w.write_all(&[byte | 0x80])?;
    }
}

/// Decode a varint from a stream.
///
/// Fails with `CorruptFormat` if the encoding runs past
/// [`MAX_VARINT_BYTES`] (malformed or malicious input).
pub fn read_varint<R: Read + ?Sized>(r: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;
    for _ in 0..MAX_VARINT_BYTES {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;
        result |= ((buf[0] & 0x7F) as u64) << shift;
        if buf[0] & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
    Err(DictError::CorruptFormat(
        "varint exceeds maximum length".to_string(),
    ))
}

/// Write a length-prefixed UTF-8 string (varint length + bytes).
pub fn write_string<W: Write + ?Sized>(w: &mut W, value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > MAX_TEXT_LEN {
        return Err(DictError::InvariantViolation(format!(
            "text field of {} bytes exceeds limit {}",
            bytes.len(),
            MAX_TEXT_LEN
        )));
    }
    write_varint(w, bytes.len() as u64)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_string<R: Read + ?Sized>(r: &mut R) -> Result<String> {
    let len = read_varint(r)? as usize;
    if len > MAX_TEXT_LEN {
        return Err(DictError::CorruptFormat(format!(
            "text field claims {} bytes (limit {})",
            len, MAX_TEXT_LEN
        )));
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|err| DictError::CorruptFormat(format!("invalid UTF-8 in text field: {}", err)))
}

// ============================================================================
// ELEMENT CODEC
// ============================================================================

/// Exact-byte (de)serialization of one element type.
///
/// A codec owns whatever context decoding needs (the entry codec, for
/// example, carries the number of sources so it can reject dangling source
/// ids). Implementations must read back exactly the bytes they wrote.
pub trait Codec: Send + Sync {
    type Item;

    fn write(&self, w: &mut dyn Write, item: &Self::Item) -> Result<()>;

    fn read(&self, r: &mut dyn Read) -> Result<Self::Item>;
}

/// Indexed read access to a collection of `T`.
///
/// Implementations may hit the disk; `get` is fallible for that reason.
pub trait RandomAccess<T>: Send + Sync {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<T>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// LAZY LIST
// ============================================================================

/// A lazily-read list region inside a dictionary file.
///
/// Wire layout:
///
/// ```text
/// count:   u32 LE
/// offsets: [u64 LE; count + 1]   element starts, relative to data_start;
///                                offsets[count] marks the region end
/// data:    concatenated codec-serialized elements
/// ```
///
/// `read` consumes only the directory. Element access seeks into `data`
/// through the shared handle and decodes on demand.
pub struct LazyList<C: Codec> {
    file: SharedFile,
    codec: C,
    data_start: u64,
    offsets: Vec<u64>,
}

impl<C: Codec> std::fmt::Debug for LazyList<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyList")
            .field("data_start", &self.data_start)
            .field("offsets", &self.offsets)
            .finish()
    }
}

impl<C: Codec> LazyList<C> {
    /// Read the list directory at `start`.
    ///
    /// Leaves the stream cursor after the offset table; use
    /// [`end_offset`](Self::end_offset) to find the end of the region.
    pub fn read(file: SharedFile, codec: C, start: u64) -> Result<Self> {
        let (data_start, offsets) = {
            let mut guard = file.lock();
            let r = &mut **guard;
            r.seek(SeekFrom::Start(start))?;
            let count = read_u32(r)? as usize;
            if count > MAX_LIST_LEN {
                return Err(DictError::CorruptFormat(format!(
                    "list claims {} elements (limit {})",
                    count, MAX_LIST_LEN
                )));
            }
            let mut offsets = Vec::with_capacity(count + 1);
            let mut prev = 0u64;
            for i in 0..=count {
                let offset = read_u64(r)?;
                if offset < prev {
                    return Err(DictError::CorruptFormat(format!(
                        "list offset table not monotonic at entry {}",
                        i
                    )));
                }
                offsets.push(offset);
                prev = offset;
            }
            (r.stream_position()?, offsets)
        };
        Ok(LazyList {
            file,
            codec,
            data_start,
            offsets,
        })
    }

    /// One past the last byte of the serialized region.
    pub fn end_offset(&self) -> u64 {
        self.data_start + self.offsets.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode element `index` from the backing file.
    pub fn get(&self, index: usize) -> Result<C::Item> {
        if index >= self.len() {
            return Err(DictError::CorruptFormat(format!(
                "list index {} out of range (len {})",
                index,
                self.len()
            )));
        }
        let mut guard = self.file.lock();
        let r = &mut **guard;
        r.seek(SeekFrom::Start(self.data_start + self.offsets[index]))?;
        self.codec.read(r)
    }

    /// Decode every element front to back.
    pub fn materialize(&self) -> Result<Vec<C::Item>> {
        let mut items = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            items.push(self.get(index)?);
        }
        Ok(items)
    }
}

impl<C: Codec> RandomAccess<C::Item> for LazyList<C> {
    fn len(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Result<C::Item> {
        LazyList::get(self, index)
    }
}

/// Serialize `items` in [`LazyList`] layout.
pub fn write_lazy_list<W, C>(w: &mut W, codec: &C, items: &[C::Item]) -> Result<()>
where
    W: Write,
    C: Codec,
{
    if items.len() > MAX_LIST_LEN {
        return Err(DictError::InvariantViolation(format!(
            "list of {} elements exceeds limit {}",
            items.len(),
            MAX_LIST_LEN
        )));
    }
    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(items.len() + 1);
    for item in items {
        offsets.push(data.len() as u64);
        codec.write(&mut data, item)?;
    }
    offsets.push(data.len() as u64);

    write_u32(w, items.len() as u32)?;
    for offset in &offsets {
        write_u64(w, *offset)?;
    }
    w.write_all(&data)?;
    Ok(())
}
