// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Block-compressed element storage.
//!
//! Entries dominate a dictionary file, so they get the heavy treatment:
//! fixed-size runs of codec-serialized elements, each run brotli-compressed
//! and prefixed with a CRC32 of its compressed bytes. The checksum catches
//! truncation and bit rot before brotli gets a chance to misdecode it into
//! plausible-looking garbage.
//!
//! Wire layout:
//!
//! ```text
//! count:     u32 LE              total elements
//! block_len: u32 LE              elements per block (last block may be short)
//! offsets:   [u64 LE; blocks+1]  block starts, relative to data start
//! blocks:    per block { crc32: u32 LE, brotli bytes }
//! ```
//!
//! Decoding a single element decompresses its whole block; the list keeps
//! the most recently decoded block so sequential access stays cheap, and
//! [`CachedList`](super::cache::CachedList) amortizes the rest.

use std::io::{Read, SeekFrom, Write};

use parking_lot::Mutex;

use super::{read_u32, write_u32, Codec, RandomAccess, SharedFile, MAX_LIST_LEN};
use crate::error::{DictError, Result};

/// Largest accepted per-block element run.
pub const MAX_BLOCK_LEN: usize = 65_536;

/// Largest accepted compressed block: 64 MiB.
pub const MAX_COMPRESSED_BLOCK: u64 = 64 * 1024 * 1024;

// Brotli parameters. Files are built once and read many times, so spend
// encoder effort freely (quality 11, window 22).
const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

/// A block-compressed list region inside a dictionary file.
pub struct CompressedList<C: Codec> {
    file: SharedFile,
    codec: C,
    len: usize,
    block_len: usize,
    data_start: u64,
    block_offsets: Vec<u64>,
    /// Most recently decoded block, for cheap neighboring access.
    last_block: Mutex<Option<(usize, Vec<C::Item>)>>,
}

impl<C: Codec> CompressedList<C>
where
    C::Item: Clone + Send,
{
    /// Read the block directory at `start`.
    ///
    /// Like [`LazyList::read`](super::LazyList::read), this consumes only
    /// the directory; use [`end_offset`](Self::end_offset) to find the end
    /// of the region.
    pub fn read(file: SharedFile, codec: C, start: u64) -> Result<Self> {
        let (len, block_len, data_start, block_offsets) = {
            let mut guard = file.lock();
            let r = &mut **guard;
            r.seek(SeekFrom::Start(start))?;
            let len = read_u32(r)? as usize;
            if len > MAX_LIST_LEN {
                return Err(DictError::CorruptFormat(format!(
                    "compressed list claims {} elements (limit {})",
                    len, MAX_LIST_LEN
                )));
            }
            let block_len = read_u32(r)? as usize;
            if block_len == 0 || block_len > MAX_BLOCK_LEN {
                return Err(DictError::CorruptFormat(format!(
                    "compressed list block length {} out of range",
                    block_len
                )));
            }
            let blocks = len.div_ceil(block_len);
            let mut offsets = Vec::with_capacity(blocks + 1);
            let mut prev = 0u64;
            for i in 0..=blocks {
                let offset = super::read_u64(r)?;
                if offset < prev || offset - prev > MAX_COMPRESSED_BLOCK {
                    return Err(DictError::CorruptFormat(format!(
                        "compressed block directory invalid at entry {}",
                        i
                    )));
                }
                offsets.push(offset);
                prev = offset;
            }
            (len, block_len, r.stream_position()?, offsets)
        };
        Ok(CompressedList {
            file,
            codec,
            len,
            block_len,
            data_start,
            block_offsets,
            last_block: Mutex::new(None),
        })
    }

    /// One past the last byte of the serialized region.
    pub fn end_offset(&self) -> u64 {
        self.data_start + self.block_offsets.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode element `index`, decompressing its block if it is not the one
    /// decoded last.
    pub fn get(&self, index: usize) -> Result<C::Item> {
        if index >= self.len {
            return Err(DictError::CorruptFormat(format!(
                "compressed list index {} out of range (len {})",
                index, self.len
            )));
        }
        let block = index / self.block_len;
        let within = index % self.block_len;

        {
            let cached = self.last_block.lock();
            if let Some((cached_block, items)) = cached.as_ref() {
                if *cached_block == block {
                    return Ok(items[within].clone());
                }
            }
        }

        let items = self.decode_block(block)?;
        let item = items[within].clone();
        *self.last_block.lock() = Some((block, items));
        Ok(item)
    }

    fn decode_block(&self, block: usize) -> Result<Vec<C::Item>> {
        let start = self.block_offsets[block];
        let end = self.block_offsets[block + 1];
        if end - start < 4 {
            return Err(DictError::CorruptFormat(format!(
                "compressed block {} too short for checksum",
                block
            )));
        }

        let mut raw = vec![0u8; (end - start) as usize];
        {
            let mut guard = self.file.lock();
            let r = &mut **guard;
            r.seek(SeekFrom::Start(self.data_start + start))?;
            r.read_exact(&mut raw)?;
        }

        let stored_crc = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let compressed = &raw[4..];
        if crc32(compressed) != stored_crc {
            return Err(DictError::CorruptFormat(format!(
                "checksum mismatch in entry block {}",
                block
            )));
        }

        let mut plain = Vec::new();
        brotli::Decompressor::new(compressed, BROTLI_BUFFER)
            .read_to_end(&mut plain)
            .map_err(|err| {
                DictError::CorruptFormat(format!("entry block {} failed to decompress: {}", block, err))
            })?;

        let in_block = (self.len - block * self.block_len).min(self.block_len);
        let mut cursor = &plain[..];
        let mut items = Vec::with_capacity(in_block);
        for _ in 0..in_block {
            items.push(self.codec.read(&mut cursor)?);
        }
        Ok(items)
    }
}

impl<C: Codec> RandomAccess<C::Item> for CompressedList<C>
where
    C::Item: Clone + Send,
{
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Result<C::Item> {
        CompressedList::get(self, index)
    }
}

/// Serialize `items` in [`CompressedList`] layout.
pub fn write_compressed_list<W, C>(
    w: &mut W,
    codec: &C,
    items: &[C::Item],
    block_len: usize,
) -> Result<()>
where
    W: Write,
    C: Codec,
{
    if items.len() > MAX_LIST_LEN {
        return Err(DictError::InvariantViolation(format!(
            "compressed list of {} elements exceeds limit {}",
            items.len(),
            MAX_LIST_LEN
        )));
    }
    if block_len == 0 || block_len > MAX_BLOCK_LEN {
        return Err(DictError::InvariantViolation(format!(
            "compressed list block length {} out of range",
            block_len
        )));
    }

    let mut data = Vec::new();
    let mut offsets = vec![0u64];
    for chunk in items.chunks(block_len) {
        let mut plain = Vec::new();
        for item in chunk {
            codec.write(&mut plain, item)?;
        }
        let compressed = compress(&plain)?;
        data.extend_from_slice(&crc32(&compressed).to_le_bytes());
        data.extend_from_slice(&compressed);
        offsets.push(data.len() as u64);
    }
    if items.is_empty() {
        offsets.truncate(1);
    }

    write_u32(w, items.len() as u32)?;
    write_u32(w, block_len as u32)?;
    for offset in &offsets {
        super::write_u64(w, *offset)?;
    }
    w.write_all(&data)?;
    Ok(())
}

fn compress(plain: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    {
        let mut encoder = brotli::CompressorWriter::new(
            &mut compressed,
            BROTLI_BUFFER,
            BROTLI_QUALITY,
            BROTLI_WINDOW,
        );
        encoder.write_all(plain)?;
        encoder.flush()?;
    }
    Ok(compressed)
}

fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
