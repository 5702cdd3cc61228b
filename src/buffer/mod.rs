//! The segmented byte buffer.
//!
//! [`Buffer`] is a FIFO byte sequence stored as a chain of [`Segment`]s. Bytes
//! are appended at the tail and consumed from the head. Moving bytes between
//! buffers moves whole segments instead of copying them; partial segments are
//! either shared copy-on-write or copied, whichever is cheaper.
//!
//! - `write` - Typed appends (integers, text, slices)
//! - `read` - Typed reads, lines and searches

mod read;
mod write;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::error::{BufError, Result};
#[cfg(feature = "hash-blake3")]
use crate::hash::Digest;
use crate::segment::{SEGMENT_SIZE, SHARE_MINIMUM, Segment, SegmentPool};

/// Buffers up to this size render all their bytes in `Display`.
const PREVIEW_SIZE: usize = 64;

/// A mutable byte sequence backed by pooled segments.
///
/// `Buffer` is not internally synchronized. It is `Send`, but sharing one
/// instance between threads requires external locking.
///
/// # Example
///
/// ```
/// use segbuf::Buffer;
///
/// let mut buffer = Buffer::new();
/// buffer.write_short(0xabcd).write_int_le(1).write_utf8("hi");
/// assert_eq!(buffer.len(), 8);
///
/// assert_eq!(buffer.read_short()?, 0xabcd);
/// assert_eq!(buffer.read_int_le()?, 1);
/// assert_eq!(buffer.read_utf8_to_end(), "hi");
/// # Ok::<(), segbuf::BufError>(())
/// ```
pub struct Buffer {
    segments: VecDeque<Segment>,
    size: usize,
    pool: Arc<SegmentPool>,
}

impl Buffer {
    /// Creates an empty buffer drawing segments from the process-wide pool.
    pub fn new() -> Self {
        Self::with_pool(SegmentPool::shared())
    }

    /// Creates an empty buffer drawing segments from `pool`.
    pub fn with_pool(pool: Arc<SegmentPool>) -> Self {
        Self {
            segments: VecDeque::new(),
            size: 0,
            pool,
        }
    }

    /// The pool this buffer takes segments from and recycles them to.
    pub fn pool(&self) -> &Arc<SegmentPool> {
        &self.pool
    }

    /// Number of readable bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Readable byte count of each segment, head first.
    ///
    /// The physical layout is part of the observable contract: it shows where
    /// writes crossed segment boundaries and which transfers moved segments.
    pub fn segment_sizes(&self) -> Vec<usize> {
        self.segments.iter().map(Segment::len).collect()
    }

    /// The segments, head first.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Readable bytes of each segment, head first.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.segments.iter().map(Segment::as_slice)
    }

    /// Bytes that can be emitted without sending a partially filled segment:
    /// everything except a writable tail that still has room.
    pub fn complete_segment_byte_count(&self) -> usize {
        match self.segments.back() {
            Some(tail) if tail.limit() < SEGMENT_SIZE && tail.is_owner() => self.size - tail.len(),
            _ => self.size,
        }
    }

    /// Discards all bytes, recycling the segments.
    pub fn clear(&mut self) {
        while let Some(mut segment) = self.segments.pop_front() {
            segment.drain();
            self.pool.recycle(segment);
        }
        self.size = 0;
    }

    /// Discards `byte_count` bytes from the head.
    pub fn skip(&mut self, byte_count: usize) -> Result<()> {
        self.ensure_len(byte_count)?;
        self.consume(byte_count);
        Ok(())
    }

    /// Returns the byte at `pos` without consuming anything.
    pub fn get(&self, pos: usize) -> Option<u8> {
        if pos >= self.size {
            return None;
        }
        let mut offset = pos;
        for segment in &self.segments {
            if offset < segment.len() {
                return Some(segment.as_slice()[offset]);
            }
            offset -= segment.len();
        }
        None
    }

    /// Index of the first `byte` at or after `from`.
    pub fn index_of(&self, byte: u8, from: usize) -> Option<usize> {
        let mut start = 0;
        for chunk in self.chunks() {
            let end = start + chunk.len();
            if from < end {
                let skip = from.saturating_sub(start);
                if let Some(i) = chunk[skip..].iter().position(|&b| b == byte) {
                    return Some(start + skip + i);
                }
            }
            start = end;
        }
        None
    }

    /// Copies every byte into a `Bytes` without consuming.
    pub fn snapshot(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.size);
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out.freeze()
    }

    /// Appends `byte_count` bytes starting at `offset` to `out`, sharing
    /// segments instead of copying. Nothing is consumed from `self`.
    pub fn copy_to(&self, out: &mut Buffer, offset: usize, byte_count: usize) -> Result<()> {
        let end = offset.checked_add(byte_count).unwrap_or(usize::MAX);
        if end > self.size {
            return Err(BufError::Underflow {
                requested: end,
                available: self.size,
            });
        }

        let mut offset = offset;
        let mut remaining = byte_count;
        for segment in &self.segments {
            if remaining == 0 {
                break;
            }
            if offset >= segment.len() {
                offset -= segment.len();
                continue;
            }
            let mut copy = segment.shared_copy();
            copy.consume(offset);
            let take = copy.len().min(remaining);
            if take < copy.len() {
                copy = copy.split(take);
            }
            out.segments.push_back(copy);
            out.size += take;
            remaining -= take;
            offset = 0;
        }
        Ok(())
    }

    /// Moves `byte_count` bytes from the head of `source` to the tail of `self`.
    ///
    /// Whole segments change buffers by reference. A partial head segment is
    /// split (shared when large, copied when small) and small segments are
    /// compacted into a writable tail, so the chain does not fill up with
    /// slivers.
    pub fn write_from(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        if byte_count > source.size {
            return Err(BufError::Underflow {
                requested: byte_count,
                available: source.size,
            });
        }

        let mut remaining = byte_count;
        while remaining > 0 {
            let Some(head) = source.segments.front_mut() else {
                break;
            };

            if remaining < head.len() {
                if let Some(tail) = self.segments.back_mut() {
                    if tail.is_writable() && tail.len() + remaining <= SEGMENT_SIZE {
                        head.move_to(tail, remaining);
                        source.size -= remaining;
                        self.size += remaining;
                        return Ok(());
                    }
                }
                let prefix = if remaining >= SHARE_MINIMUM {
                    head.split(remaining)
                } else {
                    let mut prefix = source.pool.take();
                    prefix.write(&head.as_slice()[..remaining]);
                    head.consume(remaining);
                    prefix
                };
                source.segments.push_front(prefix);
            }

            let Some(segment) = source.segments.pop_front() else {
                break;
            };
            let moved = segment.len();
            source.size -= moved;
            self.push_compacted(segment);
            self.size += moved;
            remaining -= moved;
        }
        Ok(())
    }

    /// Appends `segment`, folding it into the tail when it fits.
    fn push_compacted(&mut self, mut segment: Segment) {
        if let Some(tail) = self.segments.back_mut() {
            if tail.is_writable() && tail.len() + segment.len() <= SEGMENT_SIZE {
                let n = segment.len();
                segment.move_to(tail, n);
                self.pool.recycle(segment);
                return;
            }
        }
        self.segments.push_back(segment);
    }

    /// A tail segment with at least `min_capacity` writable bytes.
    ///
    /// A shared or non-owner tail is replaced by an unshared copy when the
    /// copy would have room; otherwise a fresh segment is appended.
    pub(crate) fn writable_tail(&mut self, min_capacity: usize) -> &mut Segment {
        assert!(
            (1..=SEGMENT_SIZE).contains(&min_capacity),
            "unexpected capacity request"
        );

        let reuse_tail = match self.segments.back_mut() {
            Some(tail) if tail.is_writable() => tail.remaining() >= min_capacity,
            Some(tail) if tail.len() + min_capacity <= SEGMENT_SIZE => {
                let copy = tail.unshared_copy(&self.pool);
                let mut shared = std::mem::replace(tail, copy);
                shared.drain();
                self.pool.recycle(shared);
                true
            }
            _ => false,
        };

        if !reuse_tail {
            self.segments.push_back(self.pool.take());
        }
        match self.segments.back_mut() {
            Some(tail) => tail,
            None => unreachable!("tail segment was just ensured"),
        }
    }

    /// Lets `fill` write straight into the tail segment's free space.
    ///
    /// At most `max` bytes are offered, zeroed first since pooled blocks keep
    /// whatever their last buffer wrote. An unused fresh segment is recycled.
    pub(crate) fn write_with<F>(&mut self, max: usize, fill: F) -> io::Result<usize>
    where
        F: FnOnce(&mut [u8]) -> io::Result<usize>,
    {
        let tail = self.writable_tail(1);
        let spare = tail.spare_mut();
        let len = spare.len().min(max);
        let spare = &mut spare[..len];
        spare.fill(0);
        let result = fill(spare);
        let written = match &result {
            Ok(n) => (*n).min(len),
            Err(_) => 0,
        };
        tail.commit(written);
        let unused = tail.is_empty();
        self.size += written;

        if unused {
            if let Some(segment) = self.segments.pop_back() {
                self.pool.recycle(segment);
            }
        }
        result.map(|_| written)
    }

    /// Advances the head by `byte_count` bytes, recycling drained segments.
    pub(crate) fn consume(&mut self, mut byte_count: usize) {
        debug_assert!(byte_count <= self.size);
        while byte_count > 0 {
            let Some(head) = self.segments.front_mut() else {
                break;
            };
            let n = head.len().min(byte_count);
            head.consume(n);
            self.size -= n;
            byte_count -= n;
            if head.is_empty() {
                self.recycle_head();
            }
        }
    }

    pub(crate) fn recycle_head(&mut self) {
        if let Some(segment) = self.segments.pop_front() {
            self.pool.recycle(segment);
        }
    }

    pub(crate) fn ensure_len(&self, byte_count: usize) -> Result<()> {
        if self.size < byte_count {
            return Err(BufError::Underflow {
                requested: byte_count,
                available: self.size,
            });
        }
        Ok(())
    }

    /// BLAKE3 digest of the buffered bytes, fed one segment at a time.
    /// Nothing is consumed.
    #[cfg(feature = "hash-blake3")]
    pub fn blake3(&self) -> Digest {
        let mut hasher = blake3::Hasher::new();
        for chunk in self.chunks() {
            hasher.update(chunk);
        }
        Digest::from(hasher.finalize())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Buffer {
    /// Shares every segment copy-on-write with the new buffer.
    fn clone(&self) -> Self {
        let mut copy = Buffer::with_pool(Arc::clone(&self.pool));
        copy.segments.extend(self.segments.iter().map(Segment::shared_copy));
        copy.size = self.size;
        copy
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.clear();
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.chunks().flatten().eq(other.chunks().flatten())
    }
}

impl Eq for Buffer {}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size == 0 {
            return write!(f, "Buffer[size=0]");
        }
        let preview: Vec<u8> = self
            .chunks()
            .flatten()
            .copied()
            .take(PREVIEW_SIZE)
            .collect();
        let ellipsis = if self.size > PREVIEW_SIZE { "…" } else { "" };
        write!(
            f,
            "Buffer[size={} data={}{}]",
            self.size,
            hex::encode(preview),
            ellipsis
        )
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        let mut buffer = Buffer::new();
        buffer.write_slice(data);
        buffer
    }
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        let mut buffer = Buffer::new();
        buffer.write_utf8(text);
        buffer
    }
}
