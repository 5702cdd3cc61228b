//! Segments: fixed-capacity slices of byte storage.
//!
//! A [`Segment`] is a view `pos..limit` into a `SEGMENT_SIZE` byte block. The
//! block sits behind an `Arc`, so several segments (in the same or different
//! buffers) can read the same bytes. Writing is only allowed through a segment
//! that owns its block and is its sole holder; everything else goes through
//! [`Segment::unshared_copy`] first.
//!
//! - [`Segment`] - Cursors plus shared block
//! - [`SegmentPool`] - Bounded free list of blocks

mod pool;

use std::fmt;
use std::sync::Arc;

pub use pool::{PoolStats, SegmentPool};

/// The capacity of every segment, in bytes.
pub const SEGMENT_SIZE: usize = 8192;

/// Transfers of at least this many bytes share the block instead of copying.
pub(crate) const SHARE_MINIMUM: usize = 1024;

pub(crate) type Block = [u8; SEGMENT_SIZE];

/// A slice of a fixed-size byte block with read and write cursors.
///
/// Invariant: `pos <= limit <= SEGMENT_SIZE`. Bytes in `pos..limit` are
/// readable; bytes in `limit..SEGMENT_SIZE` are free for appending when the
/// segment is writable.
pub struct Segment {
    data: Arc<Block>,
    pos: usize,
    limit: usize,
    owner: bool,
}

impl Segment {
    pub(crate) fn new(data: Arc<Block>) -> Self {
        Self {
            data,
            pos: 0,
            limit: 0,
            owner: true,
        }
    }

    /// Number of readable bytes.
    pub fn len(&self) -> usize {
        self.limit - self.pos
    }

    /// Returns true if there is nothing left to read.
    pub fn is_empty(&self) -> bool {
        self.pos == self.limit
    }

    /// Free bytes after the write cursor.
    pub fn remaining(&self) -> usize {
        SEGMENT_SIZE - self.limit
    }

    /// Read cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Write cursor.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether this segment may append into its block.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Number of segments referencing the same block, this one included.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    /// Returns true if another segment references the same block.
    pub fn is_shared(&self) -> bool {
        self.share_count() > 1
    }

    /// Owner and sole holder of the block.
    pub(crate) fn is_writable(&self) -> bool {
        self.owner && !self.is_shared()
    }

    /// The readable bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.pos..self.limit]
    }

    fn block_mut(&mut self) -> &mut Block {
        assert!(self.owner, "write to a segment that does not own its block");
        Arc::get_mut(&mut self.data).expect("write to a shared segment")
    }

    /// Appends `bytes` after the write cursor.
    ///
    /// # Panics
    ///
    /// Panics if the bytes do not fit or the segment is not writable.
    pub(crate) fn write(&mut self, bytes: &[u8]) {
        let limit = self.limit;
        let end = limit + bytes.len();
        assert!(end <= SEGMENT_SIZE, "segment capacity exceeded");
        self.block_mut()[limit..end].copy_from_slice(bytes);
        self.limit = end;
    }

    /// Free space after the write cursor, to be committed with [`Segment::commit`].
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let limit = self.limit;
        &mut self.block_mut()[limit..]
    }

    pub(crate) fn commit(&mut self, byte_count: usize) {
        assert!(byte_count <= self.remaining(), "segment capacity exceeded");
        self.limit += byte_count;
    }

    /// Copies readable bytes into `dst`, advancing the read cursor.
    pub(crate) fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = self.len().min(dst.len());
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Advances the read cursor without copying.
    pub(crate) fn consume(&mut self, byte_count: usize) {
        assert!(byte_count <= self.len(), "consumed past the write cursor");
        self.pos += byte_count;
    }

    /// Marks every byte as read.
    pub(crate) fn drain(&mut self) {
        self.pos = self.limit;
    }

    /// Splits off the first `byte_count` readable bytes as a new segment
    /// sharing this block. Both halves lose ownership.
    pub(crate) fn split(&mut self, byte_count: usize) -> Segment {
        assert!(
            byte_count > 0 && byte_count <= self.len(),
            "split outside the readable range"
        );
        let prefix = Segment {
            data: Arc::clone(&self.data),
            pos: self.pos,
            limit: self.pos + byte_count,
            owner: false,
        };
        self.pos += byte_count;
        self.owner = false;
        prefix
    }

    /// Another read-only view of the same bytes.
    pub(crate) fn shared_copy(&self) -> Segment {
        Segment {
            data: Arc::clone(&self.data),
            pos: self.pos,
            limit: self.limit,
            owner: false,
        }
    }

    /// Copies the readable bytes into a fresh block from `pool`.
    pub(crate) fn unshared_copy(&self, pool: &SegmentPool) -> Segment {
        let mut copy = pool.take();
        copy.write(self.as_slice());
        copy
    }

    /// Moves the first `byte_count` readable bytes into `sink`, shifting the
    /// sink's bytes to the front of its block if the tail room is too small.
    pub(crate) fn move_to(&mut self, sink: &mut Segment, byte_count: usize) {
        assert!(sink.is_writable(), "move into a read-only segment");
        assert!(byte_count <= self.len(), "move past the write cursor");
        if sink.limit + byte_count > SEGMENT_SIZE {
            assert!(
                sink.len() + byte_count <= SEGMENT_SIZE,
                "segment capacity exceeded"
            );
            let (pos, limit) = (sink.pos, sink.limit);
            sink.block_mut().copy_within(pos..limit, 0);
            sink.limit -= pos;
            sink.pos = 0;
        }
        let start = self.pos;
        sink.write(&self.data[start..start + byte_count]);
        self.pos += byte_count;
    }

    /// Hands the block back if nothing else references it.
    pub(crate) fn into_block(self) -> Option<Arc<Block>> {
        if Arc::strong_count(&self.data) == 1 {
            Some(self.data)
        } else {
            None
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("pos", &self.pos)
            .field("limit", &self.limit)
            .field("owner", &self.owner)
            .field("share_count", &self.share_count())
            .finish()
    }
}
