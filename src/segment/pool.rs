//! Bounded pool of recycled segment blocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::{Block, SEGMENT_SIZE, Segment};
use crate::config::PoolConfig;

/// A free list of segment blocks with a byte budget.
///
/// Pools are shared by reference (`Arc<SegmentPool>`) between any number of
/// buffers, on any thread. `take` and `recycle` serialize on one mutex; they
/// only run when a segment is allocated or fully drained, never per byte.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use segbuf::{Buffer, PoolConfig, SegmentPool};
///
/// let pool = Arc::new(SegmentPool::new(PoolConfig::default()));
/// let mut buffer = Buffer::with_pool(Arc::clone(&pool));
/// buffer.write_utf8("hello");
/// drop(buffer);
///
/// // The drained segment went back to the pool
/// assert_eq!(pool.pooled_segments(), 1);
/// ```
#[derive(Debug)]
pub struct SegmentPool {
    config: PoolConfig,
    free: Mutex<Vec<Arc<Block>>>,
    allocated: AtomicU64,
    reused: AtomicU64,
    recycled: AtomicU64,
    discarded: AtomicU64,
}

/// Point-in-time counters of a [`SegmentPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Blocks allocated because the free list was empty.
    pub allocated: u64,
    /// Blocks handed out from the free list.
    pub reused: u64,
    /// Blocks accepted back into the free list.
    pub recycled: u64,
    /// Unshared blocks dropped because the pool was full.
    pub discarded: u64,
}

impl SegmentPool {
    /// Creates an empty pool.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            free: Mutex::new(Vec::new()),
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            recycled: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// The process-wide pool used by [`Buffer::new`](crate::Buffer::new).
    pub fn shared() -> Arc<SegmentPool> {
        static SHARED: OnceLock<Arc<SegmentPool>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(SegmentPool::new(PoolConfig::default()))))
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns an empty, writable segment.
    pub fn take(&self) -> Segment {
        let recycled = self.free.lock().pop();
        match recycled {
            Some(block) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("reusing pooled segment");
                Segment::new(block)
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("allocating segment");
                Segment::new(Arc::new([0u8; SEGMENT_SIZE]))
            }
        }
    }

    /// Returns a segment's block to the free list.
    ///
    /// Shared segments only drop their reference. Unshared blocks are kept
    /// while the pool is under its byte budget and dropped otherwise.
    pub fn recycle(&self, segment: Segment) {
        let Some(block) = segment.into_block() else {
            return;
        };

        let mut free = self.free.lock();
        if free.len() >= self.config.max_segments() {
            drop(free);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                max_size = self.config.max_size(),
                "segment pool full, discarding segment"
            );
            return;
        }
        free.push(block);
        drop(free);
        self.recycled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("recycled segment");
    }

    /// Number of idle segments.
    pub fn pooled_segments(&self) -> usize {
        self.free.lock().len()
    }

    /// Bytes held by idle segments.
    pub fn pooled_bytes(&self) -> usize {
        self.pooled_segments() * SEGMENT_SIZE
    }

    /// Drops every idle segment.
    pub fn clear(&self) {
        self.free.lock().clear();
    }

    /// Returns a snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for SegmentPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
