//! Buffered writing.

use std::sync::Arc;

use super::{Sink, Source};
use crate::buffer::Buffer;
use crate::error::{BufError, Result};
use crate::segment::{SEGMENT_SIZE, SegmentPool};

/// Typed writes into a buffer, followed by the implementor's emission policy.
///
/// Implemented by [`Buffer`] (which never emits; the bytes simply stay in the
/// buffer) and by [`BufferedSink`] (which pushes complete segments to its
/// endpoint after every write).
///
/// # Example
///
/// ```
/// use segbuf::{BufSink, Buffer, BufferedSink, Sink};
///
/// fn write_header<S: BufSink>(sink: &mut S) -> segbuf::Result<()> {
///     sink.write_int(0xcafebabe)?.write_short(1)?.write_utf8("hdr")?;
///     Ok(())
/// }
///
/// let mut sink = BufferedSink::new(Buffer::new());
/// write_header(&mut sink)?;
/// sink.flush()?;
/// assert_eq!(sink.get_ref().len(), 9);
/// # Ok::<(), segbuf::BufError>(())
/// ```
pub trait BufSink: Sink {
    /// The buffer typed writes land in.
    ///
    /// # Errors
    ///
    /// [`BufError::Closed`] once the sink is closed.
    fn pending(&mut self) -> Result<&mut Buffer>;

    /// Pushes complete segments downstream, keeping a partially filled tail.
    fn emit_complete_segments(&mut self) -> Result<()>;

    /// Pushes every buffered byte downstream without flushing the endpoint.
    fn emit(&mut self) -> Result<()>;

    /// Writes one byte.
    fn write_byte(&mut self, b: u8) -> Result<&mut Self> {
        self.pending()?.write_byte(b);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a big-endian 16-bit value.
    fn write_short(&mut self, v: u16) -> Result<&mut Self> {
        self.pending()?.write_short(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a little-endian 16-bit value.
    fn write_short_le(&mut self, v: u16) -> Result<&mut Self> {
        self.pending()?.write_short_le(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a big-endian 32-bit value.
    fn write_int(&mut self, v: u32) -> Result<&mut Self> {
        self.pending()?.write_int(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a little-endian 32-bit value.
    fn write_int_le(&mut self, v: u32) -> Result<&mut Self> {
        self.pending()?.write_int_le(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a big-endian 64-bit value.
    fn write_long(&mut self, v: u64) -> Result<&mut Self> {
        self.pending()?.write_long(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes a little-endian 64-bit value.
    fn write_long_le(&mut self, v: u64) -> Result<&mut Self> {
        self.pending()?.write_long_le(v);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes `bytes`.
    fn write_slice(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.pending()?.write_slice(bytes);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes `text` as UTF-8.
    fn write_utf8(&mut self, text: &str) -> Result<&mut Self> {
        self.pending()?.write_utf8(text);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes one code point as UTF-8, `?` if it has no encoding.
    fn write_code_point(&mut self, code_point: u32) -> Result<&mut Self> {
        self.pending()?.write_code_point(code_point);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Transcodes UTF-16 code units to UTF-8.
    fn write_utf16(&mut self, units: &[u16]) -> Result<&mut Self> {
        self.pending()?.write_utf16(units);
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Writes `text` with the charset called `charset`.
    fn write_string(&mut self, text: &str, charset: &str) -> Result<&mut Self> {
        self.pending()?.write_string(text, charset)?;
        self.emit_complete_segments()?;
        Ok(self)
    }

    /// Drains `source` into this sink and returns the number of bytes moved.
    ///
    /// Returns 0 for an already exhausted source.
    fn write_all<S: Source + ?Sized>(&mut self, source: &mut S) -> Result<usize> {
        let mut total = 0;
        loop {
            let n = source.read(self.pending()?, SEGMENT_SIZE)?;
            if n == 0 {
                break;
            }
            total += n;
            self.emit_complete_segments()?;
        }
        Ok(total)
    }
}

impl BufSink for Buffer {
    fn pending(&mut self) -> Result<&mut Buffer> {
        Ok(self)
    }

    fn emit_complete_segments(&mut self) -> Result<()> {
        Ok(())
    }

    fn emit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A [`Sink`] wrapper that batches small writes into whole segments.
///
/// After each write every complete segment is pushed to the wrapped sink. A
/// partially filled tail stays buffered until it fills up, or until
/// [`flush`](Sink::flush), [`emit`](BufSink::emit) or [`close`](Sink::close).
///
/// Dropping an unclosed `BufferedSink` closes it; errors from that close are
/// logged and otherwise lost, so call `close` explicitly when they matter.
#[derive(Debug)]
pub struct BufferedSink<S: Sink> {
    buffer: Buffer,
    sink: S,
    closed: bool,
}

impl<S: Sink> BufferedSink<S> {
    /// Wraps `sink`, buffering in segments from the process-wide pool.
    pub fn new(sink: S) -> Self {
        Self::with_pool(sink, SegmentPool::shared())
    }

    /// Wraps `sink`, buffering in segments from `pool`.
    pub fn with_pool(sink: S, pool: Arc<SegmentPool>) -> Self {
        Self {
            buffer: Buffer::with_pool(pool),
            sink,
            closed: false,
        }
    }

    /// The wrapped sink.
    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    /// The wrapped sink. Writing to it directly bypasses buffered bytes.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Bytes written but not yet emitted.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true once [`close`](Sink::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BufError::Closed);
        }
        Ok(())
    }

    fn emit_bytes(&mut self, byte_count: usize) -> Result<()> {
        if byte_count > 0 {
            tracing::trace!(bytes = byte_count, "emitting to sink");
            self.sink.write(&mut self.buffer, byte_count)?;
        }
        Ok(())
    }
}

impl<S: Sink> Sink for BufferedSink<S> {
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        self.ensure_open()?;
        self.buffer.write_from(source, byte_count)?;
        self.emit_complete_segments()
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit_bytes(self.buffer.len())?;
        self.sink.flush()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // The endpoint is closed even if the final emit fails.
        let emitted = self.emit_bytes(self.buffer.len());
        let closed = self.sink.close();
        self.buffer.clear();
        tracing::debug!("buffered sink closed");
        emitted.and(closed)
    }
}

impl<S: Sink> BufSink for BufferedSink<S> {
    fn pending(&mut self) -> Result<&mut Buffer> {
        self.ensure_open()?;
        Ok(&mut self.buffer)
    }

    fn emit_complete_segments(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit_bytes(self.buffer.complete_segment_byte_count())
    }

    fn emit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit_bytes(self.buffer.len())
    }
}

impl<S: Sink> Drop for BufferedSink<S> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                tracing::warn!(error = %e, "failed to close buffered sink on drop");
            }
        }
    }
}
