//! Buffered reading.

use std::sync::Arc;

use bytes::Bytes;

use super::{Sink, Source};
use crate::buffer::Buffer;
use crate::charset::Charset;
use crate::error::{BufError, Result};
use crate::segment::{SEGMENT_SIZE, SegmentPool};

/// Typed reads from a buffer that refills on demand.
///
/// [`Buffer`] implements this by reading only what it already holds;
/// [`BufferedSource`] pulls more bytes from its endpoint when a read needs
/// them. Reads that cannot be satisfied fail without consuming anything:
/// [`BufError::Underflow`] from a `Buffer`, [`BufError::EndOfStream`] from a
/// `BufferedSource`.
pub trait BufSource: Source {
    /// The buffer reads are served from.
    fn buffered(&mut self) -> &mut Buffer;

    /// Buffers at least `byte_count` bytes if possible and reports whether it
    /// succeeded.
    fn request(&mut self, byte_count: usize) -> Result<bool>;

    /// Buffers at least `byte_count` bytes or fails.
    fn require(&mut self, byte_count: usize) -> Result<()>;

    /// Returns true if no bytes are buffered and none are left upstream.
    fn exhausted(&mut self) -> Result<bool>;

    /// Fills `dst` completely.
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.require(dst.len())?;
        self.buffered().read_exact(dst)
    }

    /// Reads one byte.
    fn read_byte(&mut self) -> Result<u8> {
        self.require(1)?;
        self.buffered().read_byte()
    }

    /// Reads a big-endian 16-bit value.
    fn read_short(&mut self) -> Result<u16> {
        self.require(2)?;
        self.buffered().read_short()
    }

    /// Reads a little-endian 16-bit value.
    fn read_short_le(&mut self) -> Result<u16> {
        self.require(2)?;
        self.buffered().read_short_le()
    }

    /// Reads a big-endian 32-bit value.
    fn read_int(&mut self) -> Result<u32> {
        self.require(4)?;
        self.buffered().read_int()
    }

    /// Reads a little-endian 32-bit value.
    fn read_int_le(&mut self) -> Result<u32> {
        self.require(4)?;
        self.buffered().read_int_le()
    }

    /// Reads a big-endian 64-bit value.
    fn read_long(&mut self) -> Result<u64> {
        self.require(8)?;
        self.buffered().read_long()
    }

    /// Reads a little-endian 64-bit value.
    fn read_long_le(&mut self) -> Result<u64> {
        self.require(8)?;
        self.buffered().read_long_le()
    }

    /// Reads `byte_count` bytes into a vector.
    fn read_bytes(&mut self, byte_count: usize) -> Result<Vec<u8>> {
        self.require(byte_count)?;
        self.buffered().read_bytes(byte_count)
    }

    /// Reads `byte_count` bytes as an immutable byte string.
    fn read_byte_string(&mut self, byte_count: usize) -> Result<Bytes> {
        self.require(byte_count)?;
        self.buffered().read_byte_string(byte_count)
    }

    /// Reads until the end of the stream.
    fn read_byte_string_to_end(&mut self) -> Result<Bytes> {
        self.request(usize::MAX)?;
        Ok(self.buffered().read_byte_string_to_end())
    }

    /// Decodes `byte_count` bytes as UTF-8, replacing malformed sequences.
    fn read_utf8(&mut self, byte_count: usize) -> Result<String> {
        self.require(byte_count)?;
        self.buffered().read_utf8(byte_count)
    }

    /// Decodes the rest of the stream as UTF-8.
    fn read_utf8_to_end(&mut self) -> Result<String> {
        self.request(usize::MAX)?;
        Ok(self.buffered().read_utf8_to_end())
    }

    /// Decodes `byte_count` bytes with the charset called `charset`.
    fn read_string(&mut self, byte_count: usize, charset: &str) -> Result<String> {
        let charset = Charset::for_name(charset)?;
        let bytes = self.read_byte_string(byte_count)?;
        Ok(charset.decode(&bytes))
    }

    /// Reads a line terminated by `\n` or `\r\n`, without the terminator.
    ///
    /// The final line may lack a terminator. Returns `None` at end of stream.
    fn read_utf8_line(&mut self) -> Result<Option<String>> {
        let mut scanned = 0;
        loop {
            if let Some(newline) = self.buffered().index_of(b'\n', scanned) {
                return Ok(Some(self.buffered().read_line_at(newline)));
            }
            scanned = self.buffered().len();
            if !self.request(scanned + 1)? {
                break;
            }
        }
        let buffer = self.buffered();
        if buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buffer.read_utf8_to_end()))
        }
    }

    /// Discards `byte_count` bytes.
    ///
    /// # Errors
    ///
    /// [`BufError::EndOfStream`] if the stream ends first. The bytes that were
    /// available are discarded anyway.
    fn skip(&mut self, byte_count: usize) -> Result<()> {
        let mut remaining = byte_count;
        while remaining > 0 {
            if !self.request(1)? {
                return Err(BufError::EndOfStream {
                    requested: byte_count,
                    available: byte_count - remaining,
                });
            }
            let buffer = self.buffered();
            let n = remaining.min(buffer.len());
            buffer.skip(n)?;
            remaining -= n;
        }
        Ok(())
    }

    /// Moves every remaining byte into `sink` and returns how many moved.
    fn read_all<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let mut total = 0;
        while self.request(1)? {
            let buffer = self.buffered();
            let n = buffer.len();
            sink.write(buffer, n)?;
            total += n;
        }
        Ok(total)
    }
}

impl BufSource for Buffer {
    fn buffered(&mut self) -> &mut Buffer {
        self
    }

    fn request(&mut self, byte_count: usize) -> Result<bool> {
        Ok(self.len() >= byte_count)
    }

    fn require(&mut self, byte_count: usize) -> Result<()> {
        self.ensure_len(byte_count)
    }

    fn exhausted(&mut self) -> Result<bool> {
        Ok(self.is_empty())
    }
}

/// A [`Source`] wrapper that reads ahead one segment at a time.
///
/// Small typed reads are served from the internal buffer; the endpoint only
/// sees reads of up to [`SEGMENT_SIZE`] bytes.
///
/// # Example
///
/// ```
/// use segbuf::{BufSource, Buffer, BufferedSource};
///
/// let mut source = BufferedSource::new(Buffer::from("line one\nline two"));
/// assert_eq!(source.read_utf8_line()?.as_deref(), Some("line one"));
/// assert_eq!(source.read_utf8_line()?.as_deref(), Some("line two"));
/// assert!(source.exhausted()?);
/// # Ok::<(), segbuf::BufError>(())
/// ```
pub struct BufferedSource<S: Source> {
    buffer: Buffer,
    source: S,
    closed: bool,
}

impl<S: Source> BufferedSource<S> {
    /// Wraps `source`, buffering in segments from the process-wide pool.
    pub fn new(source: S) -> Self {
        Self::with_pool(source, SegmentPool::shared())
    }

    /// Wraps `source`, buffering in segments from `pool`.
    pub fn with_pool(source: S, pool: Arc<SegmentPool>) -> Self {
        Self {
            buffer: Buffer::with_pool(pool),
            source,
            closed: false,
        }
    }

    /// The wrapped source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// The wrapped source. Reading from it directly skips buffered bytes.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Bytes read ahead but not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true once [`close`](Source::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BufError::Closed);
        }
        Ok(())
    }

    fn fill(&mut self) -> Result<usize> {
        let n = self.source.read(&mut self.buffer, SEGMENT_SIZE)?;
        tracing::trace!(bytes = n, buffered = self.buffer.len(), "refilled from source");
        Ok(n)
    }
}

impl<S: Source> Source for BufferedSource<S> {
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
        self.ensure_open()?;
        if byte_count == 0 {
            return Ok(0);
        }
        if self.buffer.is_empty() && self.fill()? == 0 {
            return Ok(0);
        }
        let n = byte_count.min(self.buffer.len());
        sink.write_from(&mut self.buffer, n)?;
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer.clear();
        tracing::debug!("buffered source closed");
        self.source.close()
    }
}

impl<S: Source> BufSource for BufferedSource<S> {
    fn buffered(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn request(&mut self, byte_count: usize) -> Result<bool> {
        self.ensure_open()?;
        while self.buffer.len() < byte_count {
            if self.fill()? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn require(&mut self, byte_count: usize) -> Result<()> {
        if !self.request(byte_count)? {
            return Err(BufError::EndOfStream {
                requested: byte_count,
                available: self.buffer.len(),
            });
        }
        Ok(())
    }

    fn exhausted(&mut self) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.buffer.is_empty() && self.fill()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per read.
    struct Trickle {
        data: Buffer,
        step: usize,
        reads: usize,
        closes: usize,
    }

    impl Trickle {
        fn new(data: &[u8], step: usize) -> Self {
            Self {
                data: Buffer::from(data),
                step,
                reads: 0,
                closes: 0,
            }
        }
    }

    impl Source for Trickle {
        fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
            self.reads += 1;
            Source::read(&mut self.data, sink, byte_count.min(self.step))
        }

        fn close(&mut self) -> Result<()> {
            self.closes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_int_split_across_reads() {
        let mut source = BufferedSource::new(Trickle::new(&[0xca, 0xfe, 0xba, 0xbe, 0x01], 3));
        assert_eq!(source.read_int().unwrap(), 0xcafe_babe);
        assert_eq!(source.get_ref().reads, 2);
        assert_eq!(source.read_byte().unwrap(), 1);
        assert!(source.exhausted().unwrap());
    }

    #[test]
    fn test_end_of_stream_is_reported() {
        let mut source = BufferedSource::new(Trickle::new(&[1, 2], 1));
        let err = source.read_int().unwrap_err();
        assert!(matches!(
            err,
            BufError::EndOfStream {
                requested: 4,
                available: 2
            }
        ));
        // Nothing was consumed
        assert_eq!(source.read_short().unwrap(), 0x0102);
    }

    #[test]
    fn test_buffer_reports_underflow() {
        let mut buffer = Buffer::from(&[1u8][..]);
        let err = BufSource::require(&mut buffer, 2).unwrap_err();
        assert!(matches!(err, BufError::Underflow { .. }));
        assert!(!BufSource::request(&mut buffer, 2).unwrap());
    }

    #[test]
    fn test_request_does_not_consume() {
        let mut source = BufferedSource::new(Trickle::new(b"abcdef", 2));
        assert!(source.request(5).unwrap());
        assert_eq!(source.buffered_len(), 6);
        assert!(!source.request(7).unwrap());
        assert_eq!(source.read_utf8_to_end().unwrap(), "abcdef");
    }

    #[test]
    fn test_lines_across_reads() {
        let mut source = BufferedSource::new(Trickle::new(b"ab\r\ncd\nef", 1));
        assert_eq!(source.read_utf8_line().unwrap().as_deref(), Some("ab"));
        assert_eq!(source.read_utf8_line().unwrap().as_deref(), Some("cd"));
        assert_eq!(source.read_utf8_line().unwrap().as_deref(), Some("ef"));
        assert_eq!(source.read_utf8_line().unwrap(), None);
    }

    #[test]
    fn test_skip_past_end() {
        let mut source = BufferedSource::new(Trickle::new(b"abc", 2));
        source.skip(1).unwrap();
        let err = source.skip(5).unwrap_err();
        assert!(matches!(
            err,
            BufError::EndOfStream {
                requested: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_read_all_into_sink() {
        let mut source = BufferedSource::new(Trickle::new(&vec![7u8; SEGMENT_SIZE + 3], 4096));
        let mut sink = Buffer::new();
        assert_eq!(source.read_all(&mut sink).unwrap(), SEGMENT_SIZE + 3);
        assert_eq!(sink.len(), SEGMENT_SIZE + 3);
        assert_eq!(source.read_all(&mut sink).unwrap(), 0);
    }

    #[test]
    fn test_source_serves_buffered_bytes_first() {
        let mut source = BufferedSource::new(Trickle::new(b"hello", 5));
        assert_eq!(source.read_byte().unwrap(), b'h');

        let mut sink = Buffer::new();
        assert_eq!(Source::read(&mut source, &mut sink, 10).unwrap(), 4);
        assert_eq!(Source::read(&mut source, &mut sink, 10).unwrap(), 0);
        assert_eq!(sink.read_utf8_to_end(), "ello");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut source = BufferedSource::new(Trickle::new(b"abc", 3));
        source.request(1).unwrap();
        source.close().unwrap();
        source.close().unwrap();
        assert_eq!(source.get_ref().closes, 1);
        assert_eq!(source.buffered_len(), 0);
        assert!(matches!(source.read_byte(), Err(BufError::Closed)));
    }
}
