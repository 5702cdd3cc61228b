//! Bridges between [`std::io`] and the [`Sink`] / [`Source`] traits.
//!
//! - [`ReaderSource`] - Reads from any [`Read`] straight into segment memory
//! - [`WriterSink`] - Writes buffered segments to any [`Write`]
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use segbuf::{BufSink, BufSource, BufferedSink, BufferedSource, ReaderSource, Sink, WriterSink};
//!
//! let mut sink = BufferedSink::new(WriterSink::new(Vec::new()));
//! sink.write_int(7)?.write_utf8("seven")?;
//! sink.flush()?;
//! let bytes = sink.get_ref().get_ref().clone();
//!
//! let mut source = BufferedSource::new(ReaderSource::new(Cursor::new(bytes)));
//! assert_eq!(source.read_int()?, 7);
//! assert_eq!(source.read_utf8_to_end()?, "seven");
//! # Ok::<(), segbuf::BufError>(())
//! ```

use std::io::{self, Read, Write};

use crate::buffer::Buffer;
use crate::error::Result;
use crate::stream::{Sink, Source};

/// A [`Source`] backed by a [`Read`].
///
/// Each call reads into the free space of the destination buffer's tail
/// segment, so no intermediate copy is made. Reads interrupted by a signal
/// are retried.
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// The wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// The wrapped reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
        if byte_count == 0 {
            return Ok(0);
        }
        loop {
            match sink.write_with(byte_count, |dst| self.reader.read(dst)) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A [`Sink`] backed by a [`Write`].
///
/// Segments are written as they are, one slice per segment.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// The wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// The wrapped writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        source.ensure_len(byte_count)?;
        let mut remaining = byte_count;
        while remaining > 0 {
            let written = match source.chunks().next() {
                Some(chunk) => {
                    let n = chunk.len().min(remaining);
                    self.writer.write_all(&chunk[..n])?;
                    n
                }
                None => break,
            };
            source.consume(written);
            remaining -= written;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}
