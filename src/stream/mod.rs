//! Endpoints and the buffered layer on top of them.
//!
//! - [`Sink`] / [`Source`] - Minimal byte consumer / producer capabilities
//! - [`BufSink`] / [`BufSource`] - Typed writes and reads against a [`Buffer`]
//! - [`BufferedSink`] / [`BufferedSource`] - Wrap an endpoint with a buffer
//!
//! [`Buffer`] is itself a `Sink`, `Source`, `BufSink` and `BufSource`, so code
//! written against the traits works in memory and against real endpoints.

mod sink;
mod source;

use crate::buffer::Buffer;
use crate::error::Result;

pub use sink::{BufSink, BufferedSink};
pub use source::{BufSource, BufferedSource};

/// Consumes bytes.
pub trait Sink {
    /// Removes `byte_count` bytes from the head of `source` and consumes them.
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()>;

    /// Pushes any bytes held by this sink further downstream.
    fn flush(&mut self) -> Result<()>;

    /// Releases the sink. Pending bytes are flushed first where that applies.
    fn close(&mut self) -> Result<()>;
}

/// Produces bytes.
pub trait Source {
    /// Appends up to `byte_count` bytes to `sink` and returns how many were
    /// appended. Returns 0 at end of stream (or when `byte_count` is 0).
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize>;

    /// Releases the source.
    fn close(&mut self) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        (**self).write(source, byte_count)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        (**self).write(source, byte_count)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
        (**self).read(sink, byte_count)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
        (**self).read(sink, byte_count)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl Sink for Buffer {
    fn write(&mut self, source: &mut Buffer, byte_count: usize) -> Result<()> {
        self.write_from(source, byte_count)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Source for Buffer {
    fn read(&mut self, sink: &mut Buffer, byte_count: usize) -> Result<usize> {
        let n = byte_count.min(self.len());
        if n > 0 {
            sink.write_from(self, n)?;
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_as_source_reads_at_most_byte_count() {
        let mut source = Buffer::from("abcdef");
        let mut sink = Buffer::new();
        assert_eq!(Source::read(&mut source, &mut sink, 4).unwrap(), 4);
        assert_eq!(Source::read(&mut source, &mut sink, 4).unwrap(), 2);
        assert_eq!(Source::read(&mut source, &mut sink, 4).unwrap(), 0);
        assert_eq!(sink.read_utf8_to_end(), "abcdef");
    }

    #[test]
    fn test_boxed_sink() {
        let mut sink: Box<dyn Sink> = Box::new(Buffer::new());
        let mut source = Buffer::from("xy");
        sink.write(&mut source, 2).unwrap();
        assert!(source.is_empty());
        sink.close().unwrap();
    }
}
