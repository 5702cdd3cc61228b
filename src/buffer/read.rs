//! Typed reads.
//!
//! Every read consumes bytes from the head of the buffer and recycles the
//! segments it drains. Reads that need more bytes than are buffered fail with
//! [`BufError::Underflow`] and consume nothing.

use bytes::{Bytes, BytesMut};

use super::Buffer;
use crate::charset::Charset;
use crate::error::{BufError, Result};

impl Buffer {
    /// Fills `dst` completely.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.ensure_len(dst.len())?;
        let mut filled = 0;
        while filled < dst.len() {
            let Some(head) = self.segments.front_mut() else {
                break;
            };
            let n = head.read_into(&mut dst[filled..]);
            filled += n;
            self.size -= n;
            if head.is_empty() {
                self.recycle_head();
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Reads a big-endian 16-bit value.
    pub fn read_short(&mut self) -> Result<u16> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    /// Reads a little-endian 16-bit value.
    pub fn read_short_le(&mut self) -> Result<u16> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    /// Reads a big-endian 32-bit value.
    pub fn read_int(&mut self) -> Result<u32> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    /// Reads a little-endian 32-bit value.
    pub fn read_int_le(&mut self) -> Result<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    /// Reads a big-endian 64-bit value.
    pub fn read_long(&mut self) -> Result<u64> {
        self.read_array::<8>().map(u64::from_be_bytes)
    }

    /// Reads a little-endian 64-bit value.
    pub fn read_long_le(&mut self) -> Result<u64> {
        self.read_array::<8>().map(u64::from_le_bytes)
    }

    /// Reads `byte_count` bytes into a vector.
    pub fn read_bytes(&mut self, byte_count: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; byte_count];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Reads `byte_count` bytes as an immutable byte string.
    pub fn read_byte_string(&mut self, byte_count: usize) -> Result<Bytes> {
        self.ensure_len(byte_count)?;
        let mut out = BytesMut::with_capacity(byte_count);
        let mut remaining = byte_count;
        while remaining > 0 {
            let Some(head) = self.segments.front() else {
                break;
            };
            let n = head.len().min(remaining);
            out.extend_from_slice(&head.as_slice()[..n]);
            self.consume(n);
            remaining -= n;
        }
        Ok(out.freeze())
    }

    /// Reads every byte as an immutable byte string.
    pub fn read_byte_string_to_end(&mut self) -> Bytes {
        let len = self.size;
        self.read_byte_string(len).unwrap_or_default()
    }

    /// Decodes `byte_count` bytes as UTF-8.
    ///
    /// Malformed sequences become U+FFFD; decoding never fails once the bytes
    /// are available.
    pub fn read_utf8(&mut self, byte_count: usize) -> Result<String> {
        let bytes = self.read_byte_string(byte_count)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decodes every byte as UTF-8.
    pub fn read_utf8_to_end(&mut self) -> String {
        let len = self.size;
        self.read_utf8(len).unwrap_or_default()
    }

    /// Decodes `byte_count` bytes with the charset called `charset`.
    pub fn read_string(&mut self, byte_count: usize, charset: &str) -> Result<String> {
        let charset = Charset::for_name(charset)?;
        let bytes = self.read_byte_string(byte_count)?;
        Ok(charset.decode(&bytes))
    }

    /// Reads a line terminated by `\n` or `\r\n`, without the terminator.
    ///
    /// Without a newline the rest of the buffer is returned as the last line.
    /// Returns `None` when the buffer is empty.
    pub fn read_utf8_line(&mut self) -> Option<String> {
        match self.index_of(b'\n', 0) {
            Some(newline) => Some(self.read_line_at(newline)),
            None if self.is_empty() => None,
            None => Some(self.read_utf8_to_end()),
        }
    }

    /// Reads through the `\n` at `newline`, dropping it and a preceding `\r`.
    pub(crate) fn read_line_at(&mut self, newline: usize) -> String {
        let crlf = newline > 0 && self.get(newline - 1) == Some(b'\r');
        let line_len = if crlf { newline - 1 } else { newline };
        let line = self.read_utf8(line_len).unwrap_or_default();
        self.consume(newline + 1 - line_len);
        line
    }
}

impl From<Buffer> for Bytes {
    fn from(mut buffer: Buffer) -> Self {
        buffer.read_byte_string_to_end()
    }
}
