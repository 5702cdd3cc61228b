//! Typed appends.
//!
//! Multi-byte values that do not fit in the tail segment continue in a new
//! segment; there is no padding or alignment.

use super::Buffer;
use crate::charset::Charset;
use crate::error::Result;

/// Written in place of code points that cannot be encoded.
const REPLACEMENT_BYTE: u8 = b'?';

impl Buffer {
    /// Appends `bytes`.
    pub fn write_slice(&mut self, bytes: &[u8]) -> &mut Self {
        let mut rest = bytes;
        while !rest.is_empty() {
            let tail = self.writable_tail(1);
            let n = tail.remaining().min(rest.len());
            tail.write(&rest[..n]);
            rest = &rest[n..];
        }
        self.size += bytes.len();
        self
    }

    /// Appends one byte.
    pub fn write_byte(&mut self, b: u8) -> &mut Self {
        self.writable_tail(1).write(&[b]);
        self.size += 1;
        self
    }

    /// Appends a big-endian 16-bit value.
    pub fn write_short(&mut self, v: u16) -> &mut Self {
        self.write_slice(&v.to_be_bytes())
    }

    /// Appends a little-endian 16-bit value.
    pub fn write_short_le(&mut self, v: u16) -> &mut Self {
        self.write_slice(&v.to_le_bytes())
    }

    /// Appends a big-endian 32-bit value.
    pub fn write_int(&mut self, v: u32) -> &mut Self {
        self.write_slice(&v.to_be_bytes())
    }

    /// Appends a little-endian 32-bit value.
    pub fn write_int_le(&mut self, v: u32) -> &mut Self {
        self.write_slice(&v.to_le_bytes())
    }

    /// Appends a big-endian 64-bit value.
    pub fn write_long(&mut self, v: u64) -> &mut Self {
        self.write_slice(&v.to_be_bytes())
    }

    /// Appends a little-endian 64-bit value.
    pub fn write_long_le(&mut self, v: u64) -> &mut Self {
        self.write_slice(&v.to_le_bytes())
    }

    /// Appends `text` as UTF-8.
    ///
    /// `str` is already UTF-8, so this copies straight into segment memory.
    pub fn write_utf8(&mut self, text: &str) -> &mut Self {
        self.write_slice(text.as_bytes())
    }

    /// Appends one code point as 1 to 4 bytes of UTF-8.
    ///
    /// Surrogates (`0xD800..=0xDFFF`) and values above `0x10FFFF` have no UTF-8
    /// encoding and are written as `?`.
    pub fn write_code_point(&mut self, code_point: u32) -> &mut Self {
        match char::from_u32(code_point) {
            Some(c) => self.write_char(c),
            None => self.write_byte(REPLACEMENT_BYTE),
        }
    }

    /// Transcodes UTF-16 code units to UTF-8.
    ///
    /// Surrogate pairs combine into a single 4-byte sequence. Unpaired
    /// surrogates are written as `?`.
    pub fn write_utf16(&mut self, units: &[u16]) -> &mut Self {
        for decoded in char::decode_utf16(units.iter().copied()) {
            match decoded {
                Ok(c) => self.write_char(c),
                Err(_) => self.write_byte(REPLACEMENT_BYTE),
            };
        }
        self
    }

    fn write_char(&mut self, c: char) -> &mut Self {
        let mut utf8 = [0u8; 4];
        self.write_slice(c.encode_utf8(&mut utf8).as_bytes())
    }

    /// Appends `text` encoded with the charset called `charset`.
    ///
    /// # Errors
    ///
    /// [`BufError::Encoding`](crate::BufError::Encoding) if the charset is unknown.
    pub fn write_string(&mut self, text: &str, charset: &str) -> Result<&mut Self> {
        let charset = Charset::for_name(charset)?;
        Ok(self.write_string_with(text, charset))
    }

    /// Appends `text` encoded with `charset`.
    pub fn write_string_with(&mut self, text: &str, charset: Charset) -> &mut Self {
        match charset {
            Charset::Utf8 => self.write_utf8(text),
            other => self.write_slice(&other.encode(text)),
        }
    }
}
