//! Named text encodings for [`Buffer::write_string`](crate::Buffer::write_string)
//! and [`Buffer::read_string`](crate::Buffer::read_string).
//!
//! Encoding follows the byte layout of the standard codecs of the same name:
//!
//! - `UTF-16` writes a big-endian byte order mark, then big-endian units
//! - `UTF-32` writes big-endian units with no byte order mark
//! - `US-ASCII` and `ISO-8859-1` write `?` for characters they cannot represent
//!
//! Decoding never fails: malformed input becomes U+FFFD. `UTF-16` and `UTF-32`
//! honor (and strip) a leading byte order mark and default to big-endian.

use std::fmt;
use std::str::FromStr;

use crate::error::BufError;

const UNMAPPABLE: u8 = b'?';

/// A supported text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// UTF-8.
    Utf8,
    /// UTF-16 with a byte order mark.
    Utf16,
    /// UTF-16, big-endian, no byte order mark.
    Utf16Be,
    /// UTF-16, little-endian, no byte order mark.
    Utf16Le,
    /// UTF-32, big-endian on encode; byte order mark aware on decode.
    Utf32,
    /// UTF-32, big-endian, no byte order mark.
    Utf32Be,
    /// UTF-32, little-endian, no byte order mark.
    Utf32Le,
    /// 7-bit ASCII.
    UsAscii,
    /// Latin-1.
    Iso8859_1,
}

#[derive(Clone, Copy)]
enum Endian {
    Big,
    Little,
}

impl Charset {
    /// Looks a charset up by name, ignoring case and accepting common aliases.
    ///
    /// # Errors
    ///
    /// [`BufError::Encoding`] if the name is not recognized.
    pub fn for_name(name: &str) -> Result<Self, BufError> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        let charset = match normalized.as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            "utf-16" | "utf16" => Charset::Utf16,
            "utf-16be" | "utf16be" | "x-utf-16be" => Charset::Utf16Be,
            "utf-16le" | "utf16le" | "x-utf-16le" => Charset::Utf16Le,
            "utf-32" | "utf32" => Charset::Utf32,
            "utf-32be" | "utf32be" | "x-utf-32be" => Charset::Utf32Be,
            "utf-32le" | "utf32le" | "x-utf-32le" => Charset::Utf32Le,
            "us-ascii" | "ascii" | "iso646-us" => Charset::UsAscii,
            "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => Charset::Iso8859_1,
            _ => {
                return Err(BufError::Encoding {
                    charset: name.to_string(),
                });
            }
        };
        Ok(charset)
    }

    /// The canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16 => "UTF-16",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf32 => "UTF-32",
            Charset::Utf32Be => "UTF-32BE",
            Charset::Utf32Le => "UTF-32LE",
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Encodes `text`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Utf16 => {
                if text.is_empty() {
                    return Vec::new();
                }
                let mut out = vec![0xfe, 0xff];
                encode_utf16(text, Endian::Big, &mut out);
                out
            }
            Charset::Utf16Be => {
                let mut out = Vec::with_capacity(text.len() * 2);
                encode_utf16(text, Endian::Big, &mut out);
                out
            }
            Charset::Utf16Le => {
                let mut out = Vec::with_capacity(text.len() * 2);
                encode_utf16(text, Endian::Little, &mut out);
                out
            }
            Charset::Utf32 | Charset::Utf32Be => encode_utf32(text, Endian::Big),
            Charset::Utf32Le => encode_utf32(text, Endian::Little),
            Charset::UsAscii => encode_single_byte(text, 0x7f),
            Charset::Iso8859_1 => encode_single_byte(text, 0xff),
        }
    }

    /// Decodes `bytes`, replacing malformed input with U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Utf16 => match bytes {
                [0xfe, 0xff, rest @ ..] => decode_utf16(rest, Endian::Big),
                [0xff, 0xfe, rest @ ..] => decode_utf16(rest, Endian::Little),
                _ => decode_utf16(bytes, Endian::Big),
            },
            Charset::Utf16Be => decode_utf16(bytes, Endian::Big),
            Charset::Utf16Le => decode_utf16(bytes, Endian::Little),
            Charset::Utf32 => match bytes {
                [0x00, 0x00, 0xfe, 0xff, rest @ ..] => decode_utf32(rest, Endian::Big),
                [0xff, 0xfe, 0x00, 0x00, rest @ ..] => decode_utf32(rest, Endian::Little),
                _ => decode_utf32(bytes, Endian::Big),
            },
            Charset::Utf32Be => decode_utf32(bytes, Endian::Big),
            Charset::Utf32Le => decode_utf32(bytes, Endian::Little),
            Charset::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            Charset::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl FromStr for Charset {
    type Err = BufError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn encode_utf16(text: &str, endian: Endian, out: &mut Vec<u8>) {
    for unit in text.encode_utf16() {
        match endian {
            Endian::Big => out.extend_from_slice(&unit.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&unit.to_le_bytes()),
        }
    }
}

fn encode_utf32(text: &str, endian: Endian) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 4);
    for c in text.chars() {
        let v = c as u32;
        match endian {
            Endian::Big => out.extend_from_slice(&v.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
    out
}

fn encode_single_byte(text: &str, max: u32) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let v = c as u32;
            if v <= max { v as u8 } else { UNMAPPABLE }
        })
        .collect()
}

fn decode_utf16(bytes: &[u8], endian: Endian) -> String {
    let units = bytes.chunks_exact(2).map(|pair| match endian {
        Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
        Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
    });
    let mut text: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 2 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

fn decode_utf32(bytes: &[u8], endian: Endian) -> String {
    let mut text: String = bytes
        .chunks_exact(4)
        .map(|quad| {
            let v = match endian {
                Endian::Big => u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]),
                Endian::Little => u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]),
            };
            char::from_u32(v).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect();
    if bytes.len() % 4 != 0 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}
