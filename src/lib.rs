//! segbuf
//!
//! Segmented, pooled byte buffers with zero-copy transfer for Rust.
//!
//! `segbuf` stores bytes as a chain of fixed-size segments drawn from a
//! shared pool. Moving bytes between buffers moves segments by reference, and
//! small typed writes are batched into whole segments before they reach an
//! endpoint. It is a small building block for:
//!
//! - protocol encoders and decoders
//! - stream framing
//! - copying between I/O endpoints without intermediate allocations
//!
//! The crate intentionally:
//! - does NOT do async I/O
//! - does NOT synchronize buffers (only the pool is shared)
//! - does NOT impose timeouts or cancellation
//!
//! # In memory
//!
//! ```
//! use segbuf::Buffer;
//!
//! let mut buffer = Buffer::new();
//! buffer.write_int(0xcafebabe).write_utf8("payload");
//!
//! let mut other = Buffer::new();
//! other.write_from(&mut buffer, 4)?;
//! assert_eq!(other.read_int()?, 0xcafebabe);
//! assert_eq!(buffer.read_utf8_to_end(), "payload");
//! # Ok::<(), segbuf::BufError>(())
//! ```
//!
//! # Over I/O
//!
//! ```no_run
//! use std::fs::File;
//! use segbuf::{BufSink, BufferedSink, BufferedSource, ReaderSource, Sink, WriterSink};
//!
//! fn copy(from: &str, to: &str) -> segbuf::Result<usize> {
//!     let mut source = BufferedSource::new(ReaderSource::new(File::open(from)?));
//!     let mut sink = BufferedSink::new(WriterSink::new(File::create(to)?));
//!     let n = sink.write_all(&mut source)?;
//!     sink.close()?;
//!     Ok(n)
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapters;
mod buffer;
mod charset;
mod config;
mod error;
mod hash;
mod segment;
mod stream;

//
// Public surface
//

pub use adapters::{ReaderSource, WriterSink};
pub use buffer::Buffer;
pub use charset::Charset;
pub use config::{DEFAULT_MAX_POOL_SIZE, PoolConfig};
pub use error::{BufError, Result};
pub use hash::Digest;
pub use segment::{PoolStats, SEGMENT_SIZE, Segment, SegmentPool};
pub use stream::{BufSink, BufSource, BufferedSink, BufferedSource, Sink, Source};
