//! Content digests of buffered bytes.
//!
//! [`Digest`] is the value returned by `Buffer::blake3` (requires the
//! `hash-blake3` feature).

mod digest;

pub use digest::Digest;
