//! Typed writes, zero-copy transfer and reads on in-memory buffers.
//!
//! Run with:
//!     cargo run --example sync_basic

use segbuf::{Buffer, SEGMENT_SIZE, SegmentPool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Encode a few length-prefixed records
    let mut outgoing = Buffer::new();
    for name in ["alpha", "beta", "gamma"] {
        outgoing.write_short(name.len() as u16).write_utf8(name);
    }
    outgoing.write_slice(&vec![0u8; 2 * SEGMENT_SIZE]);
    println!("outgoing: {} bytes in segments {:?}", outgoing.len(), outgoing.segment_sizes());

    // Move everything to another buffer without copying whole segments
    let mut incoming = Buffer::new();
    let len = outgoing.len();
    incoming.write_from(&mut outgoing, len)?;
    println!("incoming: {} bytes in segments {:?}", incoming.len(), incoming.segment_sizes());

    for _ in 0..3 {
        let len = incoming.read_short()? as usize;
        println!("record: {}", incoming.read_utf8(len)?);
    }

    #[cfg(feature = "hash-blake3")]
    println!("padding digest: {}", incoming.blake3());

    incoming.clear();
    let stats = SegmentPool::shared().stats();
    println!(
        "pool: allocated={} reused={} recycled={} discarded={}",
        stats.allocated, stats.reused, stats.recycled, stats.discarded
    );

    Ok(())
}
