//! Buffered file copy with a line count.
//!
//! Run with:
//!     cargo run --example sync_file -- /path/to/file

use std::env;
use std::fs::File;

use segbuf::{BufSink, BufSource, BufferedSink, BufferedSource, ReaderSource, Sink, WriterSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    println!("Reading file: {}\n", path);

    let mut source = BufferedSource::new(ReaderSource::new(File::open(&path)?));
    let mut sink = BufferedSink::new(WriterSink::new(Vec::new()));

    let mut lines = 0;
    while let Some(line) = source.read_utf8_line()? {
        lines += 1;
        sink.write_utf8(&line)?.write_byte(b'\n')?;
    }
    sink.close()?;

    let copied = sink.get_ref().get_ref();
    println!("Lines: {}", lines);
    println!("Copied: {} bytes (line endings normalized)", copied.len());

    Ok(())
}
