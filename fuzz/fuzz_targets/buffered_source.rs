#![no_main]

use std::io::{self, Cursor, Read};

use libfuzzer_sys::fuzz_target;
use segbuf::{BufSource, BufferedSource, ReaderSource};

/// Returns at most `step` bytes per read.
struct Dribble {
    inner: Cursor<Vec<u8>>,
    step: usize,
}

impl Read for Dribble {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step);
        self.inner.read(&mut buf[..n])
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&step, payload)) = data.split_first() else {
        return;
    };
    let reader = Dribble {
        inner: Cursor::new(payload.to_vec()),
        step: step as usize + 1,
    };
    let mut source = BufferedSource::new(ReaderSource::new(reader));

    // Lines, rejoined with their terminators, reproduce the input modulo `\r\n`
    let mut lines = Vec::new();
    while let Some(line) = source.read_utf8_line().unwrap() {
        lines.push(line);
    }
    assert!(source.exhausted().unwrap());

    let expected = String::from_utf8_lossy(payload).replace("\r\n", "\n");
    let rejoined = lines.join("\n");
    assert_eq!(rejoined.trim_end_matches('\n'), expected.trim_end_matches('\n'));
});
