#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use segbuf::{Buffer, SEGMENT_SIZE};

// Each input byte selects an operation; the following bytes parameterize it.
// A VecDeque models the expected contents of both buffers.
fuzz_target!(|data: &[u8]| {
    let mut buffers = [Buffer::new(), Buffer::new()];
    let mut models: [VecDeque<u8>; 2] = [VecDeque::new(), VecDeque::new()];
    let mut input = data.iter().copied();

    while let Some(op) = input.next() {
        let arg = input.next().unwrap_or(0) as usize;
        let which = (op & 1) as usize;
        let other = 1 - which;

        match op >> 1 {
            0 => {
                let bytes = vec![op; arg * 37];
                buffers[which].write_slice(&bytes);
                models[which].extend(&bytes);
            }
            1 => {
                buffers[which].write_int(arg as u32 * 0x0101_0101);
                models[which].extend((arg as u32 * 0x0101_0101).to_be_bytes());
            }
            2 => {
                let n = (arg * 131).min(models[other].len());
                let (left, right) = buffers.split_at_mut(1);
                let (to, from) = if which == 0 {
                    (&mut left[0], &mut right[0])
                } else {
                    (&mut right[0], &mut left[0])
                };
                to.write_from(from, n).unwrap();
                let moved: Vec<u8> = models[other].drain(..n).collect();
                models[which].extend(moved);
            }
            3 => {
                let n = (arg * 53).min(models[which].len());
                buffers[which].skip(n).unwrap();
                models[which].drain(..n);
            }
            4 => {
                let copy = buffers[which].clone();
                buffers[other] = copy;
                models[other] = models[which].clone();
            }
            5 => {
                let expected = models[which].pop_front();
                assert_eq!(buffers[which].read_byte().ok(), expected);
            }
            _ => {
                buffers[which].write_utf8("é");
                models[which].extend("é".as_bytes());
            }
        }

        for (buffer, model) in buffers.iter().zip(&models) {
            assert_eq!(buffer.len(), model.len());
            assert!(buffer.segment_sizes().iter().all(|&s| s > 0 && s <= SEGMENT_SIZE));
        }
    }

    for (buffer, model) in buffers.iter().zip(&models) {
        assert!(buffer.chunks().flatten().eq(model.iter()));
    }
});
