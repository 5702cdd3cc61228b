// Integration tests for the BufSink contract
// Every test runs against a plain Buffer and against a BufferedSink writing
// into a Buffer; both must leave the same bytes and segment layout behind.

use segbuf::{BufError, BufSink, Buffer, BufferedSink, SEGMENT_SIZE, Sink};

// ============================================================================
// Harness
// ============================================================================

/// A sink under test plus the buffer its bytes end up in.
trait Harness {
    type Sink: BufSink;

    fn sink(&mut self) -> &mut Self::Sink;

    /// Where written bytes land once emitted.
    fn data(&mut self) -> &mut Buffer;
}

struct Direct(Buffer);

impl Harness for Direct {
    type Sink = Buffer;

    fn sink(&mut self) -> &mut Buffer {
        &mut self.0
    }

    fn data(&mut self) -> &mut Buffer {
        &mut self.0
    }
}

struct Wrapped(BufferedSink<Buffer>);

impl Harness for Wrapped {
    type Sink = BufferedSink<Buffer>;

    fn sink(&mut self) -> &mut BufferedSink<Buffer> {
        &mut self.0
    }

    fn data(&mut self) -> &mut Buffer {
        self.0.get_mut()
    }
}

fn direct() -> Direct {
    Direct(Buffer::new())
}

fn wrapped() -> Wrapped {
    Wrapped(BufferedSink::new(Buffer::new()))
}

macro_rules! sink_suite {
    ($($name:ident),* $(,)?) => {
        mod buffer {
            $(
                #[test]
                fn $name() {
                    super::$name(super::direct());
                }
            )*
        }

        mod buffered_sink {
            $(
                #[test]
                fn $name() {
                    super::$name(super::wrapped());
                }
            )*
        }
    };
}

sink_suite!(
    test_write_nothing,
    test_write_bytes,
    test_write_last_byte_in_segment,
    test_write_short,
    test_write_short_le,
    test_write_int,
    test_write_last_int_in_segment,
    test_write_int_split_across_segments,
    test_write_int_le,
    test_write_long,
    test_write_long_le,
    test_write_specific_charset,
    test_write_unknown_charset,
    test_write_all,
    test_write_all_exhausted,
    test_close_emits_buffered_bytes,
    test_size_is_sum_of_writes,
);

fn filler(len: usize) -> String {
    "a".repeat(len)
}

// ============================================================================
// Contract
// ============================================================================

fn test_write_nothing<H: Harness>(mut h: H) {
    h.sink().write_utf8("").unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().len(), 0);
    assert!(h.data().segment_sizes().is_empty());
}

fn test_write_bytes<H: Harness>(mut h: H) {
    h.sink().write_byte(0xab).unwrap().write_byte(0xcd).unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().to_string(), "Buffer[size=2 data=abcd]");
}

fn test_write_last_byte_in_segment<H: Harness>(mut h: H) {
    h.sink().write_utf8(&filler(SEGMENT_SIZE - 1)).unwrap();
    h.sink().write_byte(0x20).unwrap();
    h.sink().write_byte(0x21).unwrap();
    h.sink().flush().unwrap();

    assert_eq!(h.data().segment_sizes(), vec![SEGMENT_SIZE, 1]);
    assert_eq!(
        h.data().read_utf8(SEGMENT_SIZE - 1).unwrap(),
        filler(SEGMENT_SIZE - 1)
    );
    assert_eq!(h.data().to_string(), "Buffer[size=2 data=2021]");
}

fn test_write_short<H: Harness>(mut h: H) {
    h.sink().write_short(0xabcd).unwrap().write_short(0x4321).unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().to_string(), "Buffer[size=4 data=abcd4321]");
}

fn test_write_short_le<H: Harness>(mut h: H) {
    h.sink()
        .write_short_le(0xabcd)
        .unwrap()
        .write_short_le(0x4321)
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().to_string(), "Buffer[size=4 data=cdab2143]");
}

fn test_write_int<H: Harness>(mut h: H) {
    h.sink()
        .write_int(0xabcd_ef01)
        .unwrap()
        .write_int(0x8765_4321)
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().to_string(), "Buffer[size=8 data=abcdef0187654321]");
}

fn test_write_last_int_in_segment<H: Harness>(mut h: H) {
    h.sink().write_utf8(&filler(SEGMENT_SIZE - 4)).unwrap();
    h.sink().write_int(0xabcd_ef01).unwrap();
    h.sink().write_int(0x8765_4321).unwrap();
    h.sink().flush().unwrap();

    assert_eq!(h.data().segment_sizes(), vec![SEGMENT_SIZE, 4]);
    assert_eq!(
        h.data().read_utf8(SEGMENT_SIZE - 4).unwrap(),
        filler(SEGMENT_SIZE - 4)
    );
    assert_eq!(h.data().to_string(), "Buffer[size=8 data=abcdef0187654321]");
}

fn test_write_int_split_across_segments<H: Harness>(mut h: H) {
    h.sink().write_utf8(&filler(SEGMENT_SIZE - 3)).unwrap();
    h.sink().write_int(0xabcd_ef01).unwrap();
    h.sink().write_int(0x8765_4321).unwrap();
    h.sink().flush().unwrap();

    // Three bytes of the first int fill the segment, the fourth starts the next
    assert_eq!(h.data().segment_sizes(), vec![SEGMENT_SIZE, 5]);
    assert_eq!(
        h.data().read_utf8(SEGMENT_SIZE - 3).unwrap(),
        filler(SEGMENT_SIZE - 3)
    );
    assert_eq!(h.data().to_string(), "Buffer[size=8 data=abcdef0187654321]");
}

fn test_write_int_le<H: Harness>(mut h: H) {
    h.sink()
        .write_int_le(0xabcd_ef01)
        .unwrap()
        .write_int_le(0x8765_4321)
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().to_string(), "Buffer[size=8 data=01efcdab21436587]");
}

fn test_write_long<H: Harness>(mut h: H) {
    h.sink()
        .write_long(0xabcd_ef01_8765_4321)
        .unwrap()
        .write_long(0xcafe_babe_b0b1_5c00)
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(
        h.data().to_string(),
        "Buffer[size=16 data=abcdef0187654321cafebabeb0b15c00]"
    );
}

fn test_write_long_le<H: Harness>(mut h: H) {
    h.sink()
        .write_long_le(0xabcd_ef01_8765_4321)
        .unwrap()
        .write_long_le(0xcafe_babe_b0b1_5c00)
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(
        h.data().to_string(),
        "Buffer[size=16 data=2143658701efcdab005cb1b0bebafeca]"
    );
}

fn test_write_specific_charset<H: Harness>(mut h: H) {
    h.sink().write_string("təˈranəˌsôr", "utf-32").unwrap();
    h.sink().flush().unwrap();
    let expected = hex::decode(
        "0000007400000259000002c800000072000000610000006e00000259\
         000002cc00000073000000f400000072",
    )
    .unwrap();
    assert_eq!(h.data().read_byte_string_to_end(), expected);
}

fn test_write_unknown_charset<H: Harness>(mut h: H)
where
    H::Sink: std::fmt::Debug,
{
    let err = h.sink().write_string("x", "no-such-charset").unwrap_err();
    assert!(matches!(err, BufError::Encoding { .. }));
    h.sink().flush().unwrap();
    assert!(h.data().is_empty(), "Nothing should be written on failure");
}

fn test_write_all<H: Harness>(mut h: H) {
    let mut source = Buffer::from("abcdef");
    assert_eq!(h.sink().write_all(&mut source).unwrap(), 6);
    assert_eq!(source.len(), 0);
    h.sink().flush().unwrap();
    assert_eq!(h.data().read_utf8_to_end(), "abcdef");
}

fn test_write_all_exhausted<H: Harness>(mut h: H) {
    let mut source = Buffer::new();
    assert_eq!(h.sink().write_all(&mut source).unwrap(), 0);
    assert_eq!(source.len(), 0);
    h.sink().flush().unwrap();
    assert!(h.data().is_empty());
}

fn test_close_emits_buffered_bytes<H: Harness>(mut h: H) {
    h.sink().write_byte(b'a').unwrap();
    h.sink().close().unwrap();
    assert_eq!(h.data().read_byte().unwrap(), b'a');

    // A second close neither re-emits nor fails
    h.sink().close().unwrap();
    assert!(h.data().is_empty());
}

fn test_size_is_sum_of_writes<H: Harness>(mut h: H) {
    let text = "ünïcödé ".repeat(2000);
    h.sink()
        .write_byte(1)
        .unwrap()
        .write_long(2)
        .unwrap()
        .write_utf8(&text)
        .unwrap()
        .write_slice(&[0u8; 3 * SEGMENT_SIZE])
        .unwrap();
    h.sink().flush().unwrap();
    assert_eq!(h.data().len(), 1 + 8 + text.len() + 3 * SEGMENT_SIZE);
}

// ============================================================================
// BufferedSink only
// ============================================================================

#[test]
fn test_buffered_sink_emits_only_complete_segments() {
    let mut sink = BufferedSink::new(Buffer::new());
    sink.write_utf8(&filler(SEGMENT_SIZE + 1)).unwrap();
    assert_eq!(sink.get_ref().len(), SEGMENT_SIZE);
    assert_eq!(sink.buffered_len(), 1);

    sink.emit().unwrap();
    assert_eq!(sink.get_ref().len(), SEGMENT_SIZE + 1);
    assert_eq!(sink.buffered_len(), 0);
}

#[test]
fn test_buffered_sink_rejects_writes_after_close() {
    let mut sink = BufferedSink::new(Buffer::new());
    sink.close().unwrap();
    assert!(matches!(sink.write_int(1), Err(BufError::Closed)));
    assert!(sink.get_ref().is_empty());
}

#[test]
fn test_buffered_sink_chain() {
    // A buffered sink can itself be the endpoint of another
    let mut outer = BufferedSink::new(BufferedSink::new(Buffer::new()));
    outer.write_utf8("nested").unwrap();
    outer.close().unwrap();
    assert!(outer.get_ref().is_closed());
    assert_eq!(outer.get_mut().get_mut().read_utf8_to_end(), "nested");
}
