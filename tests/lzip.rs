#[cfg(feature = "enable_logging")]
extern crate env_logger;
extern crate crc;
extern crate lzdec;

use lzdec::error::Error;
use lzdec::lzip::Lzip;
use lzdec::{Extractor, Format, NoProgress, Options, Outcome, Probe};
use std::io::{self, Read};
use std::ops::ControlFlow;

fn init_logger() {
    #[cfg(feature = "enable_logging")]
    let _ = env_logger::try_init();
}

const HELLO_STREAM: &[u8] = b"\x00\x24\x19\x49\x98\x6f\x10\x19\xc6\xd7\x31\xeb\x36\x50\xb2\x98\
                              \x48\xff\xfe\xa5\xb0\x00";

const EMPTY_STREAM: &[u8] = b"\x00\x83\xff\xfb\xff\xff\xc0\x00\x00\x00";

/// Wrap a raw LZMA stream into a member with a well-formed trailer.
fn member(dict_byte: u8, stream: &[u8], data: &[u8]) -> Vec<u8> {
    let mut member = b"LZIP\x01".to_vec();
    member.push(dict_byte);
    member.extend_from_slice(stream);
    let member_size = (member.len() + 20) as u64;
    member.extend_from_slice(&crc::crc32::checksum_ieee(data).to_le_bytes());
    member.extend_from_slice(&(data.len() as u64).to_le_bytes());
    member.extend_from_slice(&member_size.to_le_bytes());
    member
}

fn read_file(filename: &str) -> Vec<u8> {
    let mut x = Vec::new();
    std::fs::File::open(filename)
        .unwrap()
        .read_to_end(&mut x)
        .unwrap();
    x
}

fn extract(input: &[u8]) -> (lzdec::Extraction, Vec<u8>) {
    init_logger();
    let mut input = io::BufReader::new(input);
    let mut output = Vec::new();
    let extraction = Extractor::<Lzip>::new()
        .extract(&mut input, &mut output, &mut NoProgress)
        .unwrap();
    (extraction, output)
}

#[test]
fn decompress_hello_world() {
    init_logger();
    let input = member(0x17, HELLO_STREAM, b"Hello world\x0a");
    let mut output = Vec::new();
    let accounting = lzdec::lzip_decompress(&mut input.as_slice(), &mut output).unwrap();
    assert_eq!(output, b"Hello world\x0a");
    assert_eq!(accounting.bytes_in, 48);
    assert_eq!(accounting.bytes_out, 12);
    assert_eq!(accounting.members, Some(1));
    assert!(accounting.flags.is_empty());
}

#[test]
fn trailer_is_left_unread() {
    let input = member(0x0C, HELLO_STREAM, b"Hello world\x0a");
    let mut reader = input.as_slice();
    lzdec::lzip_decompress(&mut reader, &mut Vec::new()).unwrap();
    assert_eq!(reader, &input[input.len() - 20..]);
}

#[test]
fn decompress_empty_member() {
    let input = member(0x14, EMPTY_STREAM, b"");
    let (extraction, output) = extract(&input);
    assert!(extraction.is_ok());
    assert!(output.is_empty());
    assert_eq!(extraction.accounting.bytes_in, 36);
    assert_eq!(extraction.accounting.bytes_out, 0);
}

#[test]
fn decompress_file_wrapping_dictionary() {
    let input = read_file("tests/files/fox.lz");
    let expected = read_file("tests/files/fox.txt");

    let (extraction, output) = extract(&input);
    assert!(extraction.is_ok());
    assert!(output == expected);
    assert_eq!(extraction.accounting.bytes_in, input.len() as u64);
    assert_eq!(extraction.accounting.bytes_out, expected.len() as u64);
}

#[test]
fn memory_limit() {
    let input = read_file("tests/files/fox.lz");

    // The member announces a 4 KiB dictionary.
    let options = Options {
        memlimit: Some(4096),
    };
    let mut output = Vec::new();
    lzdec::lzip_decompress_with_options(&mut input.as_slice(), &mut output, &options).unwrap();
    assert_eq!(output, read_file("tests/files/fox.txt"));

    let options = Options {
        memlimit: Some(4095),
    };
    let res = lzdec::lzip_decompress_with_options(&mut input.as_slice(), &mut Vec::new(), &options);
    assert!(matches!(res, Err(Error::MemoryLimit(_))));
}

#[test]
fn truncated_member() {
    let input = read_file("tests/files/fox.lz");
    let expected = read_file("tests/files/fox.txt");

    let (extraction, output) = extract(&input[..700]);
    assert_eq!(extraction.outcome, Outcome::UnexpectedEnd);
    assert!(extraction.accounting.flags.need_more_input);
    assert!(!output.is_empty());
    assert!(output.len() < expected.len());
    assert_eq!(output[..], expected[..output.len()]);
    assert_eq!(extraction.accounting.bytes_in, 700 + 20);
    assert_eq!(extraction.accounting.bytes_out, output.len() as u64);

    let res = lzdec::lzip_decompress(&mut &input[..700], &mut Vec::new());
    assert!(matches!(res, Err(Error::UnexpectedEnd(_))));
}

#[test]
fn truncated_header() {
    let (extraction, output) = extract(b"LZIP\x01");
    assert_eq!(extraction.outcome, Outcome::UnexpectedEnd);
    assert!(output.is_empty());

    // Header only, the range decoder cannot even start.
    let (extraction, _) = extract(b"LZIP\x01\x14\x00\x00");
    assert_eq!(extraction.outcome, Outcome::UnexpectedEnd);
}

#[test]
fn not_lzip() {
    for input in &[
        &b"LZIP\x02\x14\x00\x00\x00\x00\x00"[..],
        &b"LZIP\x01\x0b\x00\x00\x00\x00\x00"[..],
        &b"LZIP\x01\x1e\x00\x00\x00\x00\x00"[..],
        &b"\x04\x22\x4d\x18\x60\x40\x82\x00\x00\x00\x00"[..],
    ] {
        let (extraction, output) = extract(input);
        assert_eq!(extraction.outcome, Outcome::NotAnArchive);
        assert!(extraction.accounting.flags.is_not_archive);
        assert!(output.is_empty());
    }
}

#[test]
fn corrupted_stream() {
    let mut stream = vec![0x00];
    stream.extend_from_slice(&[0xFF; 32]);
    let input = member(0x14, &stream, b"");
    let (extraction, output) = extract(&input);
    assert_eq!(extraction.outcome, Outcome::DataError);
    assert!(extraction.accounting.flags.data_error);
    assert!(output.is_empty());
}

#[test]
fn progress_reports_final_sizes() {
    let input = member(0x14, HELLO_STREAM, b"Hello world\x0a");
    let mut reports = Vec::new();
    let mut record = |bytes_in: u64, bytes_out: u64| {
        reports.push((bytes_in, bytes_out));
        ControlFlow::Continue(())
    };
    let extraction = Extractor::<Lzip>::new()
        .extract(&mut input.as_slice(), &mut Vec::new(), &mut record)
        .unwrap();
    assert!(extraction.is_ok());
    assert_eq!(reports, vec![(48, 12)]);
}

#[test]
fn cancellation() {
    let input = read_file("tests/files/fox.lz");
    let mut output = Vec::new();
    let mut stop = |_: u64, _: u64| ControlFlow::Break(());
    let extraction = Extractor::<Lzip>::new()
        .extract(&mut input.as_slice(), &mut output, &mut stop)
        .unwrap();
    assert_eq!(extraction.outcome, Outcome::Cancelled);
    assert!(extraction.accounting.flags.is_empty());
    assert!(output.len() >= 1 << 16);
    assert_eq!(extraction.accounting.bytes_out, output.len() as u64);
}

#[test]
fn open_rewinds() {
    let input = member(0x34, HELLO_STREAM, b"Hello world\x0a");
    let mut input = io::Cursor::new(input);
    let mut extractor = Extractor::<Lzip>::new();

    let header = *extractor.open(&mut input).unwrap();
    assert_eq!(header.version, 1);
    assert_eq!(header.dict_size, 983_040);
    assert_eq!(input.position(), 0);

    let extraction = extractor.test(&mut input, &mut NoProgress).unwrap();
    assert!(extraction.is_ok());
    assert_eq!(extractor.accounting().bytes_out, 12);
    assert_eq!(extractor.accounting().members, Some(1));
    assert_eq!(extractor.header(), Some(&header));
}

#[test]
fn failed_extract_forgets_previous_header() {
    let mut extractor = Extractor::<Lzip>::new();
    let input = member(0x14, HELLO_STREAM, b"Hello world\x0a");
    let extraction = extractor
        .extract(&mut input.as_slice(), &mut Vec::new(), &mut NoProgress)
        .unwrap();
    assert!(extraction.is_ok());
    assert_eq!(extractor.header().map(|h| h.dict_size), Some(1 << 20));

    let extraction = extractor
        .extract(&mut &b"LZIP\x02\x14"[..], &mut Vec::new(), &mut NoProgress)
        .unwrap();
    assert_eq!(extraction.outcome, Outcome::NotAnArchive);
    assert_eq!(extractor.header(), None);
    assert_eq!(extractor.accounting().members, None);
}

#[test]
fn probe() {
    assert_eq!(Lzip::probe(b"LZI"), Probe::NeedMore(6));
    assert_eq!(Lzip::probe(b"LZIP\x01\x14"), Probe::Yes);
    assert_eq!(Lzip::probe(b"LZIP\x02"), Probe::No);
    assert_eq!(Lzip::probe(b"\x04\x22\x4d\x18"), Probe::No);
    assert_eq!(lzdec::lzip::dict_size_from_byte(0x14), 1 << 20);
}
