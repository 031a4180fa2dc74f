#![no_main]
#[macro_use]
extern crate libfuzzer_sys;

use lzdec::error::Result;
use lzdec::Accounting;

fn decode_lz4(compressed: &[u8]) -> Result<(Vec<u8>, Accounting)> {
    let mut bf = std::io::Cursor::new(compressed);

    let mut decomp: Vec<u8> = Vec::new();
    let accounting = lzdec::lz4_decompress(&mut bf, &mut decomp)?;
    Ok((decomp, accounting))
}

fuzz_target!(|data: &[u8]| {
    if let Ok((decomp, accounting)) = decode_lz4(data) {
        assert_eq!(accounting.bytes_out, decomp.len() as u64);
        assert!(accounting.bytes_in <= data.len() as u64);
    }
});
