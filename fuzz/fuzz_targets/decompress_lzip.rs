#![no_main]
#[macro_use]
extern crate libfuzzer_sys;

use lzdec::error::Result;
use lzdec::Options;

fn decode_lzip(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut bf = std::io::Cursor::new(compressed);
    // Keep the dictionary small enough for the fuzzer's memory budget.
    let options = Options {
        memlimit: Some(64 << 20),
    };

    let mut decomp: Vec<u8> = Vec::new();
    lzdec::lzip_decompress_with_options(&mut bf, &mut decomp, &options)?;
    Ok(decomp)
}

fuzz_target!(|data: &[u8]| {
    let _decomp = decode_lzip(data);
});
