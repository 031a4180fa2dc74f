#![no_main]
#[macro_use]
extern crate libfuzzer_sys;

use lzdec::lz4::{decode_block, BlockStatus};

fuzz_target!(|data: &[u8]| {
    let mut dest = vec![0u8; 1 << 16];
    let result = decode_block(data, &mut dest);
    assert!(result.consumed <= data.len());
    assert!(result.produced <= dest.len());
    if result.status == BlockStatus::Ok {
        assert_eq!(result.consumed, data.len());
    }
});
