//! Decoding engines shared by the container pipelines.

pub mod lz4;
pub mod lzbuffer;
pub mod lzma;
pub mod options;
pub mod rangecoder;
pub mod util;
