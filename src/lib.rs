//! Pure-Rust decoders for two compression containers: LZ4 frames and Lzip
//! members.
//!
//! Each format implements [`Format`] and is driven by an [`Extractor`], which
//! reads the header, streams decoded data into a sink and reports how the
//! extraction ended. The functions at the root of the crate cover the common
//! case of decoding a whole container in one call.

#[cfg(feature = "enable_logging")]
#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod decode;
pub mod error;
mod extract;
mod format;
pub mod lz4;
pub mod lzip;
mod progress;

pub use crate::decode::options::Options;
pub use crate::extract::{Accounting, ErrorFlags, Extraction, Extractor, Outcome};
pub use crate::format::{Format, Probe};
pub use crate::progress::{NoProgress, Progress};

use std::io;

/// Decompress an LZ4 frame.
///
/// Data decoded before an error is left in `output`.
pub fn lz4_decompress<R: io::BufRead, W: io::Write>(
    input: &mut R,
    output: &mut W,
) -> error::Result<Accounting> {
    lz4_decompress_with_options(input, output, &Options::default())
}

/// Decompress an LZ4 frame with the given options.
pub fn lz4_decompress_with_options<R: io::BufRead, W: io::Write>(
    input: &mut R,
    output: &mut W,
    options: &Options,
) -> error::Result<Accounting> {
    Extractor::<lz4::Lz4>::with_options(*options)
        .extract(input, output, &mut NoProgress)?
        .into_result()
}

/// Decompress the first member of an Lzip file.
///
/// Data decoded before an error is left in `output`.
pub fn lzip_decompress<R: io::BufRead, W: io::Write>(
    input: &mut R,
    output: &mut W,
) -> error::Result<Accounting> {
    lzip_decompress_with_options(input, output, &Options::default())
}

/// Decompress the first member of an Lzip file with the given options.
pub fn lzip_decompress_with_options<R: io::BufRead, W: io::Write>(
    input: &mut R,
    output: &mut W,
    options: &Options,
) -> error::Result<Accounting> {
    Extractor::<lzip::Lzip>::with_options(*options)
        .extract(input, output, &mut NoProgress)?
        .into_result()
}
