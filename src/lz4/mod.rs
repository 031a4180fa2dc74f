//! Logic for handling the LZ4 frame format.
//!
//! Format specifications are at
//! <https://github.com/lz4/lz4/blob/dev/doc/lz4_Frame_format.md>.

#![deny(missing_docs)]

mod frame;
pub mod header;

pub use crate::decode::lz4::{decode_block, BlockResult, BlockStatus};
pub use header::{probe, BlockMaxSize, FrameDescriptor};

use crate::decode::options::Options;
use crate::error;
use crate::extract::Accounting;
use crate::format::{Format, Probe};
use crate::progress::Progress;
use std::io;

/// The LZ4 frame format.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lz4;

impl Format for Lz4 {
    type Header = FrameDescriptor;

    const NAME: &'static str = "LZ4";

    fn probe(prefix: &[u8]) -> Probe {
        header::probe(prefix)
    }

    fn read_header<R: io::BufRead>(input: &mut R) -> error::Result<FrameDescriptor> {
        FrameDescriptor::read(input)
    }

    fn decode<R, W, P>(
        header: &FrameDescriptor,
        input: &mut R,
        output: &mut W,
        options: &Options,
        progress: &mut P,
        accounting: &mut Accounting,
    ) -> error::Result<()>
    where
        R: io::BufRead,
        W: io::Write,
        P: Progress,
    {
        frame::decode_frame(header, input, output, options, progress, accounting)
    }
}
