//! Logic for handling single-member Lzip files.
//!
//! A member is a 6-byte header, a raw LZMA stream terminated by an
//! end-of-stream marker, and a 20-byte trailer. Format specifications are at
//! <https://www.nongnu.org/lzip/manual/lzip_manual.html#File-format>.

#![deny(missing_docs)]

pub mod header;
mod member;

pub use header::{dict_size_from_byte, probe, MemberHeader};

use crate::decode::options::Options;
use crate::error;
use crate::extract::Accounting;
use crate::format::{Format, Probe};
use crate::progress::Progress;
use std::io;

/// The Lzip format, first member only.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lzip;

impl Format for Lzip {
    type Header = MemberHeader;

    const NAME: &'static str = "Lzip";

    fn probe(prefix: &[u8]) -> Probe {
        header::probe(prefix)
    }

    fn read_header<R: io::BufRead>(input: &mut R) -> error::Result<MemberHeader> {
        MemberHeader::read(input)
    }

    fn decode<R, W, P>(
        header: &MemberHeader,
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
        member::decode_member(header, input, output, options, progress, accounting)
    }
}
