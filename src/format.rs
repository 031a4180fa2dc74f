//! The capability shared by every container format.

use crate::decode::options::Options;
use crate::error;
use crate::extract::Accounting;
use crate::progress::Progress;
use std::fmt;
use std::io;

/// Answer of a format probe over a byte prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The prefix cannot start this format.
    No,
    /// At least this many bytes are needed to decide.
    NeedMore(usize),
    /// The prefix starts this format.
    Yes,
}

/// A container format: a header followed by a payload decoded in stream order.
///
/// Implementors are unit types; all per-extraction state lives in the
/// [`Extractor`](crate::Extractor) driving them.
pub trait Format {
    /// Parsed header of one frame or member.
    type Header: fmt::Debug;

    /// Short name used in log messages.
    const NAME: &'static str;

    /// Classify a byte prefix. Never reads past `prefix` and has no side effects.
    fn probe(prefix: &[u8]) -> Probe;

    /// Read and validate the header at the current position of `input`.
    fn read_header<R: io::BufRead>(input: &mut R) -> error::Result<Self::Header>;

    /// Decode the payload following `header` into `output`.
    ///
    /// `accounting` is updated as data flows so that it reflects the bytes
    /// processed even when decoding fails midway.
    fn decode<R, W, P>(
        header: &Self::Header,
        input: &mut R,
        output: &mut W,
        options: &Options,
        progress: &mut P,
        accounting: &mut Accounting,
    ) -> error::Result<()>
    where
        R: io::BufRead,
        W: io::Write,
        P: Progress;
}

/// Compare the available part of `prefix` against a fixed signature.
///
/// Returns `false` as soon as an available byte differs.
pub(crate) fn matches_signature(prefix: &[u8], signature: &[u8]) -> bool {
    prefix
        .iter()
        .zip(signature.iter())
        .all(|(have, want)| have == want)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_matches_signature() {
        assert!(matches_signature(b"", b"LZIP"));
        assert!(matches_signature(b"LZ", b"LZIP"));
        assert!(matches_signature(b"LZIP\x01", b"LZIP"));
        assert!(!matches_signature(b"LZX", b"LZIP"));
    }
}
