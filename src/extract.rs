//! The extraction driver shared by both container formats.

use crate::decode::options::Options;
use crate::error::{self, Error};
use crate::format::Format;
use crate::progress::Progress;
use std::io;
use std::marker::PhantomData;

/// Diagnostic flags describing how the last extraction ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorFlags {
    /// The input is not in this format.
    pub is_not_archive: bool,
    /// The input ended early.
    pub need_more_input: bool,
    /// Bytes follow the end of the container.
    ///
    /// Part of the reported shape but never set: neither pipeline looks past
    /// the end of its frame or member.
    pub data_after_end: bool,
    /// The compressed data is corrupted.
    pub data_error: bool,
}

impl ErrorFlags {
    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == ErrorFlags::default()
    }
}

/// Byte accounting of the last extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accounting {
    /// Compressed bytes processed, headers and trailers included.
    pub bytes_in: u64,
    /// Decompressed bytes written to the sink.
    pub bytes_out: u64,
    /// Number of members decoded, for formats that report it.
    pub members: Option<u64>,
    /// How the extraction ended.
    pub flags: ErrorFlags,
}

/// Classified end state of an extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The whole container was decoded.
    Ok,
    /// The input is not in this format.
    NotAnArchive,
    /// The input ended before the container was complete.
    UnexpectedEnd,
    /// The compressed data is corrupted.
    DataError,
    /// The progress callback asked to stop.
    Cancelled,
}

/// Result of one extraction call.
///
/// A non-`Ok` outcome is not a failure of the call: the bytes already written
/// to the sink stay there and `accounting` tells how many they are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    /// How the extraction ended.
    pub outcome: Outcome,
    /// Bytes processed up to that point.
    pub accounting: Accounting,
    /// Human readable reason for a non-`Ok` outcome.
    pub detail: Option<String>,
}

impl Extraction {
    /// Whether the container was decoded completely.
    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }

    /// Turn a non-`Ok` outcome back into the matching error.
    pub fn into_result(self) -> error::Result<Accounting> {
        let detail = self.detail.unwrap_or_default();
        match self.outcome {
            Outcome::Ok => Ok(self.accounting),
            Outcome::NotAnArchive => Err(Error::NotAnArchive(detail)),
            Outcome::UnexpectedEnd => Err(Error::UnexpectedEnd(detail)),
            Outcome::DataError => Err(Error::DataError(detail)),
            Outcome::Cancelled => Err(Error::Cancelled),
        }
    }
}

/// Drives header parsing and payload decoding for one format.
///
/// An extractor supports one extraction at a time. Concurrent extractions
/// need one extractor each; scratch buffers are allocated per call and never
/// shared.
#[derive(Debug)]
pub struct Extractor<F: Format> {
    options: Options,
    header: Option<F::Header>,
    accounting: Accounting,
    _format: PhantomData<F>,
}

impl<F: Format> Default for Extractor<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Format> Extractor<F> {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create an extractor with the given `options`.
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            header: None,
            accounting: Accounting::default(),
            _format: PhantomData,
        }
    }

    /// Header parsed by the last `open` or `extract` call.
    pub fn header(&self) -> Option<&F::Header> {
        self.header.as_ref()
    }

    /// Byte accounting and flags of the last extraction.
    pub fn accounting(&self) -> &Accounting {
        &self.accounting
    }

    /// Parse the header for property reporting, then rewind `input` to where
    /// it was so that `extract` can start from the beginning.
    pub fn open<R>(&mut self, input: &mut R) -> error::Result<&F::Header>
    where
        R: io::BufRead + io::Seek,
    {
        self.header = None;
        self.accounting = Accounting::default();

        let start = input.stream_position()?;
        let header = F::read_header(input);
        input.seek(io::SeekFrom::Start(start))?;
        let header = header?;

        lz_info!("{} header: {:?}", F::NAME, header);
        Ok(self.header.insert(header))
    }

    /// Decode the container at the current position of `input` into `output`.
    ///
    /// Returns `Err` only for fatal conditions: a failing sink or stream, or
    /// an exceeded memory limit. Every property of the input itself is
    /// reported through the returned [`Extraction`].
    pub fn extract<R, W, P>(
        &mut self,
        input: &mut R,
        output: &mut W,
        progress: &mut P,
    ) -> error::Result<Extraction>
    where
        R: io::BufRead,
        W: io::Write,
        P: Progress,
    {
        self.header = None;
        self.accounting = Accounting::default();
        let res = self.run(input, output, progress);
        self.classify(res)
    }

    /// Decode without keeping the output.
    pub fn test<R, P>(&mut self, input: &mut R, progress: &mut P) -> error::Result<Extraction>
    where
        R: io::BufRead,
        P: Progress,
    {
        self.extract(input, &mut io::sink(), progress)
    }

    fn run<R, W, P>(&mut self, input: &mut R, output: &mut W, progress: &mut P) -> error::Result<()>
    where
        R: io::BufRead,
        W: io::Write,
        P: Progress,
    {
        let header = F::read_header(input)?;
        lz_info!("{} header: {:?}", F::NAME, header);
        let header = self.header.insert(header);

        F::decode(
            header,
            input,
            output,
            &self.options,
            progress,
            &mut self.accounting,
        )
    }

    fn classify(&mut self, res: error::Result<()>) -> error::Result<Extraction> {
        let flags = &mut self.accounting.flags;
        let (outcome, detail) = match res {
            Ok(()) => (Outcome::Ok, None),
            Err(Error::NotAnArchive(msg)) => {
                flags.is_not_archive = true;
                (Outcome::NotAnArchive, Some(msg))
            }
            Err(Error::UnexpectedEnd(msg)) => {
                flags.need_more_input = true;
                (Outcome::UnexpectedEnd, Some(msg))
            }
            Err(Error::DataError(msg)) => {
                flags.data_error = true;
                (Outcome::DataError, Some(msg))
            }
            Err(Error::Cancelled) => (Outcome::Cancelled, None),
            Err(e) => return Err(e),
        };

        lz_info!(
            "{} extraction: {:?} {{ in: {}, out: {}, detail: {:?} }}",
            F::NAME,
            outcome,
            self.accounting.bytes_in,
            self.accounting.bytes_out,
            detail
        );

        Ok(Extraction {
            outcome,
            accounting: self.accounting,
            detail,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_into_result() {
        let accounting = Accounting {
            bytes_in: 10,
            bytes_out: 20,
            ..Default::default()
        };
        let ok = Extraction {
            outcome: Outcome::Ok,
            accounting,
            detail: None,
        };
        assert!(ok.is_ok());
        assert_eq!(ok.into_result().unwrap(), accounting);

        let truncated = Extraction {
            outcome: Outcome::UnexpectedEnd,
            accounting,
            detail: Some(String::from("block body")),
        };
        match truncated.into_result() {
            Err(Error::UnexpectedEnd(msg)) => assert_eq!(msg, "block body"),
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn test_flags_empty() {
        assert!(ErrorFlags::default().is_empty());
        let flags = ErrorFlags {
            data_error: true,
            ..Default::default()
        };
        assert!(!flags.is_empty());
    }
}
