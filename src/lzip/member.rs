use crate::decode::lzma::{self, LzmaParams};
use crate::decode::options::Options;
use crate::decode::rangecoder::RangeDecoder;
use crate::error;
use crate::extract::Accounting;
use crate::lzip::header::{MemberHeader, HEADER_SIZE, TRAILER_SIZE};
use crate::progress::Progress;
use std::io;

/// Decode the LZMA stream of a member whose header has already been read.
///
/// Decoding stops at the end-of-stream marker. The trailer is left in
/// `input` and only counted.
pub(crate) fn decode_member<R, W, P>(
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
    let params = LzmaParams::from_props(&header.lzma_props())?;
    let memlimit = options.memlimit.unwrap_or(usize::MAX);
    let mut decoder = lzma::new_circular_with_memlimit(output, params, memlimit);

    let (res, consumed) = match RangeDecoder::new(input) {
        Ok(mut rangecoder) => {
            let res = decoder.process(&mut rangecoder, progress);
            (res, rangecoder.consumed())
        }
        Err(e) => (Err(e), 0),
    };

    // Whatever was decoded reaches the sink, even on error.
    decoder.output.finish()?;

    accounting.bytes_in = (HEADER_SIZE + TRAILER_SIZE) as u64 + consumed;
    accounting.bytes_out = decoder.output.len() as u64;
    accounting.members = Some(1);
    lz_debug!(
        "Lzip member {{ packed: {}, unpacked: {} }}",
        accounting.bytes_in,
        accounting.bytes_out
    );

    if res.is_ok() {
        // Decoding is over, a request to stop has nothing left to cancel.
        let _ = progress.report(accounting.bytes_in, accounting.bytes_out);
    }
    res
}
