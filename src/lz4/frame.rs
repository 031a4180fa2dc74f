use crate::decode::lz4::{decode_block_with_prefix, BlockStatus};
use crate::decode::options::Options;
use crate::decode::util;
use crate::error;
use crate::extract::Accounting;
use crate::lz4::header::FrameDescriptor;
use crate::progress::Progress;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io;
use std::ops::ControlFlow;

/// Bit 31 of a block size word marks a block stored without compression.
const STORED_FLAG: u32 = 0x8000_0000;

/// Block, content and header checksums are skipped, not verified.
const CHECKSUM_SIZE: u64 = 4;

/// Linked blocks may reference this much previously decoded data.
const HISTORY_SIZE: usize = 64 << 10;

/// Decode the blocks of a frame whose header has already been read.
///
/// Each block is written to `output` before the next one is read, so on
/// failure the sink holds every block decoded so far.
pub(crate) fn decode_frame<R, W, P>(
    descriptor: &FrameDescriptor,
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
    let block_max = descriptor.block_max_size.bytes();
    let history = if descriptor.block_independence {
        0
    } else {
        HISTORY_SIZE
    };
    options.check_memlimit(2 * block_max + history)?;

    let mut compressed = vec![0u8; block_max];
    // Linked frames keep up to `history` bytes of previous output in front
    // of the block being decoded.
    let mut decompressed = vec![0u8; history + block_max];
    let mut prefix = 0;

    accounting.bytes_in = descriptor.header_size() as u64;

    loop {
        let word = input
            .read_u32::<LittleEndian>()
            .map_err(|e| error::Error::from_input("LZ4 block size", e))?;
        accounting.bytes_in += 4;

        if word == 0 {
            lz_debug!("LZ4 end mark after {} bytes", accounting.bytes_in);
            if descriptor.content_checksum {
                util::discard(input, CHECKSUM_SIZE, "LZ4 content checksum")?;
                accounting.bytes_in += CHECKSUM_SIZE;
            }
            return Ok(());
        }

        let stored = word & STORED_FLAG != 0;
        let size = (word & !STORED_FLAG) as usize;
        lz_debug!("LZ4 block {{ size: {}, stored: {} }}", size, stored);

        if size > block_max {
            return Err(error::Error::DataError(format!(
                "LZ4 block of {} bytes exceeds the frame maximum of {}",
                size, block_max
            )));
        }

        util::read_exact(input, &mut compressed[..size], "LZ4 block body")?;
        accounting.bytes_in += size as u64;

        if descriptor.block_checksum {
            util::discard(input, CHECKSUM_SIZE, "LZ4 block checksum")?;
            accounting.bytes_in += CHECKSUM_SIZE;
        }

        let block = &compressed[..size];
        let data: &[u8] = if stored {
            if history == 0 {
                block
            } else {
                decompressed[prefix..prefix + size].copy_from_slice(block);
                &decompressed[prefix..prefix + size]
            }
        } else {
            let result =
                decode_block_with_prefix(block, &mut decompressed[..prefix + block_max], prefix);
            match result.status {
                BlockStatus::Ok => {}
                BlockStatus::InputTruncated => {
                    return Err(error::Error::UnexpectedEnd(format!(
                        "LZ4 block of {} bytes ends inside a sequence after {} bytes",
                        size, result.consumed
                    )));
                }
                BlockStatus::OutputTooSmall => {
                    return Err(error::Error::DataError(format!(
                        "LZ4 block decodes to more than {} bytes",
                        block_max
                    )));
                }
                BlockStatus::DataError => {
                    return Err(error::Error::DataError(format!(
                        "LZ4 block has an invalid match offset after {} bytes",
                        result.produced
                    )));
                }
            }
            &decompressed[prefix..prefix + result.produced]
        };

        let produced = data.len();
        if produced > 0 {
            output.write_all(data)?;
        }
        accounting.bytes_out += produced as u64;

        if history > 0 {
            prefix = keep_history(&mut decompressed, prefix + produced, history);
        }

        if let ControlFlow::Break(()) = progress.report(accounting.bytes_in, accounting.bytes_out) {
            return Err(error::Error::Cancelled);
        }
    }
}

/// Move the last `history` bytes of `buf[..end]` to the front of `buf`.
///
/// Returns the number of bytes kept.
fn keep_history(buf: &mut [u8], end: usize, history: usize) -> usize {
    let keep = end.min(history);
    buf.copy_within(end - keep..end, 0);
    keep
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keep_history() {
        let mut buf = *b"0123456789";
        assert_eq!(keep_history(&mut buf, 3, 4), 3);
        assert_eq!(&buf[..3], b"012");

        assert_eq!(keep_history(&mut buf, 10, 4), 4);
        assert_eq!(&buf[..4], b"6789");
    }
}
