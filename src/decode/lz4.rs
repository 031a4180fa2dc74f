use byteorder::{ByteOrder, LittleEndian};

/// Matches are at least this long; the token stores the length minus 4.
const MIN_MATCH: usize = 4;

/// A nibble with this value is followed by 255-terminated extension bytes.
const RUN_MASK: usize = 15;

/// Status of a block decode.
///
/// `InputTruncated` and `OutputTooSmall` mean the block could be resumed with
/// more input or more room. Only `DataError` means the block is corrupted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    /// The whole source was decoded.
    Ok,
    /// A sequence runs past the end of the source.
    InputTruncated,
    /// A sequence does not fit in the destination.
    OutputTooSmall,
    /// A match has offset 0 or reaches before the start of the destination.
    DataError,
}

/// Result of decoding one LZ4 block.
///
/// On failure the counts describe the sequences fully decoded before the
/// faulty one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockResult {
    /// Bytes of the source consumed.
    pub consumed: usize,
    /// Bytes written to the destination.
    pub produced: usize,
    /// How decoding ended.
    pub status: BlockStatus,
}

/// Decode one self-contained LZ4 block from `src` into `dest`.
///
/// Matches may only reference bytes produced by this call. The capacity of
/// the destination is `dest.len()`.
pub fn decode_block(src: &[u8], dest: &mut [u8]) -> BlockResult {
    decode_block_with_prefix(src, dest, 0)
}

/// Decode one LZ4 block into `dest[prefix..]`.
///
/// The first `prefix` bytes of `dest` hold previously decoded data that
/// matches are allowed to reference. `produced` does not count them.
pub(crate) fn decode_block_with_prefix(src: &[u8], dest: &mut [u8], prefix: usize) -> BlockResult {
    let mut src_pos = 0;
    let mut dest_pos = prefix;

    // Last position of a fully decoded sequence.
    let mut done_src = 0;
    let mut done_dest = prefix;

    let finish = |status, src_pos: usize, dest_pos: usize| BlockResult {
        consumed: src_pos,
        produced: dest_pos - prefix,
        status,
    };

    while src_pos < src.len() {
        let token = src[src_pos] as usize;
        src_pos += 1;

        let mut lit_len = token >> 4;
        if lit_len == RUN_MASK {
            match read_length_extension(src, &mut src_pos) {
                Some(extra) => lit_len += extra,
                None => return finish(BlockStatus::InputTruncated, done_src, done_dest),
            }
        }

        if lit_len > 0 {
            if lit_len > src.len() - src_pos {
                return finish(BlockStatus::InputTruncated, done_src, done_dest);
            }
            if lit_len > dest.len() - dest_pos {
                return finish(BlockStatus::OutputTooSmall, done_src, done_dest);
            }
            dest[dest_pos..dest_pos + lit_len].copy_from_slice(&src[src_pos..src_pos + lit_len]);
            src_pos += lit_len;
            dest_pos += lit_len;
        }

        // The last sequence only carries literals.
        if src_pos >= src.len() {
            break;
        }

        if src.len() - src_pos < 2 {
            return finish(BlockStatus::InputTruncated, done_src, done_dest);
        }
        let offset = LittleEndian::read_u16(&src[src_pos..src_pos + 2]) as usize;
        src_pos += 2;
        if offset == 0 {
            lz_debug!("LZ4 match with offset 0");
            return finish(BlockStatus::DataError, done_src, done_dest);
        }

        let mut match_len = (token & RUN_MASK) + MIN_MATCH;
        if token & RUN_MASK == RUN_MASK {
            match read_length_extension(src, &mut src_pos) {
                Some(extra) => match_len += extra,
                None => return finish(BlockStatus::InputTruncated, done_src, done_dest),
            }
        }

        if offset > dest_pos {
            lz_debug!(
                "LZ4 match offset {} is beyond the {} bytes available",
                offset,
                dest_pos
            );
            return finish(BlockStatus::DataError, done_src, done_dest);
        }
        if match_len > dest.len() - dest_pos {
            return finish(BlockStatus::OutputTooSmall, done_src, done_dest);
        }

        lz_trace!("LZ4 {{ literals: {}, len: {}, dist: {} }}", lit_len, match_len, offset);

        // Source and destination overlap whenever offset < match_len, so the
        // bytes must be copied one at a time.
        let mut from = dest_pos - offset;
        for _ in 0..match_len {
            dest[dest_pos] = dest[from];
            dest_pos += 1;
            from += 1;
        }

        done_src = src_pos;
        done_dest = dest_pos;
    }

    finish(BlockStatus::Ok, src_pos, dest_pos)
}

/// Sum extension bytes until one is below 255.
fn read_length_extension(src: &[u8], pos: &mut usize) -> Option<usize> {
    let mut total = 0usize;
    loop {
        let byte = *src.get(*pos)?;
        *pos += 1;
        total = total.saturating_add(byte as usize);
        if byte != 255 {
            return Some(total);
        }
    }
}
