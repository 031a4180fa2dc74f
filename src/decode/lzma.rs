use crate::decode::lzbuffer::LzCircularBuffer;
use crate::decode::rangecoder;
use crate::error;
use crate::progress::Progress;
use byteorder::{ByteOrder, LittleEndian};
use std::io;
use std::ops::ControlFlow;

/// Length of an LZMA properties block: one packed lc/lp/pb byte followed by
/// the little-endian dictionary size.
pub const PROPS_SIZE: usize = 5;

/// Output is reported to the progress callback at this granularity.
const PROGRESS_INTERVAL: usize = 1 << 16;

/// Distance value that encodes the end-of-stream marker.
const END_MARKER: usize = 0xFFFF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LzmaParams {
    // most lc significant bits of previous byte are part of the literal context
    pub lc: u32, // 0..8
    pub lp: u32, // 0..4
    // context for literal/match is plaintext offset modulo 2^pb
    pub pb: u32, // 0..4
    pub dict_size: u32,
}

impl LzmaParams {
    /// Decode a 5-byte properties block.
    pub fn from_props(props: &[u8; PROPS_SIZE]) -> error::Result<LzmaParams> {
        let mut pb = props[0] as u32;
        if pb >= 225 {
            return Err(error::Error::DataError(format!(
                "LZMA header invalid properties: {} must be < 225",
                pb
            )));
        }

        let lc: u32 = pb % 9;
        pb /= 9;
        let lp: u32 = pb % 5;
        pb /= 5;

        lz_info!("Properties {{ lc: {}, lp: {}, pb: {} }}", lc, lp, pb);

        let dict_size_provided = LittleEndian::read_u32(&props[1..]);
        let dict_size = if dict_size_provided < 0x1000 {
            0x1000
        } else {
            dict_size_provided
        };

        lz_info!("Dict size: {}", dict_size);

        Ok(LzmaParams {
            lc,
            lp,
            pb,
            dict_size,
        })
    }
}

/// Result of the next iteration of processing.
#[derive(Debug, PartialEq)]
enum ProcessingStatus {
    Continue,
    Finished,
}

pub struct DecoderState<W>
where
    W: io::Write,
{
    pub output: LzCircularBuffer<W>,
    // most lc significant bits of previous byte are part of the literal context
    lc: u32, // 0..8
    lp: u32, // 0..4
    // context for literal/match is plaintext offset modulo 2^pb
    pb: u32, // 0..4
    literal_probs: Vec<Vec<u16>>,
    pos_slot_decoder: Vec<rangecoder::BitTree>,
    align_decoder: rangecoder::BitTree,
    pos_decoders: [u16; 115],
    is_match: [u16; 192], // true = LZ, false = literal
    is_rep: [u16; 12],
    is_rep_g0: [u16; 12],
    is_rep_g1: [u16; 12],
    is_rep_g2: [u16; 12],
    is_rep_0long: [u16; 192],
    state: usize,
    rep: [usize; 4],
    len_decoder: rangecoder::LenDecoder,
    rep_len_decoder: rangecoder::LenDecoder,
}

// Initialize decoder with circular buffer
pub fn new_circular_with_memlimit<W>(
    output: W,
    params: LzmaParams,
    memlimit: usize,
) -> DecoderState<W>
where
    W: io::Write,
{
    DecoderState {
        output: LzCircularBuffer::from_stream_with_memlimit(
            output,
            params.dict_size as usize,
            memlimit,
        ),
        lc: params.lc,
        lp: params.lp,
        pb: params.pb,
        literal_probs: vec![vec![0x400; 0x300]; 1 << (params.lc + params.lp)],
        pos_slot_decoder: vec![rangecoder::BitTree::new(6); 4],
        align_decoder: rangecoder::BitTree::new(4),
        pos_decoders: [0x400; 115],
        is_match: [0x400; 192],
        is_rep: [0x400; 12],
        is_rep_g0: [0x400; 12],
        is_rep_g1: [0x400; 12],
        is_rep_g2: [0x400; 12],
        is_rep_0long: [0x400; 192],
        state: 0,
        rep: [0; 4],
        len_decoder: rangecoder::LenDecoder::new(),
        rep_len_decoder: rangecoder::LenDecoder::new(),
    }
}

impl<W> DecoderState<W>
where
    W: io::Write,
{
    /// Decode until the end-of-stream marker.
    ///
    /// Bytes following the marker are left in the stream. The callback sees
    /// the compressed bytes consumed and the bytes produced by this decoder.
    pub fn process<'a, R, P>(
        &mut self,
        rangecoder: &mut rangecoder::RangeDecoder<'a, R>,
        progress: &mut P,
    ) -> error::Result<()>
    where
        R: io::BufRead,
        P: Progress,
    {
        let mut next_report = PROGRESS_INTERVAL;
        loop {
            if self.process_next(rangecoder)? == ProcessingStatus::Finished {
                return Ok(());
            }

            if self.output.len() >= next_report {
                next_report = self.output.len() + PROGRESS_INTERVAL;
                if let ControlFlow::Break(()) =
                    progress.report(rangecoder.consumed(), self.output.len() as u64)
                {
                    return Err(error::Error::Cancelled);
                }
            }
        }
    }

    fn process_next<'a, R: io::BufRead>(
        &mut self,
        rangecoder: &mut rangecoder::RangeDecoder<'a, R>,
    ) -> error::Result<ProcessingStatus> {
        let pos_state = self.output.len() & ((1 << self.pb) - 1);

        // Literal
        if !rangecoder.decode_bit(&mut self.is_match[(self.state << 4) + pos_state])? {
            let byte: u8 = self.decode_literal(rangecoder)?;
            lz_trace!("Literal: {}", byte);
            self.output.append_literal(byte)?;

            self.state = if self.state < 4 {
                0
            } else if self.state < 10 {
                self.state - 3
            } else {
                self.state - 6
            };
            return Ok(ProcessingStatus::Continue);
        }

        // LZ
        let mut len: usize;
        // Distance is repeated from LRU
        if rangecoder.decode_bit(&mut self.is_rep[self.state])? {
            // dist = rep[0]
            if !rangecoder.decode_bit(&mut self.is_rep_g0[self.state])? {
                // len = 1
                if !rangecoder.decode_bit(&mut self.is_rep_0long[(self.state << 4) + pos_state])? {
                    // update state (short rep)
                    self.state = if self.state < 7 { 9 } else { 11 };
                    let dist = self.rep[0] + 1;
                    self.output.append_lz(1, dist)?;
                    return Ok(ProcessingStatus::Continue);
                }
            // dist = rep[i]
            } else {
                let idx: usize;
                if !rangecoder.decode_bit(&mut self.is_rep_g1[self.state])? {
                    idx = 1;
                } else if !rangecoder.decode_bit(&mut self.is_rep_g2[self.state])? {
                    idx = 2;
                } else {
                    idx = 3;
                }
                // Update LRU
                let dist = self.rep[idx];
                for i in (0..idx).rev() {
                    self.rep[i + 1] = self.rep[i];
                }
                self.rep[0] = dist
            }

            len = self.rep_len_decoder.decode(rangecoder, pos_state)?;
            // update state (rep)
            self.state = if self.state < 7 { 8 } else { 11 };
        // New distance
        } else {
            // Update LRU
            self.rep[3] = self.rep[2];
            self.rep[2] = self.rep[1];
            self.rep[1] = self.rep[0];
            len = self.len_decoder.decode(rangecoder, pos_state)?;

            // update state (match)
            self.state = if self.state < 7 { 7 } else { 10 };
            self.rep[0] = self.decode_distance(rangecoder, len)?;

            if self.rep[0] == END_MARKER {
                if rangecoder.is_finished_ok() {
                    lz_info!(
                        "LZMA end marker after {} bytes of output",
                        self.output.len()
                    );
                    return Ok(ProcessingStatus::Finished);
                }
                return Err(error::Error::DataError(String::from(
                    "Found end-of-stream marker but the range decoder is not finished",
                )));
            }
        }

        len += 2;

        let dist = self.rep[0] + 1;
        self.output.append_lz(len, dist)?;

        Ok(ProcessingStatus::Continue)
    }

    fn decode_literal<'a, R: io::BufRead>(
        &mut self,
        rangecoder: &mut rangecoder::RangeDecoder<'a, R>,
    ) -> error::Result<u8> {
        let def_prev_byte = 0u8;
        let prev_byte = self.output.last_or(def_prev_byte) as usize;

        let mut result: usize = 1;
        let lit_state =
            ((self.output.len() & ((1 << self.lp) - 1)) << self.lc) + (prev_byte >> (8 - self.lc));
        let probs = &mut self.literal_probs[lit_state];

        if self.state >= 7 {
            let mut match_byte = self.output.last_n(self.rep[0] + 1)? as usize;

            while result < 0x100 {
                let match_bit = (match_byte >> 7) & 1;
                match_byte <<= 1;
                let bit = rangecoder.decode_bit(&mut probs[((1 + match_bit) << 8) + result])?
                    as usize;
                result = (result << 1) ^ bit;
                if match_bit != bit {
                    break;
                }
            }
        }

        while result < 0x100 {
            result = (result << 1) ^ (rangecoder.decode_bit(&mut probs[result])? as usize);
        }

        Ok((result - 0x100) as u8)
    }

    fn decode_distance<'a, R: io::BufRead>(
        &mut self,
        rangecoder: &mut rangecoder::RangeDecoder<'a, R>,
        length: usize,
    ) -> error::Result<usize> {
        let len_state = if length > 3 { 3 } else { length };

        let pos_slot = self.pos_slot_decoder[len_state].parse(rangecoder)? as usize;
        if pos_slot < 4 {
            return Ok(pos_slot);
        }

        let num_direct_bits = (pos_slot >> 1) - 1;
        let mut result = (2 ^ (pos_slot & 1)) << num_direct_bits;

        if pos_slot < 14 {
            result += rangecoder.parse_reverse_bit_tree(
                num_direct_bits,
                &mut self.pos_decoders,
                result - pos_slot,
            )? as usize;
        } else {
            result += (rangecoder.get(num_direct_bits - 4)? as usize) << 4;
            result += self.align_decoder.parse_reverse(rangecoder)? as usize;
        }

        Ok(result)
    }
}
