//! Lzip member header.

use crate::decode::lzma::PROPS_SIZE;
use crate::decode::util;
use crate::error;
use crate::format::{self, Probe};
use byteorder::{ByteOrder, LittleEndian};
use std::io;

/// Member signature.
pub const MAGIC: &[u8] = b"LZIP";

/// Signature, version and packed dictionary size.
pub const HEADER_SIZE: usize = 6;

/// CRC32, data size and member size. Only used for size bookkeeping.
pub const TRAILER_SIZE: usize = 20;

/// Smallest valid dictionary exponent (4 KiB).
pub const MIN_DICT_EXPONENT: u8 = 12;

/// Largest valid dictionary exponent (512 MiB).
pub const MAX_DICT_EXPONENT: u8 = 29;

/// lc = 3, lp = 0, pb = 2, the only parameters lzip uses.
const LZMA_PROPERTIES: u8 = 0x5D;

/// Parsed Lzip member header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberHeader {
    /// Format version, always 1.
    pub version: u8,
    /// LZMA dictionary size in bytes.
    pub dict_size: u32,
}

impl MemberHeader {
    /// Parse a member header.
    pub fn parse(input: &[u8; HEADER_SIZE]) -> error::Result<MemberHeader> {
        let magic = &input[0..4];
        let version = input[4];
        let ds = input[5];

        if magic != MAGIC {
            return Err(error::Error::NotAnArchive(format!(
                "invalid Lzip magic: {:02x?}",
                magic
            )));
        }

        if version != 1 {
            return Err(error::Error::NotAnArchive(format!(
                "unsupported Lzip version {}",
                version
            )));
        }

        let exponent = ds & 0x1F;
        if exponent < MIN_DICT_EXPONENT || exponent > MAX_DICT_EXPONENT {
            return Err(error::Error::NotAnArchive(format!(
                "Lzip dictionary exponent {} is outside [{}, {}]",
                exponent, MIN_DICT_EXPONENT, MAX_DICT_EXPONENT
            )));
        }

        let header = MemberHeader {
            version,
            dict_size: dict_size_from_byte(ds),
        };
        lz_info!("Lzip dict size: {}", header.dict_size);
        Ok(header)
    }

    /// Read the member header at the current position of `input`.
    pub fn read<R: io::Read>(input: &mut R) -> error::Result<MemberHeader> {
        let mut buf = [0u8; HEADER_SIZE];
        util::read_exact(input, &mut buf, "Lzip member header")?;
        MemberHeader::parse(&buf)
    }

    /// LZMA properties block equivalent to this header.
    pub fn lzma_props(&self) -> [u8; PROPS_SIZE] {
        let mut props = [0u8; PROPS_SIZE];
        props[0] = LZMA_PROPERTIES;
        LittleEndian::write_u32(&mut props[1..], self.dict_size);
        props
    }
}

/// Unpack the coded dictionary size byte.
///
/// Bits 4-0 hold the base-2 logarithm of the base size, bits 7-5 the number
/// of sixteenths of the base size to subtract from it.
pub fn dict_size_from_byte(ds: u8) -> u32 {
    let exponent = (ds & 0x1F) as u32;
    let base = 1u32 << exponent;
    let fraction = (ds >> 5) as u32;
    base - fraction * (base >> 4)
}

/// Classify a byte prefix as the start of an Lzip member.
pub fn probe(prefix: &[u8]) -> Probe {
    if !format::matches_signature(prefix, MAGIC) {
        return Probe::No;
    }
    if prefix.len() > 4 && prefix[4] != 1 {
        return Probe::No;
    }
    if prefix.len() < HEADER_SIZE {
        return Probe::NeedMore(HEADER_SIZE);
    }
    let exponent = prefix[5] & 0x1F;
    if exponent < MIN_DICT_EXPONENT || exponent > MAX_DICT_EXPONENT {
        return Probe::No;
    }
    Probe::Yes
}
