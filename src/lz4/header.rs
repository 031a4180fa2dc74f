//! LZ4 frame header.

use crate::decode::util;
use crate::error;
use crate::format::{self, Probe};
use byteorder::{ByteOrder, LittleEndian};
use std::io;

/// Frame magic number, stored little-endian.
pub const MAGIC: u32 = 0x184D_2204;

/// Magic, FLG, BD and header checksum.
pub const MIN_HEADER_SIZE: usize = 7;

/// Largest header: content size and dictionary id both present.
pub const MAX_HEADER_SIZE: usize = 19;

const MAGIC_BYTES: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

// FLG bits
const FLG_BLOCK_INDEPENDENCE: u8 = 0x20;
const FLG_BLOCK_CHECKSUM: u8 = 0x10;
const FLG_CONTENT_SIZE: u8 = 0x08;
const FLG_CONTENT_CHECKSUM: u8 = 0x04;
const FLG_RESERVED: u8 = 0x02;
const FLG_DICT_ID: u8 = 0x01;

// BD bits 7 and 3..0
const BD_RESERVED: u8 = 0x8F;

/// Maximum size of a block, from the BD byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMaxSize {
    /// 64 KiB, code 4.
    Max64KiB,
    /// 256 KiB, code 5.
    Max256KiB,
    /// 1 MiB, code 6.
    Max1MiB,
    /// 4 MiB, code 7.
    Max4MiB,
}

impl BlockMaxSize {
    /// Decode the 3-bit size class. Codes 0 to 3 are reserved.
    pub fn from_code(code: u8) -> Option<BlockMaxSize> {
        match code {
            4 => Some(BlockMaxSize::Max64KiB),
            5 => Some(BlockMaxSize::Max256KiB),
            6 => Some(BlockMaxSize::Max1MiB),
            7 => Some(BlockMaxSize::Max4MiB),
            _ => None,
        }
    }

    /// Size in bytes.
    pub fn bytes(self) -> usize {
        match self {
            BlockMaxSize::Max64KiB => 64 << 10,
            BlockMaxSize::Max256KiB => 256 << 10,
            BlockMaxSize::Max1MiB => 1 << 20,
            BlockMaxSize::Max4MiB => 4 << 20,
        }
    }
}

/// Parsed LZ4 frame descriptor.
///
/// The header checksum byte is skipped, never verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Blocks do not reference data of previous blocks.
    pub block_independence: bool,
    /// Every block is followed by a 4-byte checksum.
    pub block_checksum: bool,
    /// A 4-byte checksum follows the end mark.
    pub content_checksum: bool,
    /// Upper bound on the size of every block, compressed or not.
    pub block_max_size: BlockMaxSize,
    /// Uncompressed size of the whole frame, when declared.
    pub content_size: Option<u64>,
    /// Dictionary id, when declared.
    pub dict_id: Option<u32>,
}

impl FrameDescriptor {
    /// Parse a complete frame header.
    pub fn parse(header: &[u8]) -> error::Result<FrameDescriptor> {
        let size = header_size_from_prefix(header)?;
        if header.len() < size {
            return Err(error::Error::UnexpectedEnd(format!(
                "LZ4 frame header needs {} bytes but only {} are available",
                size,
                header.len()
            )));
        }

        let flg = header[4];
        let bd = header[5];
        let mut pos = 6;

        let content_size = if flg & FLG_CONTENT_SIZE != 0 {
            let value = LittleEndian::read_u64(&header[pos..pos + 8]);
            pos += 8;
            Some(value)
        } else {
            None
        };

        let dict_id = if flg & FLG_DICT_ID != 0 {
            Some(LittleEndian::read_u32(&header[pos..pos + 4]))
        } else {
            None
        };
        lz_trace!("LZ4 header checksum byte: {:02x}", header[size - 1]);

        let block_max_size = BlockMaxSize::from_code((bd >> 4) & 0x07).ok_or_else(|| {
            error::Error::NotAnArchive(format!("invalid LZ4 block size code in BD byte {:02x}", bd))
        })?;

        Ok(FrameDescriptor {
            block_independence: flg & FLG_BLOCK_INDEPENDENCE != 0,
            block_checksum: flg & FLG_BLOCK_CHECKSUM != 0,
            content_checksum: flg & FLG_CONTENT_CHECKSUM != 0,
            block_max_size,
            content_size,
            dict_id,
        })
    }

    /// Read the frame header at the current position of `input`.
    pub fn read<R: io::Read>(input: &mut R) -> error::Result<FrameDescriptor> {
        let mut buf = [0u8; MAX_HEADER_SIZE];
        util::read_exact(input, &mut buf[..MIN_HEADER_SIZE], "LZ4 frame header")?;
        let size = header_size_from_prefix(&buf[..MIN_HEADER_SIZE])?;
        util::read_exact(input, &mut buf[MIN_HEADER_SIZE..size], "LZ4 frame header")?;
        FrameDescriptor::parse(&buf[..size])
    }

    /// Size of the encoded header in bytes.
    pub fn header_size(&self) -> usize {
        header_size(self.content_size.is_some(), self.dict_id.is_some())
    }
}

fn header_size(content_size: bool, dict_id: bool) -> usize {
    MIN_HEADER_SIZE + if content_size { 8 } else { 0 } + if dict_id { 4 } else { 0 }
}

/// Validate the fixed part of a header and compute the full header size.
fn header_size_from_prefix(prefix: &[u8]) -> error::Result<usize> {
    if prefix.len() < MIN_HEADER_SIZE {
        return Err(error::Error::UnexpectedEnd(format!(
            "LZ4 frame header needs at least {} bytes",
            MIN_HEADER_SIZE
        )));
    }

    if LittleEndian::read_u32(&prefix[0..4]) != MAGIC {
        return Err(error::Error::NotAnArchive(format!(
            "invalid LZ4 magic: {:02x?}",
            &prefix[0..4]
        )));
    }

    let flg = prefix[4];
    let bd = prefix[5];
    if flg >> 6 != 1 {
        return Err(error::Error::NotAnArchive(format!(
            "unsupported LZ4 frame version {}",
            flg >> 6
        )));
    }
    if flg & FLG_RESERVED != 0 {
        return Err(error::Error::NotAnArchive(format!(
            "reserved bit set in LZ4 FLG byte {:02x}",
            flg
        )));
    }
    if bd & BD_RESERVED != 0 {
        return Err(error::Error::NotAnArchive(format!(
            "reserved bits set in LZ4 BD byte {:02x}",
            bd
        )));
    }
    if BlockMaxSize::from_code((bd >> 4) & 0x07).is_none() {
        return Err(error::Error::NotAnArchive(format!(
            "invalid LZ4 block size code in BD byte {:02x}",
            bd
        )));
    }

    Ok(header_size(
        flg & FLG_CONTENT_SIZE != 0,
        flg & FLG_DICT_ID != 0,
    ))
}

/// Classify a byte prefix as the start of an LZ4 frame.
pub fn probe(prefix: &[u8]) -> Probe {
    if !format::matches_signature(prefix, &MAGIC_BYTES) {
        return Probe::No;
    }
    if prefix.len() < MIN_HEADER_SIZE {
        return Probe::NeedMore(MIN_HEADER_SIZE);
    }
    match header_size_from_prefix(prefix) {
        Ok(_) => Probe::Yes,
        Err(_) => Probe::No,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_probe() {
        assert_eq!(probe(b"\x04\x22\x4d"), Probe::NeedMore(MIN_HEADER_SIZE));
        assert_eq!(probe(b""), Probe::NeedMore(MIN_HEADER_SIZE));
        assert_eq!(probe(b"\x04\x23"), Probe::No);
        assert_eq!(probe(b"\x04\x22\x4d\x18\x60\x40\x82"), Probe::Yes);
        assert_eq!(probe(b"\x04\x22\x4d\x18\x60\x40\x82trailing"), Probe::Yes);
        // version 0
        assert_eq!(probe(b"\x04\x22\x4d\x18\x20\x40\x82"), Probe::No);
        // reserved FLG bit
        assert_eq!(probe(b"\x04\x22\x4d\x18\x62\x40\x82"), Probe::No);
        // reserved BD bits
        assert_eq!(probe(b"\x04\x22\x4d\x18\x60\xc0\x82"), Probe::No);
        assert_eq!(probe(b"\x04\x22\x4d\x18\x60\x41\x82"), Probe::No);
        // block size codes 0..3
        for code in 0..4u8 {
            let prefix = [0x04, 0x22, 0x4d, 0x18, 0x60, code << 4, 0x00];
            assert_eq!(probe(&prefix), Probe::No);
        }
    }

    #[test]
    fn test_parse_minimal() {
        let descriptor = FrameDescriptor::parse(b"\x04\x22\x4d\x18\x64\x70\xdf").unwrap();
        assert_eq!(
            descriptor,
            FrameDescriptor {
                block_independence: true,
                block_checksum: false,
                content_checksum: true,
                block_max_size: BlockMaxSize::Max4MiB,
                content_size: None,
                dict_id: None,
            }
        );
        assert_eq!(descriptor.header_size(), 7);
        assert_eq!(descriptor.block_max_size.bytes(), 4 * 1024 * 1024);
    }

    #[test]
    fn test_parse_optional_fields() {
        let mut header = vec![0x04, 0x22, 0x4d, 0x18, 0x59, 0x50];
        header.extend_from_slice(&1234u64.to_le_bytes());
        header.extend_from_slice(&0xCAFEu32.to_le_bytes());
        header.push(0x00);
        assert_eq!(header.len(), MAX_HEADER_SIZE);

        let descriptor = FrameDescriptor::parse(&header).unwrap();
        assert!(!descriptor.block_independence);
        assert!(descriptor.block_checksum);
        assert!(!descriptor.content_checksum);
        assert_eq!(descriptor.block_max_size, BlockMaxSize::Max256KiB);
        assert_eq!(descriptor.content_size, Some(1234));
        assert_eq!(descriptor.dict_id, Some(0xCAFE));
        assert_eq!(descriptor.header_size(), MAX_HEADER_SIZE);

        assert!(matches!(
            FrameDescriptor::parse(&header[..10]),
            Err(error::Error::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn test_read_from_stream() {
        let mut input: &[u8] = b"\x04\x22\x4d\x18\x68\x40\x05\x00\x00\x00\x00\x00\x00\x00\xaarest";
        let descriptor = FrameDescriptor::read(&mut input).unwrap();
        assert_eq!(descriptor.content_size, Some(5));
        assert_eq!(descriptor.header_size(), 15);
        assert_eq!(input, b"rest");
    }

    #[test]
    fn test_read_not_lz4() {
        let mut input: &[u8] = b"LZIP\x01\x0c\x00\x00";
        assert!(matches!(
            FrameDescriptor::read(&mut input),
            Err(error::Error::NotAnArchive(_))
        ));
    }
}
