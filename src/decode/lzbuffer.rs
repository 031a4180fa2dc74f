use crate::error;
use std::io;

/// A circular buffer for LZ sequences.
///
/// The backing storage grows lazily up to the dictionary size, so a member
/// announcing a large dictionary only pays for what it actually decodes.
pub struct LzCircularBuffer<W>
where
    W: io::Write,
{
    stream: W,        // Output sink
    buf: Vec<u8>,     // Circular buffer
    dict_size: usize, // Length of the buffer
    memlimit: usize,  // Buffer memory limit
    cursor: usize,    // Current position
    len: usize,       // Total number of bytes sent through the buffer
}

impl<W> LzCircularBuffer<W>
where
    W: io::Write,
{
    pub fn from_stream_with_memlimit(stream: W, dict_size: usize, memlimit: usize) -> Self {
        lz_info!("Dict size in LZ buffer: {}", dict_size);
        Self {
            stream,
            buf: Vec::new(),
            dict_size,
            memlimit,
            cursor: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> u8 {
        *self.buf.get(index).unwrap_or(&0)
    }

    fn set(&mut self, index: usize, value: u8) -> error::Result<()> {
        let new_len = index + 1;
        if self.buf.len() < new_len {
            if new_len <= self.memlimit {
                self.buf.resize(new_len, 0);
            } else {
                return Err(error::Error::MemoryLimit(format!(
                    "LZMA dictionary would exceed the limit of {} bytes",
                    self.memlimit
                )));
            }
        }
        self.buf[index] = value;
        Ok(())
    }

    // Retrieve the last byte or return a default
    pub fn last_or(&self, lit: u8) -> u8 {
        if self.len == 0 {
            lit
        } else {
            self.get((self.dict_size + self.cursor - 1) % self.dict_size)
        }
    }

    // Retrieve the n-th last byte
    pub fn last_n(&self, dist: usize) -> error::Result<u8> {
        if dist > self.dict_size {
            return Err(error::Error::DataError(format!(
                "Match distance {} is beyond dictionary size {}",
                dist, self.dict_size
            )));
        }
        if dist > self.len {
            return Err(error::Error::DataError(format!(
                "Match distance {} is beyond output size {}",
                dist, self.len
            )));
        }

        let offset = (self.dict_size + self.cursor - dist) % self.dict_size;
        Ok(self.get(offset))
    }

    // Append a literal
    pub fn append_literal(&mut self, lit: u8) -> error::Result<()> {
        self.set(self.cursor, lit)?;
        self.cursor += 1;
        self.len += 1;

        // Flush the circular buffer to the output
        if self.cursor == self.dict_size {
            self.stream.write_all(self.buf.as_slice())?;
            self.cursor = 0;
        }

        Ok(())
    }

    // Fetch an LZ sequence (length, distance) from inside the buffer
    pub fn append_lz(&mut self, len: usize, dist: usize) -> error::Result<()> {
        lz_debug!("LZ {{ len: {}, dist: {} }}", len, dist);
        if dist > self.dict_size {
            return Err(error::Error::DataError(format!(
                "LZ distance {} is beyond dictionary size {}",
                dist, self.dict_size
            )));
        }
        if dist > self.len {
            return Err(error::Error::DataError(format!(
                "LZ distance {} is beyond output size {}",
                dist, self.len
            )));
        }

        let mut offset = (self.dict_size + self.cursor - dist) % self.dict_size;
        for _ in 0..len {
            let x = self.get(offset);
            self.append_literal(x)?;
            offset += 1;
            if offset == self.dict_size {
                offset = 0
            }
        }
        Ok(())
    }

    // Flush the buffer to the output
    pub fn finish(&mut self) -> io::Result<()> {
        if self.cursor > 0 {
            self.stream.write_all(&self.buf[0..self.cursor])?;
            self.cursor = 0;
        }
        self.stream.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wraps_and_flushes() {
        let mut out = Vec::new();
        {
            let mut buf = LzCircularBuffer::from_stream_with_memlimit(&mut out, 4, usize::MAX);
            for &b in b"abc" {
                buf.append_literal(b).unwrap();
            }
            buf.append_lz(5, 3).unwrap();
            assert_eq!(buf.len(), 8);
            assert_eq!(buf.last_n(1).unwrap(), b'b');
            buf.finish().unwrap();
        }
        assert_eq!(out, b"abcabcab");
    }

    #[test]
    fn test_distance_beyond_output() {
        let mut buf = LzCircularBuffer::from_stream_with_memlimit(Vec::new(), 16, usize::MAX);
        buf.append_literal(b'a').unwrap();
        assert!(matches!(
            buf.append_lz(2, 2),
            Err(error::Error::DataError(_))
        ));
    }

    #[test]
    fn test_memlimit() {
        let mut buf = LzCircularBuffer::from_stream_with_memlimit(Vec::new(), 16, 2);
        buf.append_literal(b'a').unwrap();
        buf.append_literal(b'b').unwrap();
        assert!(matches!(
            buf.append_literal(b'c'),
            Err(error::Error::MemoryLimit(_))
        ));
    }
}
