use crate::error;
use std::io::{self, Read};

/// Fill `buf` from `input`, classifying a short read as an unexpected end.
pub fn read_exact<R: io::Read>(input: &mut R, buf: &mut [u8], what: &str) -> error::Result<()> {
    input
        .read_exact(buf)
        .map_err(|e| error::Error::from_input(what, e))
}

/// Skip `n` bytes of `input` without looking at them.
pub fn discard<R: io::Read>(input: &mut R, n: u64, what: &str) -> error::Result<()> {
    let skipped = io::copy(&mut input.take(n), &mut io::sink())?;
    if skipped < n {
        return Err(error::Error::UnexpectedEnd(format!(
            "{}: expected {} bytes but only {} are available",
            what, n, skipped
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_discard() {
        let mut input: &[u8] = b"\x01\x02\x03\x04\x05";
        discard(&mut input, 4, "checksum").unwrap();
        assert_eq!(input, b"\x05");

        match discard(&mut input, 4, "checksum").unwrap_err() {
            error::Error::UnexpectedEnd(msg) => assert!(msg.contains("only 1")),
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_read_exact_short() {
        let mut input: &[u8] = b"\x01\x02";
        let mut buf = [0; 4];
        assert!(matches!(
            read_exact(&mut input, &mut buf, "size word"),
            Err(error::Error::UnexpectedEnd(_))
        ));
    }
}
