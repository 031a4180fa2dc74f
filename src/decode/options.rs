/// Options to tweak extraction behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Options {
    /// Upper bound on the scratch memory an extraction may allocate, in bytes.
    ///
    /// For LZ4 frames this covers the compressed and decompressed block
    /// buffers; for Lzip members it covers the LZMA dictionary, which grows as
    /// data is decoded. The default is `None`, which means no limit.
    pub memlimit: Option<usize>,
}

impl Options {
    /// Check that an allocation of `needed` bytes fits the configured limit.
    pub(crate) fn check_memlimit(&self, needed: usize) -> crate::error::Result<()> {
        match self.memlimit {
            Some(limit) if needed > limit => Err(crate::error::Error::MemoryLimit(format!(
                "{} bytes are needed but the limit is {}",
                needed, limit
            ))),
            _ => Ok(()),
        }
    }
}
