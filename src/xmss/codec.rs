// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::{Error, Result};
use crate::util::from_bytes_be;

/// Cursor over serialized key, state or signature bytes.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len()).ok_or_else(|| {
            Error::malformed(format!("truncated input: need {len} bytes at offset {}", self.pos))
        })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn take_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    pub(crate) fn uint(&mut self, len: usize) -> Result<u64> {
        let bytes = self.take(len)?;
        from_bytes_be(bytes).ok_or_else(|| Error::malformed("integer field too large"))
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        u32::try_from(self.uint(4)?).map_err(|_| Error::malformed("integer field too large"))
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        self.uint(8)
    }

    /// Fail unless every byte has been consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(Error::malformed(format!(
                "{} trailing bytes",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }
}
