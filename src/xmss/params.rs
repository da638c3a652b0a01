// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::wots::Wots;
use super::DigestKind;
use crate::error::{Error, Result};

/// Smallest supported tree height.
pub const MIN_HEIGHT: u32 = 2;

/// Largest height of a single XMSS tree.
pub const MAX_HEIGHT: u32 = 20;

/// Largest total height of an XMSS-MT hypertree.
pub const MAX_MT_HEIGHT: u32 = 60;

/// Single-tree XMSS parameter set: tree height and hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmssParameters {
    height: u32,
    digest: DigestKind,
}

impl XmssParameters {
    /// Validate a parameter set. Heights run from 2 to 20.
    pub fn new(height: u32, digest: DigestKind) -> Result<Self> {
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
            return Err(Error::InvalidParameters(format!(
                "tree height {height} outside {MIN_HEIGHT}..={MAX_HEIGHT}"
            )));
        }
        Ok(Self { height, digest })
    }

    pub const fn sha2_10_256() -> Self {
        Self { height: 10, digest: DigestKind::Sha256 }
    }

    pub const fn sha2_16_256() -> Self {
        Self { height: 16, digest: DigestKind::Sha256 }
    }

    pub const fn sha2_20_256() -> Self {
        Self { height: 20, digest: DigestKind::Sha256 }
    }

    pub const fn sha2_10_512() -> Self {
        Self { height: 10, digest: DigestKind::Sha512 }
    }

    pub const fn shake_10_256() -> Self {
        Self { height: 10, digest: DigestKind::Shake128 }
    }

    pub const fn shake_10_512() -> Self {
        Self { height: 10, digest: DigestKind::Shake256 }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn digest(&self) -> DigestKind {
        self.digest
    }

    /// Node and seed size in bytes.
    #[inline]
    pub fn n(&self) -> usize {
        self.digest.output_size()
    }

    /// Number of one-time keys, `2^height`.
    pub fn max_signatures(&self) -> u64 {
        1u64 << self.height
    }

    /// BDS retention parameter: 2 for even heights, 3 for odd ones.
    pub fn bds_k(&self) -> u32 {
        if self.height % 2 == 0 { 2 } else { 3 }
    }

    pub(crate) fn wots(&self) -> Wots {
        Wots::new(self.digest)
    }

    /// Bytes of one WOTS+ signature plus its authentication path.
    pub(crate) fn reduced_signature_len(&self) -> usize {
        (self.wots().len() + self.height as usize) * self.n()
    }

    /// Serialized XMSS signature size: `[index: 4][r][wots][auth]`.
    pub fn signature_len(&self) -> usize {
        4 + self.n() + self.reduced_signature_len()
    }
}

/// Multi-tree parameter set: `layers` trees of height `height / layers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmssMtParameters {
    height: u32,
    layers: u32,
    xmss: XmssParameters,
}

impl XmssMtParameters {
    /// Validate a hypertree. `layers` must divide `height`, and each layer
    /// tree must have a valid XMSS height.
    pub fn new(height: u32, layers: u32, digest: DigestKind) -> Result<Self> {
        if layers == 0 || height % layers != 0 {
            return Err(Error::InvalidParameters(format!(
                "{layers} layers do not divide height {height}"
            )));
        }
        if height > MAX_MT_HEIGHT {
            return Err(Error::InvalidParameters(format!(
                "total height {height} above {MAX_MT_HEIGHT}"
            )));
        }
        let xmss = XmssParameters::new(height / layers, digest)?;
        Ok(Self { height, layers, xmss })
    }

    pub const fn sha2_20_2_256() -> Self {
        Self {
            height: 20,
            layers: 2,
            xmss: XmssParameters { height: 10, digest: DigestKind::Sha256 },
        }
    }

    pub const fn sha2_20_4_256() -> Self {
        Self {
            height: 20,
            layers: 4,
            xmss: XmssParameters { height: 5, digest: DigestKind::Sha256 },
        }
    }

    pub const fn sha2_40_4_256() -> Self {
        Self {
            height: 40,
            layers: 4,
            xmss: XmssParameters { height: 10, digest: DigestKind::Sha256 },
        }
    }

    pub const fn shake_20_2_256() -> Self {
        Self {
            height: 20,
            layers: 2,
            xmss: XmssParameters { height: 10, digest: DigestKind::Shake128 },
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Parameters of every layer tree.
    #[inline]
    pub fn xmss(&self) -> &XmssParameters {
        &self.xmss
    }

    pub fn digest(&self) -> DigestKind {
        self.xmss.digest
    }

    pub fn n(&self) -> usize {
        self.xmss.n()
    }

    /// Number of one-time keys across the hypertree, `2^height`.
    pub fn max_signatures(&self) -> u64 {
        1u64 << self.height
    }

    /// Bytes used to encode a global index.
    pub fn index_len(&self) -> usize {
        (self.height as usize).div_ceil(8)
    }

    /// Serialized signature size: `[index][r]` then one reduced signature per layer.
    pub fn signature_len(&self) -> usize {
        self.index_len() + self.n() + self.layers as usize * self.xmss.reduced_signature_len()
    }
}
