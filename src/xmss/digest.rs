// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use sha2::{Sha256, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

/// Incremental hash used for every tree, chain and message hash.
pub trait TreeDigest {
    /// Number of bytes returned by [`finalize`](Self::finalize).
    fn output_size(&self) -> usize;

    fn update(&mut self, data: &[u8]);

    fn finalize(self) -> Vec<u8>;
}

/// The hash function family of a parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    Sha256,
    Sha512,
    Shake128,
    Shake256,
}

impl DigestKind {
    /// Security parameter `n`: the size of every node, seed and chain value.
    pub const fn output_size(self) -> usize {
        match self {
            DigestKind::Sha256 | DigestKind::Shake128 => 32,
            DigestKind::Sha512 | DigestKind::Shake256 => 64,
        }
    }

    pub fn new_digest(self) -> Digest {
        match self {
            DigestKind::Sha256 => Digest::Sha256(Sha256::default()),
            DigestKind::Sha512 => Digest::Sha512(Sha512::default()),
            DigestKind::Shake128 => Digest::Shake128(Shake128::default()),
            DigestKind::Shake256 => Digest::Shake256(Shake256::default()),
        }
    }

    /// One-byte identifier stored with serialized traversal state.
    pub(crate) const fn tag(self) -> u8 {
        match self {
            DigestKind::Sha256 => 0,
            DigestKind::Sha512 => 1,
            DigestKind::Shake128 => 2,
            DigestKind::Shake256 => 3,
        }
    }

    /// Hash the concatenation of `parts`.
    pub(crate) fn hash(self, parts: &[&[u8]]) -> Vec<u8> {
        let mut digest = self.new_digest();
        for part in parts {
            digest.update(part);
        }
        digest.finalize()
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestKind::Sha256 => "SHA-256",
            DigestKind::Sha512 => "SHA-512",
            DigestKind::Shake128 => "SHAKE128",
            DigestKind::Shake256 => "SHAKE256",
        };
        f.write_str(name)
    }
}

/// A running hash of one of the supported kinds.
#[derive(Clone)]
pub enum Digest {
    Sha256(Sha256),
    Sha512(Sha512),
    Shake128(Shake128),
    Shake256(Shake256),
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Digest").field(&self.kind()).finish()
    }
}

impl Digest {
    pub fn kind(&self) -> DigestKind {
        match self {
            Digest::Sha256(_) => DigestKind::Sha256,
            Digest::Sha512(_) => DigestKind::Sha512,
            Digest::Shake128(_) => DigestKind::Shake128,
            Digest::Shake256(_) => DigestKind::Shake256,
        }
    }
}

impl TreeDigest for Digest {
    fn output_size(&self) -> usize {
        self.kind().output_size()
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Digest::Sha256(h) => sha2::Digest::update(h, data),
            Digest::Sha512(h) => sha2::Digest::update(h, data),
            Digest::Shake128(h) => Update::update(h, data),
            Digest::Shake256(h) => Update::update(h, data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        let size = self.output_size();
        match self {
            Digest::Sha256(h) => sha2::Digest::finalize(h).to_vec(),
            Digest::Sha512(h) => sha2::Digest::finalize(h).to_vec(),
            Digest::Shake128(h) => {
                let mut out = vec![0u8; size];
                h.finalize_xof().read(&mut out);
                out
            }
            Digest::Shake256(h) => {
                let mut out = vec![0u8; size];
                h.finalize_xof().read(&mut out);
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn known_answers() {
        assert_eq!(
            hex(&DigestKind::Sha256.hash(&[&b"abc"[..]])),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex(&DigestKind::Shake128.hash(&[&b""[..]])),
            "7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26"
        );
    }

    #[test]
    fn output_sizes() {
        let kinds =
            [DigestKind::Sha256, DigestKind::Sha512, DigestKind::Shake128, DigestKind::Shake256];
        for kind in kinds {
            assert_eq!(kind.hash(&[&b"x"[..]]).len(), kind.output_size());
            assert_eq!(kind.new_digest().output_size(), kind.output_size());
        }
    }

    #[test]
    fn parts_are_concatenated() {
        let kind = DigestKind::Sha512;
        assert_eq!(kind.hash(&[&b"ab"[..], &b"c"[..]]), kind.hash(&[&b"abc"[..]]));
    }
}
