// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WOTS+ one-time signatures with Winternitz parameter `w = 16`.

use zeroize::Zeroizing;

use super::address::Address;
use super::hash::{f, prf, prf_addr};
use super::DigestKind;
use crate::util::to_bytes_be;

const W: u32 = 16;
const LOG_W: u32 = 4;
const LEN2: usize = 3;

/// WOTS+ instance for one digest size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wots {
    kind: DigestKind,
    n: usize,
    len1: usize,
}

impl Wots {
    pub(crate) fn new(kind: DigestKind) -> Self {
        let n = kind.output_size();
        Self { kind, n, len1: 8 * n / LOG_W as usize }
    }

    pub(crate) fn kind(&self) -> DigestKind {
        self.kind
    }

    pub(crate) fn n(&self) -> usize {
        self.n
    }

    /// Number of chains, `len1 + len2`.
    pub(crate) fn len(&self) -> usize {
        self.len1 + LEN2
    }

    /// Per-leaf seed `PRF(sk_seed, addr)` with chain, hash and mask words zeroed.
    fn leaf_seed(&self, sk_seed: &[u8], addr: &Address) -> Zeroizing<Vec<u8>> {
        let mut addr = *addr;
        addr.set_chain(0);
        addr.set_hash(0);
        addr.set_key_and_mask(0);
        Zeroizing::new(prf(self.kind, sk_seed, &addr.to_bytes()))
    }

    fn chain_secret(&self, seed: &[u8], chain: usize) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(prf(self.kind, seed, &to_bytes_be(chain as u64, 32)))
    }

    /// Apply `steps` iterations of `F` starting at position `start`.
    fn chain(
        &self,
        input: &[u8],
        start: u32,
        steps: u32,
        public_seed: &[u8],
        addr: &mut Address,
    ) -> Vec<u8> {
        let mut tmp = input.to_vec();
        for j in start..(start + steps).min(W - 1) {
            addr.set_hash(j);
            let key = prf_addr(self.kind, public_seed, addr, 0);
            let mask = prf_addr(self.kind, public_seed, addr, 1);
            let masked: Vec<u8> = tmp.iter().zip(&mask).map(|(a, b)| a ^ b).collect();
            tmp = f(self.kind, &key, &masked);
        }
        tmp
    }

    /// Message digits in base `w` followed by the checksum digits.
    fn digits(&self, msg: &[u8]) -> Vec<u32> {
        let mut digits = base_w(msg, self.len1);
        let checksum: u32 = digits.iter().map(|d| W - 1 - d).sum();
        let shift = 8 - (LEN2 as u32 * LOG_W) % 8;
        let bytes = to_bytes_be(u64::from(checksum << shift), (LEN2 * LOG_W as usize).div_ceil(8));
        digits.extend(base_w(&bytes, LEN2));
        digits
    }

    pub(crate) fn public_key(
        &self,
        sk_seed: &[u8],
        public_seed: &[u8],
        addr: &Address,
    ) -> Vec<Vec<u8>> {
        let seed = self.leaf_seed(sk_seed, addr);
        let mut addr = *addr;
        (0..self.len())
            .map(|i| {
                addr.set_chain(i as u32);
                self.chain(&self.chain_secret(&seed, i), 0, W - 1, public_seed, &mut addr)
            })
            .collect()
    }

    /// Sign an `n`-byte message.
    pub(crate) fn sign(
        &self,
        msg: &[u8],
        sk_seed: &[u8],
        public_seed: &[u8],
        addr: &Address,
    ) -> Vec<Vec<u8>> {
        let seed = self.leaf_seed(sk_seed, addr);
        let mut addr = *addr;
        self.digits(msg)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                addr.set_chain(i as u32);
                self.chain(&self.chain_secret(&seed, i), 0, d, public_seed, &mut addr)
            })
            .collect()
    }

    /// Recover the public key a signature commits to.
    pub(crate) fn public_key_from_sig(
        &self,
        sig: &[Vec<u8>],
        msg: &[u8],
        public_seed: &[u8],
        addr: &Address,
    ) -> Vec<Vec<u8>> {
        let mut addr = *addr;
        self.digits(msg)
            .into_iter()
            .zip(sig)
            .enumerate()
            .map(|(i, (d, s))| {
                addr.set_chain(i as u32);
                self.chain(s, d, W - 1 - d, public_seed, &mut addr)
            })
            .collect()
    }
}

/// Split bytes into `out_len` base-16 digits, high nibble first.
fn base_w(input: &[u8], out_len: usize) -> Vec<u32> {
    input
        .iter()
        .flat_map(|&b| [u32::from(b >> 4), u32::from(b & 0x0f)])
        .take(out_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths() {
        assert_eq!(Wots::new(DigestKind::Sha256).len(), 67);
        assert_eq!(Wots::new(DigestKind::Sha512).len(), 131);
        assert_eq!(Wots::new(DigestKind::Shake128).len(), 67);
    }

    #[test]
    fn digits_and_checksum() {
        let wots = Wots::new(DigestKind::Sha256);
        let digits = wots.digits(&[0u8; 32]);
        // Checksum 64 * 15 = 960 = 0x3C0, left-aligned in two bytes: 0x3C 0x00.
        assert_eq!(&digits[64..], &[3, 12, 0]);
        let digits = wots.digits(&[0xffu8; 32]);
        assert_eq!(&digits[64..], &[0, 0, 0]);
        assert_eq!(base_w(&[0x12, 0x34], 3), vec![1, 2, 3]);
    }

    #[test]
    fn signature_recovers_public_key() {
        let wots = Wots::new(DigestKind::Sha256);
        let sk_seed = [5u8; 32];
        let public_seed = [6u8; 32];
        let addr = Address::ots(0, 0, 3);
        let msg = DigestKind::Sha256.hash(&[&b"message"[..]]);
        let pk = wots.public_key(&sk_seed, &public_seed, &addr);
        let sig = wots.sign(&msg, &sk_seed, &public_seed, &addr);
        assert_eq!(sig.len(), 67);
        assert_eq!(wots.public_key_from_sig(&sig, &msg, &public_seed, &addr), pk);

        let mut other = msg.clone();
        other[0] ^= 1;
        assert_ne!(wots.public_key_from_sig(&sig, &other, &public_seed, &addr), pk);
    }

    #[test]
    fn leaves_have_distinct_keys() {
        let wots = Wots::new(DigestKind::Shake128);
        let seed = [1u8; 32];
        let a = wots.public_key(&seed, &seed, &Address::ots(0, 0, 0));
        let b = wots.public_key(&seed, &seed, &Address::ots(0, 0, 1));
        assert_ne!(a, b);
    }
}
