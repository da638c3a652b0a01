// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed hash functions, domain-separated by an `n`-byte type prefix.

use super::address::Address;
use super::DigestKind;
use crate::util::to_bytes_be;

const DOMAIN_F: u64 = 0;
const DOMAIN_H: u64 = 1;
const DOMAIN_H_MSG: u64 = 2;
const DOMAIN_PRF: u64 = 3;

fn keyed(kind: DigestKind, domain: u64, key: &[u8], msg: &[u8]) -> Vec<u8> {
    let prefix = to_bytes_be(domain, kind.output_size());
    kind.hash(&[prefix.as_slice(), key, msg])
}

/// Chaining function.
pub(crate) fn f(kind: DigestKind, key: &[u8], msg: &[u8]) -> Vec<u8> {
    keyed(kind, DOMAIN_F, key, msg)
}

/// Tree hash over two concatenated `n`-byte halves.
pub(crate) fn h(kind: DigestKind, key: &[u8], msg: &[u8]) -> Vec<u8> {
    keyed(kind, DOMAIN_H, key, msg)
}

/// Message hash keyed with `r || root || toByte(index, n)`.
pub(crate) fn h_msg(kind: DigestKind, key: &[u8], msg: &[u8]) -> Vec<u8> {
    keyed(kind, DOMAIN_H_MSG, key, msg)
}

pub(crate) fn prf(kind: DigestKind, key: &[u8], msg: &[u8]) -> Vec<u8> {
    keyed(kind, DOMAIN_PRF, key, msg)
}

/// `PRF(seed, addr)` for a given key-and-mask word.
pub(crate) fn prf_addr(
    kind: DigestKind,
    seed: &[u8],
    addr: &mut Address,
    key_and_mask: u32,
) -> Vec<u8> {
    addr.set_key_and_mask(key_and_mask);
    prf(kind, seed, &addr.to_bytes())
}

/// Randomised tree hash of two children, masking each with a PRF output.
pub(crate) fn rand_hash(
    kind: DigestKind,
    left: &[u8],
    right: &[u8],
    public_seed: &[u8],
    addr: &mut Address,
) -> Vec<u8> {
    let key = prf_addr(kind, public_seed, addr, 0);
    let mask_left = prf_addr(kind, public_seed, addr, 1);
    let mask_right = prf_addr(kind, public_seed, addr, 2);
    let mut input = Vec::with_capacity(left.len() + right.len());
    input.extend(left.iter().zip(&mask_left).map(|(a, b)| a ^ b));
    input.extend(right.iter().zip(&mask_right).map(|(a, b)| a ^ b));
    h(kind, &key, &input)
}

/// Digest of `msg` for leaf `index`, randomised by `r`.
pub(crate) fn message_digest(
    kind: DigestKind,
    r: &[u8],
    root: &[u8],
    index: u64,
    msg: &[u8],
) -> Vec<u8> {
    let n = kind.output_size();
    let mut key = Vec::with_capacity(3 * n);
    key.extend_from_slice(r);
    key.extend_from_slice(root);
    key.extend(to_bytes_be(index, n));
    h_msg(kind, &key, msg)
}

/// Per-signature randomness `PRF(sk_prf, toByte(index, 32))`.
pub(crate) fn message_randomness(kind: DigestKind, sk_prf: &[u8], index: u64) -> Vec<u8> {
    prf(kind, sk_prf, &to_bytes_be(index, 32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_are_separated() {
        let kind = DigestKind::Sha256;
        let key = [7u8; 32];
        let msg = [9u8; 32];
        let outputs = [
            f(kind, &key, &msg),
            h(kind, &key, &msg),
            h_msg(kind, &key, &msg),
            prf(kind, &key, &msg),
        ];
        for i in 0..outputs.len() {
            for j in i + 1..outputs.len() {
                assert_ne!(outputs[i], outputs[j]);
            }
        }
    }

    #[test]
    fn prefix_is_n_bytes() {
        let kind = DigestKind::Shake256;
        let mut prefix = vec![0u8; 64];
        prefix[63] = 3;
        let expected = kind.hash(&[prefix.as_slice(), &b"key"[..], &b"msg"[..]]);
        assert_eq!(prf(kind, b"key", b"msg"), expected);
    }

    #[test]
    fn rand_hash_depends_on_address() {
        let kind = DigestKind::Sha256;
        let seed = [1u8; 32];
        let mut a = Address::hash_tree(0, 0);
        let mut b = Address::hash_tree(0, 0);
        b.set_tree_index(1);
        let left = [2u8; 32];
        let right = [3u8; 32];
        let base = rand_hash(kind, &left, &right, &seed, &mut a);
        assert_ne!(base, rand_hash(kind, &left, &right, &seed, &mut b));
        assert_ne!(base, rand_hash(kind, &right, &left, &seed, &mut a));
    }
}
