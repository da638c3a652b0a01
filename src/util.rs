// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

mod primes;

pub(crate) use primes::{resultant_primes, MAX_RESULTANT_PRIME};

/// Number of bits needed to represent `value` (0 for 0).
#[inline]
pub(crate) fn bit_length(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}

/// `a^-1 mod p` for a prime `p`, or 0 when `a ≡ 0 (mod p)`.
pub(crate) fn invert_mod(a: i64, p: i64) -> i64 {
    let (mut t, mut new_t) = (0i64, 1i64);
    let (mut r, mut new_r) = (p, a.rem_euclid(p));
    while new_r != 0 {
        let quotient = r / new_r;
        (t, new_t) = (new_t, t - quotient * new_t);
        (r, new_r) = (new_r, r - quotient * new_r);
    }
    if r > 1 {
        return 0;
    }
    t.rem_euclid(p)
}

/// `base^exp mod p` by square-and-multiply. `p` must stay below `2^31`.
pub(crate) fn pow_mod(base: i64, mut exp: u64, p: i64) -> i64 {
    let mut result = 1i64 % p;
    let mut base = base.rem_euclid(p);
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % p;
        }
        base = base * base % p;
        exp >>= 1;
    }
    result
}

/// Big-endian encoding of the low `len` bytes of `value`.
pub(crate) fn to_bytes_be(value: u64, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut v = value;
    for byte in out.iter_mut().rev() {
        *byte = (v & 0xff) as u8;
        v = v.checked_shr(8).unwrap_or(0);
    }
    out
}

/// Inverse of [`to_bytes_be`]. Inputs longer than 8 bytes must have zero prefixes.
pub(crate) fn from_bytes_be(bytes: &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for &b in bytes {
        if value >> 56 != 0 {
            return None;
        }
        value = (value << 8) | u64::from(b);
    }
    Some(value)
}
