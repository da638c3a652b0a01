// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{IntegerPolynomial, TernaryPolynomial};
use crate::error::{Error, Result};

const LANES: usize = 5;
const LANE_BITS: usize = 12;
const COEFF_MASK: u64 = 2047;
/// `0x7FF` in every lane.
const LANE_MASK: u64 = 0x07FF_7FF7_FF7F_F7FF;
/// `0x800` in every lane, used to negate a word without borrows.
const NEGATION_BASE: u64 = 0x0800_8008_0080_0800;

/// Polynomial mod 2048 with five 12-bit coefficients per `u64`.
///
/// Only multiplication by a ternary polynomial is supported; every lane is
/// reduced after each word-wide add so the twelfth bit never carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPolynomial5 {
    words: Vec<u64>,
    num_coeffs: usize,
}

impl LongPolynomial5 {
    pub fn from_integer(poly: &IntegerPolynomial) -> Self {
        let reduced: Vec<u64> = poly.coeffs().iter().map(|&c| c.rem_euclid(2048) as u64).collect();
        Self { words: pack(&reduced, 0), num_coeffs: reduced.len() }
    }

    pub fn len(&self) -> usize {
        self.num_coeffs
    }

    pub fn is_empty(&self) -> bool {
        self.num_coeffs == 0
    }

    /// Product with a ternary polynomial mod `(x^N - 1, 2048)`.
    pub fn mult<T: TernaryPolynomial + ?Sized>(&self, ternary: &T) -> Result<Self> {
        Error::check_len(self.num_coeffs, ternary.len())?;
        let n = self.num_coeffs;
        if n == 0 {
            return Ok(self.clone());
        }
        let coeffs = unpack(&self.words, n);
        // One copy of `self` per sub-word shift so any index is a word offset.
        let shifted: Vec<Vec<u64>> = (0..LANES).map(|k| pack(&coeffs, k)).collect();
        let width = shifted[LANES - 1].len();
        let mut acc = vec![0u64; n / LANES + 1 + width];

        for &i in ternary.ones() {
            let copy = &shifted[i % LANES];
            let offset = i / LANES;
            for (a, &w) in acc[offset..].iter_mut().zip(copy) {
                *a = (*a + w) & LANE_MASK;
            }
        }
        for &i in ternary.neg_ones() {
            let copy = &shifted[i % LANES];
            let offset = i / LANES;
            for (a, &w) in acc[offset..].iter_mut().zip(copy) {
                *a = (*a + (NEGATION_BASE - w)) & LANE_MASK;
            }
        }

        let linear = unpack(&acc, acc.len() * LANES);
        let mut folded = vec![0u64; n];
        for (t, c) in linear.into_iter().enumerate() {
            folded[t % n] += c;
        }
        let reduced: Vec<u64> = folded.into_iter().map(|c| c & COEFF_MASK).collect();
        Ok(Self { words: pack(&reduced, 0), num_coeffs: n })
    }

    pub fn to_integer_polynomial(&self) -> IntegerPolynomial {
        let coeffs = unpack(&self.words, self.num_coeffs).into_iter().map(|c| c as i32).collect();
        IntegerPolynomial::new(coeffs)
    }
}

/// Pack coefficients after shifting them up by `shift` positions.
fn pack(coeffs: &[u64], shift: usize) -> Vec<u64> {
    let total = coeffs.len() + shift;
    let mut words = vec![0u64; total.div_ceil(LANES)];
    for (j, &c) in coeffs.iter().enumerate() {
        let pos = j + shift;
        words[pos / LANES] |= (c & COEFF_MASK) << (LANE_BITS * (pos % LANES));
    }
    words
}

fn unpack(words: &[u64], count: usize) -> Vec<u64> {
    (0..count)
        .map(|pos| (words[pos / LANES] >> (LANE_BITS * (pos % LANES))) & COEFF_MASK)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::{DenseTernaryPolynomial, Polynomial};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn masks_cover_five_lanes() {
        let mut mask = 0u64;
        let mut base = 0u64;
        for k in 0..LANES {
            mask |= 0x7FF << (LANE_BITS * k);
            base |= 0x800 << (LANE_BITS * k);
        }
        assert_eq!(mask, LANE_MASK);
        assert_eq!(base, NEGATION_BASE);
    }

    #[test]
    fn ternary_product_matches_schoolbook() {
        let mut rng = StdRng::seed_from_u64(9);
        for n in [1, 4, 5, 6, 11, 107, 439] {
            let a = IntegerPolynomial::new((0..n).map(|_| rng.random_range(-3000..3000)).collect());
            let ones = n / 3;
            let neg = n / 4;
            let t = DenseTernaryPolynomial::generate_random(n, ones, neg, &mut rng).unwrap();
            let packed = LongPolynomial5::from_integer(&a).mult(&t).unwrap();
            let expected = a.mult_mod(&t.to_integer_polynomial(), 2048).unwrap();
            assert_eq!(packed.to_integer_polynomial(), expected, "n = {n}");
        }
    }

    #[test]
    fn length_is_checked() {
        let mut rng = StdRng::seed_from_u64(0);
        let t = DenseTernaryPolynomial::generate_random(6, 1, 1, &mut rng).unwrap();
        let a = LongPolynomial5::from_integer(&IntegerPolynomial::zero(5));
        assert!(a.mult(&t).is_err());
    }
}
