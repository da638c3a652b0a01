// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::IntegerPolynomial;
use crate::error::{Error, Result};

const LANE_SHIFT: u32 = 24;
const MOD_MASK: u64 = 2047;
/// Bit 23 of each lane; a multiple of 2048 that keeps lane subtraction non-negative.
const BORROW_GUARD: u64 = 0x0000_8000_0080_0000;

/// Polynomial mod 2048 with two 11-bit coefficients per `u64`.
///
/// Coefficient `2i` lives at bits `0..11` of word `i` and `2i + 1` at bits
/// `24..35`. The gaps absorb single products so lanes never bleed into each
/// other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPolynomial2 {
    words: Vec<u64>,
    num_coeffs: usize,
}

impl LongPolynomial2 {
    /// Pack a polynomial whose coefficients are already in `[0, 2048)`.
    pub fn from_integer(poly: &IntegerPolynomial) -> Self {
        let coeffs = poly.coeffs();
        let words = coeffs
            .chunks(2)
            .map(|pair| {
                let lo = pair[0] as u64 & MOD_MASK;
                let hi = pair.get(1).map_or(0, |&c| c as u64 & MOD_MASK);
                lo | (hi << LANE_SHIFT)
            })
            .collect();
        Self { words, num_coeffs: coeffs.len() }
    }

    pub fn len(&self) -> usize {
        self.num_coeffs
    }

    pub fn is_empty(&self) -> bool {
        self.num_coeffs == 0
    }

    /// Product mod `(x^N - 1, 2048)`.
    pub fn mult(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.num_coeffs, other.num_coeffs)?;
        let n = self.num_coeffs;
        if n == 0 {
            return Ok(self.clone());
        }
        let mut coeffs = vec![0u64; 2 * self.words.len() * 2 + 2];
        for (i, &a) in self.words.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in other.words.iter().enumerate() {
                // lo*lo at bits 0.., the cross terms at 24.., hi*hi at 48..
                let product = a.wrapping_mul(b);
                let base = 2 * (i + j);
                coeffs[base] += product & MOD_MASK;
                coeffs[base + 1] += (product >> LANE_SHIFT) & MOD_MASK;
                coeffs[base + 2] += (product >> (2 * LANE_SHIFT)) & MOD_MASK;
            }
        }
        let mut folded = vec![0u64; n];
        for (k, c) in coeffs.into_iter().enumerate() {
            folded[k % n] += c;
        }
        let reduced: Vec<i32> = folded.into_iter().map(|c| (c & MOD_MASK) as i32).collect();
        Ok(Self::from_integer(&IntegerPolynomial::new(reduced)))
    }

    /// Multiply every coefficient by 2 and mask with `mask`.
    pub fn mult2_and(&mut self, mask: u32) {
        let lanes = lane_mask(mask);
        for w in &mut self.words {
            *w = (*w << 1) & lanes;
        }
    }

    /// Subtract `other` lane-wise and mask with `mask`.
    ///
    /// `mask + 1` must be a power of two no larger than 2048.
    pub fn sub_and(&mut self, other: &Self, mask: u32) -> Result<()> {
        Error::check_len(self.num_coeffs, other.num_coeffs)?;
        let lanes = lane_mask(mask);
        for (w, &b) in self.words.iter_mut().zip(&other.words) {
            *w = (BORROW_GUARD + *w - b) & lanes;
        }
        Ok(())
    }

    pub fn to_integer_polynomial(&self) -> IntegerPolynomial {
        let mut coeffs = Vec::with_capacity(self.words.len() * 2);
        for &w in &self.words {
            coeffs.push((w & MOD_MASK) as i32);
            coeffs.push(((w >> LANE_SHIFT) & MOD_MASK) as i32);
        }
        coeffs.truncate(self.num_coeffs);
        IntegerPolynomial::new(coeffs)
    }
}

fn lane_mask(mask: u32) -> u64 {
    let m = u64::from(mask) & MOD_MASK;
    m | (m << LANE_SHIFT)
}
