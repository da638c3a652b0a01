// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::BigInt;
use num_traits::Zero;
use rand::Rng;

use super::encoding::{BitReader, BitWriter};
use super::{mult_by_indices, random_ternary_indices};
use super::{BigIntPolynomial, IntegerPolynomial, Polynomial, TernaryPolynomial};
use crate::error::{Error, Result};
use crate::util::bit_length;

/// Ternary polynomial stored as the sorted positions of its `+1` and `-1`
/// coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseTernaryPolynomial {
    n: usize,
    ones: Vec<usize>,
    neg_ones: Vec<usize>,
}

impl SparseTernaryPolynomial {
    /// Build from index sets, which must be in range and disjoint.
    pub fn new(n: usize, mut ones: Vec<usize>, mut neg_ones: Vec<usize>) -> Result<Self> {
        ones.sort_unstable();
        neg_ones.sort_unstable();
        let in_range = ones.iter().chain(&neg_ones).all(|&i| i < n);
        let distinct = ones.windows(2).all(|w| w[0] != w[1])
            && neg_ones.windows(2).all(|w| w[0] != w[1])
            && ones.iter().all(|i| neg_ones.binary_search(i).is_err());
        if !in_range || !distinct {
            return Err(Error::InvalidTernaryWeight {
                n,
                ones: ones.len(),
                neg_ones: neg_ones.len(),
            });
        }
        Ok(Self { n, ones, neg_ones })
    }

    pub fn generate_random<R: Rng + ?Sized>(
        n: usize,
        ones: usize,
        neg_ones: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let (ones, neg_ones) = random_ternary_indices(n, ones, neg_ones, rng)?;
        Ok(Self { n, ones, neg_ones })
    }

    /// Convert any ternary polynomial to index form.
    pub fn from_dense<T: TernaryPolynomial + ?Sized>(poly: &T) -> Self {
        Self { n: poly.len(), ones: poly.ones().to_vec(), neg_ones: poly.neg_ones().to_vec() }
    }

    /// Pack `ones` then `neg_ones` at `bit_length(N - 1)` bits per index.
    pub fn to_binary(&self) -> Vec<u8> {
        let width = index_width(self.n);
        let count = self.ones.len() + self.neg_ones.len();
        let mut writer = BitWriter::with_bits(count * width as usize);
        for &i in self.ones.iter().chain(&self.neg_ones) {
            writer.write(i as u32, width);
        }
        writer.finish()
    }

    pub fn from_binary(data: &[u8], n: usize, ones: usize, neg_ones: usize) -> Result<Self> {
        let width = index_width(n);
        let expected = ((ones + neg_ones) * width as usize).div_ceil(8);
        if data.len() != expected {
            return Err(Error::malformed(format!("expected {expected} bytes, got {}", data.len())));
        }
        let mut reader = BitReader::new(data);
        let mut read = |count: usize| -> Result<Vec<usize>> {
            (0..count).map(|_| reader.read(width).map(|v| v as usize)).collect()
        };
        let pos = read(ones)?;
        let neg = read(neg_ones)?;
        Self::new(n, pos, neg).map_err(|_| Error::malformed("index out of range or repeated"))
    }
}

fn index_width(n: usize) -> u32 {
    bit_length(n.saturating_sub(1) as u64).max(1)
}

impl Polynomial for SparseTernaryPolynomial {
    fn len(&self) -> usize {
        self.n
    }

    fn mult(&self, other: &IntegerPolynomial) -> Result<IntegerPolynomial> {
        Error::check_len(self.n, other.len())?;
        let b: Vec<i64> = other.coeffs().iter().map(|&c| i64::from(c)).collect();
        let coeffs = mult_by_indices(self.n, &self.ones, &self.neg_ones, &b)
            .into_iter()
            .map(|c| i32::try_from(c).map_err(|_| Error::ArithmeticOverflow))
            .collect::<Result<Vec<_>>>()?;
        Ok(IntegerPolynomial::new(coeffs))
    }

    fn mult_mod(&self, other: &IntegerPolynomial, modulus: i32) -> Result<IntegerPolynomial> {
        Error::check_len(self.n, other.len())?;
        IntegerPolynomial::check_modulus(modulus)?;
        let m = i64::from(modulus);
        let reduced = other.mod_positive(modulus);
        let b: Vec<i64> = reduced.coeffs().iter().map(|&c| i64::from(c)).collect();
        // At most `n` terms below `m` each, so the i64 sums stay exact.
        let coeffs = mult_by_indices(self.n, &self.ones, &self.neg_ones, &b)
            .into_iter()
            .map(|c| c.rem_euclid(m) as i32)
            .collect();
        Ok(IntegerPolynomial::new(coeffs))
    }

    fn mult_big(&self, other: &BigIntPolynomial) -> Result<BigIntPolynomial> {
        Error::check_len(self.n, other.len())?;
        let n = self.n;
        let mut c = vec![BigInt::zero(); n];
        for &i in &self.ones {
            for (j, b) in other.coeffs().iter().enumerate() {
                c[(i + j) % n] += b;
            }
        }
        for &i in &self.neg_ones {
            for (j, b) in other.coeffs().iter().enumerate() {
                c[(i + j) % n] -= b;
            }
        }
        Ok(BigIntPolynomial::new(c))
    }

    fn to_integer_polynomial(&self) -> IntegerPolynomial {
        let mut coeffs = vec![0; self.n];
        for &i in &self.ones {
            coeffs[i] = 1;
        }
        for &i in &self.neg_ones {
            coeffs[i] = -1;
        }
        IntegerPolynomial::new(coeffs)
    }
}

impl TernaryPolynomial for SparseTernaryPolynomial {
    fn ones(&self) -> &[usize] {
        &self.ones
    }

    fn neg_ones(&self) -> &[usize] {
        &self.neg_ones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_weights_are_exact() {
        let mut rng = StdRng::seed_from_u64(12);
        let p = SparseTernaryPolynomial::generate_random(439, 9, 8, &mut rng).unwrap();
        let dense = p.to_integer_polynomial();
        assert_eq!(dense.count(1), 9);
        assert_eq!(dense.count(-1), 8);
        assert!(SparseTernaryPolynomial::generate_random(5, 3, 3, &mut rng).is_err());
    }

    #[test]
    fn mult_matches_integer_product() {
        let mut rng = StdRng::seed_from_u64(13);
        let p = SparseTernaryPolynomial::generate_random(107, 15, 14, &mut rng).unwrap();
        let b = IntegerPolynomial::new((0..107).map(|i| (i * 37 % 2048) - 1024).collect());
        assert_eq!(p.mult(&b).unwrap(), p.to_integer_polynomial().mult(&b).unwrap());
        assert_eq!(
            p.mult_big(&BigIntPolynomial::from(&b)).unwrap(),
            BigIntPolynomial::from(&p.mult(&b).unwrap())
        );
        assert_eq!(
            p.mult_mod(&b, 2048).unwrap(),
            p.to_integer_polynomial().mult_mod(&b, 2048).unwrap()
        );
    }

    #[test]
    fn mult_mod_accepts_full_range_operand() {
        let p = SparseTernaryPolynomial::new(4, vec![0, 1], vec![]).unwrap();
        let b = IntegerPolynomial::new(vec![i32::MAX, i32::MAX, 0, 0]);
        assert!(matches!(p.mult(&b), Err(Error::ArithmeticOverflow)));
        let c = p.mult_mod(&b, 2048).unwrap();
        assert_eq!(c.coeffs(), &[2047, 2046, 2047, 0]);
        assert_eq!(c, p.to_integer_polynomial().mult_mod(&b, 2048).unwrap());

        let q = SparseTernaryPolynomial::new(4, vec![2], vec![0, 3]).unwrap();
        let b = IntegerPolynomial::new(vec![i32::MIN, i32::MAX, -7, i32::MAX]);
        let expected = q.to_integer_polynomial().mult_mod(&b, 2039).unwrap();
        assert_eq!(q.mult_mod(&b, 2039).unwrap(), expected);
        assert!(matches!(q.mult_mod(&b, 0), Err(Error::InvalidModulus(0))));
    }

    #[test]
    fn binary_layout() {
        let p = SparseTernaryPolynomial::new(11, vec![3, 0], vec![10]).unwrap();
        // Four bits per index: 0, 3, 10.
        assert_eq!(p.to_binary(), vec![0x03, 0xA0]);
        assert_eq!(SparseTernaryPolynomial::from_binary(&p.to_binary(), 11, 2, 1).unwrap(), p);
    }

    #[test]
    fn binary_rejects_bad_input() {
        // Index 15 is out of range for N = 11.
        assert!(SparseTernaryPolynomial::from_binary(&[0x0F, 0xA0], 11, 2, 1).is_err());
        // Index 3 appears in both sets.
        assert!(SparseTernaryPolynomial::from_binary(&[0x03, 0x30], 11, 2, 1).is_err());
        assert!(SparseTernaryPolynomial::from_binary(&[0x03], 11, 2, 1).is_err());
    }

    #[test]
    fn from_dense_keeps_positions() {
        let mut rng = StdRng::seed_from_u64(14);
        let p = SparseTernaryPolynomial::generate_random(50, 5, 5, &mut rng).unwrap();
        assert_eq!(SparseTernaryPolynomial::from_dense(&p), p);
    }
}
