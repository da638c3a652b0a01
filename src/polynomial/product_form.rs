// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use rand::Rng;

use super::{mult_by_indices, BigIntPolynomial, IntegerPolynomial, Polynomial};
use super::{SparseTernaryPolynomial, TernaryPolynomial};
use crate::error::{Error, Result};

/// `f1 * f2 + f3` for sparse ternary `f1`, `f2`, `f3`.
///
/// Multiplying by a product-form polynomial costs `O(N * (d1 + d2 + d3))`
/// instead of `O(N^2)`, while the expanded polynomial has far more non-zero
/// coefficients than the three factors together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFormPolynomial {
    f1: SparseTernaryPolynomial,
    f2: SparseTernaryPolynomial,
    f3: SparseTernaryPolynomial,
}

impl ProductFormPolynomial {
    pub fn new(
        f1: SparseTernaryPolynomial,
        f2: SparseTernaryPolynomial,
        f3: SparseTernaryPolynomial,
    ) -> Result<Self> {
        Error::check_len(f1.len(), f2.len())?;
        Error::check_len(f1.len(), f3.len())?;
        Ok(Self { f1, f2, f3 })
    }

    /// Draw `f1` with `df1` ones and `df1` negative ones, `f2` likewise with
    /// `df2`, and `f3` with the given counts.
    pub fn generate_random<R: Rng + ?Sized>(
        n: usize,
        df1: usize,
        df2: usize,
        df3_ones: usize,
        df3_neg_ones: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let f1 = SparseTernaryPolynomial::generate_random(n, df1, df1, rng)?;
        let f2 = SparseTernaryPolynomial::generate_random(n, df2, df2, rng)?;
        let f3 = SparseTernaryPolynomial::generate_random(n, df3_ones, df3_neg_ones, rng)?;
        Ok(Self { f1, f2, f3 })
    }

    pub fn factors(
        &self,
    ) -> (&SparseTernaryPolynomial, &SparseTernaryPolynomial, &SparseTernaryPolynomial) {
        (&self.f1, &self.f2, &self.f3)
    }

    /// `f1 || f2 || f3`, each in sparse index form.
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = self.f1.to_binary();
        out.extend(self.f2.to_binary());
        out.extend(self.f3.to_binary());
        out
    }

    pub fn from_binary(
        data: &[u8],
        n: usize,
        df1: usize,
        df2: usize,
        df3_ones: usize,
        df3_neg_ones: usize,
    ) -> Result<Self> {
        let width = crate::util::bit_length(n.saturating_sub(1) as u64).max(1) as usize;
        let len1 = (2 * df1 * width).div_ceil(8);
        let len2 = (2 * df2 * width).div_ceil(8);
        let len3 = ((df3_ones + df3_neg_ones) * width).div_ceil(8);
        if data.len() != len1 + len2 + len3 {
            return Err(Error::malformed(format!(
                "expected {} bytes, got {}",
                len1 + len2 + len3,
                data.len()
            )));
        }
        let (d1, rest) = data.split_at(len1);
        let (d2, d3) = rest.split_at(len2);
        Ok(Self {
            f1: SparseTernaryPolynomial::from_binary(d1, n, df1, df1)?,
            f2: SparseTernaryPolynomial::from_binary(d2, n, df2, df2)?,
            f3: SparseTernaryPolynomial::from_binary(d3, n, df3_ones, df3_neg_ones)?,
        })
    }
}

impl Polynomial for ProductFormPolynomial {
    fn len(&self) -> usize {
        self.f1.len()
    }

    fn mult(&self, other: &IntegerPolynomial) -> Result<IntegerPolynomial> {
        let c = self.f2.mult(&self.f1.mult(other)?)?;
        c.add(&self.f3.mult(other)?)
    }

    fn mult_mod(&self, other: &IntegerPolynomial, modulus: i32) -> Result<IntegerPolynomial> {
        let c = self.f1.mult_mod(other, modulus)?;
        let c = self.f2.mult_mod(&c, modulus)?;
        c.add_mod(&self.f3.mult_mod(other, modulus)?, modulus)
    }

    fn mult_big(&self, other: &BigIntPolynomial) -> Result<BigIntPolynomial> {
        let c = self.f2.mult_big(&self.f1.mult_big(other)?)?;
        c.add(&self.f3.mult_big(other)?)
    }

    fn to_integer_polynomial(&self) -> IntegerPolynomial {
        let n = self.len();
        let f2: Vec<i64> =
            self.f2.to_integer_polynomial().coeffs().iter().map(|&c| i64::from(c)).collect();
        let product = mult_by_indices(n, self.f1.ones(), self.f1.neg_ones(), &f2);
        let mut coeffs: Vec<i32> = product.into_iter().map(|c| c as i32).collect();
        for &i in self.f3.ones() {
            coeffs[i] += 1;
        }
        for &i in self.f3.neg_ones() {
            coeffs[i] -= 1;
        }
        IntegerPolynomial::new(coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn binary_roundtrip_and_rejection() {
        let mut rng = StdRng::seed_from_u64(31);
        let p = ProductFormPolynomial::generate_random(439, 9, 8, 5, 5, &mut rng).unwrap();
        let data = p.to_binary();
        assert_eq!(ProductFormPolynomial::from_binary(&data, 439, 9, 8, 5, 5).unwrap(), p);
        assert!(ProductFormPolynomial::from_binary(&data[1..], 439, 9, 8, 5, 5).is_err());
        assert!(ProductFormPolynomial::from_binary(&data, 439, 9, 8, 5, 4).is_err());
    }

    #[test]
    fn factors_must_share_length() {
        let a = SparseTernaryPolynomial::new(5, vec![0], vec![1]).unwrap();
        let b = SparseTernaryPolynomial::new(6, vec![0], vec![1]).unwrap();
        assert!(ProductFormPolynomial::new(a.clone(), a.clone(), b).is_err());
        assert!(ProductFormPolynomial::new(a.clone(), a.clone(), a).is_ok());
    }

    #[test]
    fn big_product_matches() {
        let mut rng = StdRng::seed_from_u64(32);
        let p = ProductFormPolynomial::generate_random(107, 6, 5, 4, 4, &mut rng).unwrap();
        let b = IntegerPolynomial::new((0..107).map(|i| 3 * i - 160).collect());
        let expected = BigIntPolynomial::from(&p.mult(&b).unwrap());
        assert_eq!(p.mult_big(&BigIntPolynomial::from(&b)).unwrap(), expected);
    }

    #[test]
    fn mult_mod_accepts_full_range_operand() {
        let f1 = SparseTernaryPolynomial::new(4, vec![0, 1], vec![]).unwrap();
        let f2 = SparseTernaryPolynomial::new(4, vec![0], vec![2]).unwrap();
        let f3 = SparseTernaryPolynomial::new(4, vec![1], vec![3]).unwrap();
        let p = ProductFormPolynomial::new(f1, f2, f3).unwrap();
        let b = IntegerPolynomial::new(vec![i32::MAX, i32::MAX, 0, 0]);
        let expanded = p.to_integer_polynomial();
        assert_eq!(p.mult_mod(&b, 2048).unwrap(), expanded.mult_mod(&b, 2048).unwrap());
        assert_eq!(p.mult_mod(&b, 3).unwrap(), expanded.mult_mod(&b, 3).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn product_form_equals_expanded(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = ProductFormPolynomial::generate_random(107, 6, 5, 4, 4, &mut rng).unwrap();
            let coeffs = (0..107).map(|i| ((seed as i32 >> 3) ^ i) % 2048).collect();
            let b = IntegerPolynomial::new(coeffs);
            let expanded = p.to_integer_polynomial();
            prop_assert_eq!(p.mult(&b).unwrap(), expanded.mult(&b).unwrap());
            prop_assert_eq!(p.mult_mod(&b, 2048).unwrap(), expanded.mult_mod(&b, 2048).unwrap());
        }
    }
}
