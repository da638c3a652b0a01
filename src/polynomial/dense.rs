// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use rand::Rng;

use super::random_ternary_indices;
use super::{BigIntPolynomial, IntegerPolynomial, LongPolynomial5, Polynomial, TernaryPolynomial};
use crate::error::{Error, Result};

/// Ternary polynomial stored coefficient by coefficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseTernaryPolynomial {
    poly: IntegerPolynomial,
    ones: Vec<usize>,
    neg_ones: Vec<usize>,
}

impl DenseTernaryPolynomial {
    /// Wrap `poly`, checking that every coefficient is in `{-1, 0, 1}`.
    pub fn new(poly: IntegerPolynomial) -> Result<Self> {
        let mut ones = Vec::new();
        let mut neg_ones = Vec::new();
        for (i, &c) in poly.coeffs().iter().enumerate() {
            match c {
                1 => ones.push(i),
                -1 => neg_ones.push(i),
                0 => {}
                other => {
                    return Err(Error::malformed(format!(
                        "coefficient {other} at {i} is not ternary"
                    )))
                }
            }
        }
        Ok(Self { poly, ones, neg_ones })
    }

    pub fn generate_random<R: Rng + ?Sized>(
        n: usize,
        ones: usize,
        neg_ones: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let (ones, neg_ones) = random_ternary_indices(n, ones, neg_ones, rng)?;
        let mut coeffs = vec![0; n];
        for &i in &ones {
            coeffs[i] = 1;
        }
        for &i in &neg_ones {
            coeffs[i] = -1;
        }
        Ok(Self { poly: IntegerPolynomial::new(coeffs), ones, neg_ones })
    }

    pub fn as_integer_polynomial(&self) -> &IntegerPolynomial {
        &self.poly
    }
}

impl Polynomial for DenseTernaryPolynomial {
    fn len(&self) -> usize {
        self.poly.len()
    }

    fn mult(&self, other: &IntegerPolynomial) -> Result<IntegerPolynomial> {
        self.poly.mult(other)
    }

    fn mult_mod(&self, other: &IntegerPolynomial, modulus: i32) -> Result<IntegerPolynomial> {
        if modulus == 2048 {
            Error::check_len(self.len(), other.len())?;
            return Ok(LongPolynomial5::from_integer(other).mult(self)?.to_integer_polynomial());
        }
        self.poly.mult_mod(other, modulus)
    }

    fn mult_big(&self, other: &BigIntPolynomial) -> Result<BigIntPolynomial> {
        BigIntPolynomial::from(&self.poly).mult(other)
    }

    fn to_integer_polynomial(&self) -> IntegerPolynomial {
        self.poly.clone()
    }
}

impl TernaryPolynomial for DenseTernaryPolynomial {
    fn ones(&self) -> &[usize] {
        &self.ones
    }

    fn neg_ones(&self) -> &[usize] {
        &self.neg_ones
    }
}

impl TryFrom<IntegerPolynomial> for DenseTernaryPolynomial {
    type Error = Error;

    fn try_from(poly: IntegerPolynomial) -> Result<Self> {
        Self::new(poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::SparseTernaryPolynomial;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_non_ternary() {
        assert!(DenseTernaryPolynomial::new(IntegerPolynomial::new(vec![1, 0, 2])).is_err());
        let ok =
            DenseTernaryPolynomial::try_from(IntegerPolynomial::new(vec![1, 0, -1, 1])).unwrap();
        assert_eq!(ok.ones(), &[0, 3]);
        assert_eq!(ok.neg_ones(), &[2]);
    }

    #[test]
    fn packed_path_matches_plain_product() {
        let mut rng = StdRng::seed_from_u64(21);
        let t = DenseTernaryPolynomial::generate_random(439, 146, 146, &mut rng).unwrap();
        let b = IntegerPolynomial::new((0..439).map(|i| (i * 1013) % 2048).collect());
        let fast = t.mult_mod(&b, 2048).unwrap();
        assert_eq!(fast, t.mult(&b).unwrap().mod_positive(2048));
        assert_eq!(t.mult_mod(&b, 2047).unwrap(), t.mult(&b).unwrap().mod_positive(2047));
    }

    #[test]
    fn sparse_and_dense_agree() {
        let mut rng = StdRng::seed_from_u64(22);
        let t = DenseTernaryPolynomial::generate_random(107, 20, 19, &mut rng).unwrap();
        let s = SparseTernaryPolynomial::from_dense(&t);
        assert_eq!(s.to_integer_polynomial(), t.to_integer_polynomial());
        let b = IntegerPolynomial::new((0..107).map(|i| i - 50).collect());
        assert_eq!(s.mult(&b).unwrap(), t.mult(&b).unwrap());
    }
}
