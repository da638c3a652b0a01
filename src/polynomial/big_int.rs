// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::resultant::{centered, positive_mod};
use super::{BigDecimalPolynomial, Decimal, IntegerPolynomial};
use crate::error::{Error, Result};

/// Polynomial in `Z[x]/(x^N - 1)` with arbitrary-precision coefficients.
///
/// Products never overflow, which the resultant and rational cross-checks
/// depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigIntPolynomial {
    coeffs: Vec<BigInt>,
}

impl BigIntPolynomial {
    pub fn new(coeffs: Vec<BigInt>) -> Self {
        Self { coeffs }
    }

    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![BigInt::zero(); n] }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeffs(&self) -> &[BigInt] {
        &self.coeffs
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        Ok(Self::new(self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a + b).collect()))
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        Ok(Self::new(self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a - b).collect()))
    }

    /// Exact product mod `x^N - 1`.
    pub fn mult(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let n = self.len();
        let mut c = vec![BigInt::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                c[(i + j) % n] += a * b;
            }
        }
        Ok(Self::new(c))
    }

    pub fn mult_scalar(&self, factor: &BigInt) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    /// Divide every coefficient by `divisor`, rounding half to even.
    pub fn div_round(&self, divisor: &BigInt) -> Result<Self> {
        if divisor.is_zero() {
            return Err(Error::InvalidModulus(0));
        }
        Ok(Self::new(self.coeffs.iter().map(|c| round_half_even(c, divisor)).collect()))
    }

    /// Divide by `divisor` keeping `decimal_places` fractional digits.
    pub fn div(&self, divisor: &BigInt, decimal_places: u32) -> Result<BigDecimalPolynomial> {
        if divisor.is_zero() {
            return Err(Error::InvalidModulus(0));
        }
        let scale = num_traits::pow(BigInt::from(10), decimal_places as usize);
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| Decimal::new(round_half_even(&(c * &scale), divisor), decimal_places))
            .collect();
        Ok(BigDecimalPolynomial::new(coeffs))
    }

    pub fn mod_positive(&self, modulus: &BigInt) -> Self {
        Self::new(self.coeffs.iter().map(|c| positive_mod(c, modulus)).collect())
    }

    /// Map coefficients from `[0, modulus)` into `(-modulus/2, modulus/2]`.
    pub fn centered(&self, modulus: &BigInt) -> Self {
        Self::new(self.coeffs.iter().map(|c| centered(c, modulus)).collect())
    }

    /// Bit length of the largest coefficient magnitude.
    pub fn max_coeff_abs_bits(&self) -> usize {
        self.coeffs.iter().map(|c| c.abs().bits()).max().unwrap_or(0)
    }

    /// Narrow to `i32` coefficients, failing on the first that does not fit.
    pub fn try_to_integer_polynomial(&self) -> Result<IntegerPolynomial> {
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| c.to_i32().ok_or(Error::ArithmeticOverflow))
            .collect::<Result<Vec<_>>>()?;
        Ok(IntegerPolynomial::new(coeffs))
    }
}

impl From<&IntegerPolynomial> for BigIntPolynomial {
    fn from(poly: &IntegerPolynomial) -> Self {
        Self::new(poly.coeffs().iter().map(|&c| BigInt::from(c)).collect())
    }
}

/// `numerator / divisor` rounded to the nearest integer, ties to even.
pub(crate) fn round_half_even(numerator: &BigInt, divisor: &BigInt) -> BigInt {
    let (numerator, divisor) = if divisor.is_negative() {
        (-numerator, -divisor)
    } else {
        (numerator.clone(), divisor.clone())
    };
    let mut q = &numerator / &divisor;
    let mut r = &numerator % &divisor;
    // Truncating division: bring the remainder into [0, divisor).
    if r.is_negative() {
        q -= 1;
        r += &divisor;
    }
    let twice = &r * BigInt::from(2);
    if twice > divisor || (twice == divisor && (&q % BigInt::from(2)) != BigInt::zero()) {
        q += 1;
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn big(values: &[i64]) -> BigIntPolynomial {
        BigIntPolynomial::new(values.iter().map(|&v| BigInt::from(v)).collect())
    }

    #[test]
    fn mult_agrees_with_integer_polynomial() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = IntegerPolynomial::new((0..64).map(|_| rng.random_range(-100..100)).collect());
        let b = IntegerPolynomial::new((0..64).map(|_| rng.random_range(-100..100)).collect());
        let expected = BigIntPolynomial::from(&a.mult(&b).unwrap());
        assert_eq!(BigIntPolynomial::from(&a).mult(&BigIntPolynomial::from(&b)).unwrap(), expected);
    }

    #[test]
    fn exact_product_beyond_i32() {
        let a = big(&[1 << 40, 0, 1]);
        let product = a.mult(&a).unwrap();
        assert_eq!(product.coeffs()[2], BigInt::from(1i64 << 41));
        assert_eq!(product.coeffs()[1], BigInt::from(1));
        assert_eq!(product.try_to_integer_polynomial(), Err(Error::ArithmeticOverflow));
        assert_eq!(product.max_coeff_abs_bits(), 81);
    }

    #[test]
    fn rounding_ties_to_even() {
        let two = BigInt::from(2);
        assert_eq!(round_half_even(&BigInt::from(5), &two), BigInt::from(2));
        assert_eq!(round_half_even(&BigInt::from(7), &two), BigInt::from(4));
        assert_eq!(round_half_even(&BigInt::from(-5), &two), BigInt::from(-2));
        assert_eq!(round_half_even(&BigInt::from(-7), &two), BigInt::from(-4));
        assert_eq!(round_half_even(&BigInt::from(8), &BigInt::from(-3)), BigInt::from(-3));
        assert_eq!(round_half_even(&BigInt::from(-10), &BigInt::from(3)), BigInt::from(-3));
    }

    #[test]
    fn div_round_and_shapes() {
        let a = big(&[10, -10, 15, 3]);
        assert_eq!(a.div_round(&BigInt::from(4)).unwrap(), big(&[2, -2, 4, 1]));
        assert!(a.div_round(&BigInt::zero()).is_err());
        assert!(a.add(&big(&[1])).is_err());
        assert_eq!(a.sub(&a).unwrap(), BigIntPolynomial::zero(4));
        assert_eq!(a.mod_positive(&BigInt::from(7)), big(&[3, 4, 1, 3]));
    }
}
