// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use num_bigint_dig::BigInt;
use num_traits::{Signed, Zero};

use super::big_int::round_half_even;
use super::BigIntPolynomial;
use crate::error::{Error, Result};

/// Fixed-point decimal `mantissa / 10^scale`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn from_integer(value: BigInt) -> Self {
        Self::new(value, 0)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        &self.mantissa * ten_pow(scale - self.scale)
    }

    pub fn add(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        Self::new(self.rescaled(scale) + other.rescaled(scale), scale)
    }

    pub fn mult(&self, other: &Self) -> Self {
        Self::new(&self.mantissa * &other.mantissa, self.scale + other.scale)
    }

    pub fn mult_integer(&self, other: &BigInt) -> Self {
        Self::new(&self.mantissa * other, self.scale)
    }

    /// Exact division by two, adding one decimal place.
    pub fn halve(&self) -> Self {
        Self::new(&self.mantissa * BigInt::from(5), self.scale + 1)
    }

    /// Nearest integer, ties to even.
    pub fn round(&self) -> BigInt {
        round_half_even(&self.mantissa, &ten_pow(self.scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.abs().to_string();
        let sign = if self.mantissa.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int}.{frac}")
    }
}

fn ten_pow(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

/// Polynomial in `Q[x]/(x^N - 1)` with fixed-point decimal coefficients.
///
/// Used to check rational identities such as `a * (rho / res) = 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigDecimalPolynomial {
    coeffs: Vec<Decimal>,
}

impl BigDecimalPolynomial {
    pub fn new(coeffs: Vec<Decimal>) -> Self {
        Self { coeffs }
    }

    pub fn from_big_int(poly: &BigIntPolynomial) -> Self {
        Self::new(poly.coeffs().iter().cloned().map(Decimal::from_integer).collect())
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeffs(&self) -> &[Decimal] {
        &self.coeffs
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        Ok(Self::new(self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a.add(b)).collect()))
    }

    pub fn halve(&self) -> Self {
        Self::new(self.coeffs.iter().map(Decimal::halve).collect())
    }

    /// Product with an integer polynomial mod `x^N - 1`.
    pub fn mult(&self, other: &BigIntPolynomial) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let n = self.len();
        let scale = self.max_scale();
        let mantissas: Vec<BigInt> = self.coeffs.iter().map(|c| c.rescaled(scale)).collect();
        let mut c = vec![BigInt::zero(); n];
        for (i, a) in mantissas.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs().iter().enumerate() {
                c[(i + j) % n] += a * b;
            }
        }
        Ok(Self::new(c.into_iter().map(|m| Decimal::new(m, scale)).collect()))
    }

    /// Product of two decimal polynomials mod `x^N - 1`.
    pub fn mult_decimal(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let n = self.len();
        let zero = Decimal::from_integer(BigInt::zero());
        let mut c = vec![zero; n];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                let k = (i + j) % n;
                c[k] = c[k].add(&a.mult(b));
            }
        }
        Ok(Self::new(c))
    }

    /// Round every coefficient to the nearest integer, ties to even.
    pub fn round(&self) -> BigIntPolynomial {
        BigIntPolynomial::new(self.coeffs.iter().map(Decimal::round).collect())
    }

    fn max_scale(&self) -> u32 {
        self.coeffs.iter().map(Decimal::scale).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::IntegerPolynomial;

    fn dec(m: i64, scale: u32) -> Decimal {
        Decimal::new(BigInt::from(m), scale)
    }

    #[test]
    fn decimal_arithmetic() {
        let a = dec(125, 2);
        let b = dec(3, 1);
        assert_eq!(a.add(&b), dec(155, 2));
        assert_eq!(a.mult(&b), dec(375, 3));
        assert_eq!(dec(3, 0).halve(), dec(15, 1));
        assert_eq!(dec(25, 1).round(), BigInt::from(2));
        assert_eq!(dec(35, 1).round(), BigInt::from(4));
        assert_eq!(dec(-26, 1).round(), BigInt::from(-3));
    }

    #[test]
    fn display() {
        assert_eq!(dec(125, 2).to_string(), "1.25");
        assert_eq!(dec(-5, 3).to_string(), "-0.005");
        assert_eq!(dec(42, 0).to_string(), "42");
    }

    #[test]
    fn cofactor_over_resultant_is_the_inverse() {
        let a = IntegerPolynomial::new(vec![-1, 1, 1, 0, -1, 0, 1, 0, 0, 1, -1]);
        let r = a.resultant().unwrap();
        let inverse = r.rho.div(&r.res, 30).unwrap();
        let product = inverse.mult(&BigIntPolynomial::from(&a)).unwrap();
        assert_eq!(product.round(), BigIntPolynomial::from(&IntegerPolynomial::one(11)));
    }

    #[test]
    fn halve_then_double() {
        let p = BigDecimalPolynomial::from_big_int(&BigIntPolynomial::new(vec![
            BigInt::from(3),
            BigInt::from(-7),
        ]));
        let half = p.halve();
        let twice = half.add(&half).unwrap();
        assert_eq!(twice.round(), p.round());
        assert_eq!(half.coeffs()[0], dec(15, 1));
    }

    #[test]
    fn decimal_product() {
        let a = BigDecimalPolynomial::new(vec![dec(5, 1), dec(0, 0), dec(0, 0)]);
        let b = BigDecimalPolynomial::new(vec![dec(0, 0), dec(4, 0), dec(0, 0)]);
        let c = a.mult_decimal(&b).unwrap();
        assert_eq!(c.round(), BigIntPolynomial::new(vec![0.into(), 2.into(), 0.into()]));
    }
}
