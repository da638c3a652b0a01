// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::{BigInt, ModInverse};
use num_traits::{One, Signed, Zero};

use super::BigIntPolynomial;

/// Resultant of `x^N - 1` and a polynomial `a`, with the cofactor `rho`
/// satisfying `rho * a ≡ res (mod x^N - 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resultant {
    pub res: BigInt,
    pub rho: BigIntPolynomial,
}

impl Resultant {
    pub fn new(res: BigInt, rho: BigIntPolynomial) -> Self {
        Self { res, rho }
    }

    /// True when `a` is invertible mod `(x^N - 1, modulus)`.
    ///
    /// That is the case exactly when the resultant is a unit mod `modulus`.
    pub fn is_unit_mod(&self, modulus: &BigInt) -> bool {
        !self.res.is_zero() && gcd(&self.res, modulus).is_one()
    }
}

/// A resultant and its cofactor known only modulo `modulus`.
///
/// Values are kept in `[0, modulus)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModularResultant {
    pub res: BigInt,
    pub rho: BigIntPolynomial,
    pub modulus: BigInt,
}

impl ModularResultant {
    pub fn new(res: BigInt, rho: BigIntPolynomial, modulus: BigInt) -> Self {
        Self { res, rho, modulus }
    }

    /// Chinese-remainder combination of two results for coprime moduli.
    pub fn combine(&self, other: &ModularResultant) -> ModularResultant {
        let res = crt_step(&self.res, &self.modulus, &other.res, &other.modulus);
        let rho = self
            .rho
            .coeffs()
            .iter()
            .zip(other.rho.coeffs())
            .map(|(a, b)| crt_step(a, &self.modulus, b, &other.modulus))
            .collect();
        ModularResultant {
            res,
            rho: BigIntPolynomial::new(rho),
            modulus: &self.modulus * &other.modulus,
        }
    }
}

/// Given `x mod m` and `r mod p` for coprime `m`, `p`, return `x' mod m*p`
/// congruent to both, in `[0, m*p)`.
pub(crate) fn crt_step(x: &BigInt, m: &BigInt, r: &BigInt, p: &BigInt) -> BigInt {
    let m_inv = m
        .mod_inverse(p)
        .map(|inv| positive_mod(&inv, p))
        .unwrap_or_else(BigInt::zero);
    let t = positive_mod(&((r - x) * m_inv), p);
    positive_mod(&(x + m * t), &(m * p))
}

/// Map `value` from `[0, modulus)` into `(-modulus/2, modulus/2]`.
pub(crate) fn centered(value: &BigInt, modulus: &BigInt) -> BigInt {
    let half: BigInt = modulus / BigInt::from(2);
    let v = positive_mod(value, modulus);
    if v > half { v - modulus } else { v }
}

pub(crate) fn positive_mod(value: &BigInt, modulus: &BigInt) -> BigInt {
    let r = value % modulus;
    if r.is_negative() { r + modulus } else { r }
}

fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let (mut a, mut b) = (a.abs(), b.abs());
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}
