// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NTRU private-polynomial search.
//!
//! A private polynomial has the form `f = 1 + 3 * F` with `F` in product
//! form, so `f` is always invertible mod 3 with inverse 1. Only its inverse
//! mod `q` has to be found, and candidates without one are discarded.

use num_bigint_dig::BigInt;
use rand::Rng;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::polynomial::{IntegerPolynomial, Polynomial, ProductFormPolynomial};

/// Shape of a product-form ternary private polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TernaryParameters {
    pub n: usize,
    pub q: i32,
    pub df1: usize,
    pub df2: usize,
    pub df3: usize,
}

impl TernaryParameters {
    /// 128-bit security, product-form, optimised for speed.
    pub const APR2011_439_FAST: Self = Self { n: 439, q: 2048, df1: 9, df2: 8, df3: 5 };

    /// 256-bit security, product-form, optimised for speed.
    pub const APR2011_743_FAST: Self = Self { n: 743, q: 2048, df1: 11, df2: 11, df3: 15 };

    /// Tiny ring for tests and worked examples. Offers no security.
    pub const TOY_11: Self = Self { n: 11, q: 32, df1: 1, df2: 1, df3: 1 };

    /// Validate a custom parameter set.
    ///
    /// `q` must be a power of two of at least 4, and every factor must fit in
    /// the ring.
    pub fn new(n: usize, q: i32, df1: usize, df2: usize, df3: usize) -> Result<Self> {
        if q < 4 || q & (q - 1) != 0 {
            return Err(Error::InvalidModulus(i64::from(q)));
        }
        for d in [df1, df2, df3] {
            if 2 * d > n {
                return Err(Error::InvalidTernaryWeight { n, ones: d, neg_ones: d });
            }
        }
        Ok(Self { n, q, df1, df2, df3 })
    }
}

/// A private polynomial together with its inverse mod `q`.
#[allow(missing_debug_implementations)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct InvertibleCandidate {
    t: ProductFormPolynomial,
    f: IntegerPolynomial,
    fq: IntegerPolynomial,
}

impl InvertibleCandidate {
    /// The product-form factor `F`.
    pub fn product_form(&self) -> &ProductFormPolynomial {
        &self.t
    }

    /// The expanded private polynomial `f = 1 + 3 * F`.
    pub fn f(&self) -> &IntegerPolynomial {
        &self.f
    }

    /// `f^-1 mod q`, coefficients in `[0, q)`.
    pub fn fq(&self) -> &IntegerPolynomial {
        &self.fq
    }
}

/// Draw `f = 1 + 3 * F` until one is invertible mod `q`.
///
/// Gives up with [`Error::RetriesExhausted`] after `max_attempts` candidates.
pub fn generate_invertible<R: Rng + ?Sized>(
    params: &TernaryParameters,
    rng: &mut R,
    max_attempts: usize,
) -> Result<InvertibleCandidate> {
    for attempt in 1..=max_attempts {
        let t = ProductFormPolynomial::generate_random(
            params.n,
            params.df1,
            params.df2,
            params.df3,
            params.df3,
            rng,
        )?;
        let f = t.to_integer_polynomial().mult_scalar(3)?.add(&IntegerPolynomial::one(params.n))?;
        match f.invert_fq(params.q)? {
            Some(fq) => {
                debug!(n = params.n, q = params.q, attempt, "found invertible private polynomial");
                return Ok(InvertibleCandidate { t, f, fq });
            }
            None => trace!(attempt, "candidate not invertible mod q, retrying"),
        }
    }
    Err(Error::RetriesExhausted(max_attempts))
}

/// Invertibility mod `(x^N - 1, modulus)` decided through the resultant.
///
/// Slower than attempting the inversion but works for any modulus.
pub fn is_invertible_by_resultant(a: &IntegerPolynomial, modulus: &BigInt) -> Result<bool> {
    Ok(a.resultant()?.is_unit_mod(modulus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn presets_validate() {
        for p in [
            TernaryParameters::APR2011_439_FAST,
            TernaryParameters::APR2011_743_FAST,
            TernaryParameters::TOY_11,
        ] {
            assert_eq!(TernaryParameters::new(p.n, p.q, p.df1, p.df2, p.df3).unwrap(), p);
        }
        assert!(TernaryParameters::new(11, 30, 1, 1, 1).is_err());
        assert!(TernaryParameters::new(11, 32, 6, 1, 1).is_err());
    }

    #[test]
    fn toy_candidate_is_invertible() {
        let mut rng = StdRng::seed_from_u64(41);
        let params = TernaryParameters::TOY_11;
        let key = generate_invertible(&params, &mut rng, 100).unwrap();
        assert!(key.f().mult_mod(key.fq(), params.q).unwrap().equals_one());
        assert!(key.f().mod_positive(3).equals_one());
        assert!(is_invertible_by_resultant(key.f(), &BigInt::from(params.q)).unwrap());
    }

    #[test]
    fn fast_parameter_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = TernaryParameters::APR2011_439_FAST;
        let key = generate_invertible(&params, &mut rng, 50).unwrap();
        assert!(key.f().mult_mod(key.fq(), params.q).unwrap().equals_one());
        assert_eq!(key.product_form().to_integer_polynomial().mult_scalar(3).unwrap().len(), 439);
    }

    #[test]
    fn zero_attempts_give_up() {
        let mut rng = StdRng::seed_from_u64(43);
        let err = generate_invertible(&TernaryParameters::TOY_11, &mut rng, 0).err();
        assert_eq!(err, Some(Error::RetriesExhausted(0)));
    }

    #[test]
    fn resultant_invertibility_agrees_with_inversion() {
        let mut rng = StdRng::seed_from_u64(44);
        for _ in 0..10 {
            let coeffs = (0..23).map(|_| rng.random_range(-1..2)).collect();
            let a = IntegerPolynomial::new(coeffs);
            let by_resultant = is_invertible_by_resultant(&a, &BigInt::from(3)).unwrap();
            assert_eq!(by_resultant, a.invert_f3().is_some());
        }
    }
}
