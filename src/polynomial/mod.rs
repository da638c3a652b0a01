// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polynomial arithmetic in `Z[x]/(x^N - 1)`.
//!
//! All representations share one ring-arithmetic contract through the
//! [`Polynomial`] trait; they differ only in cost and precision:
//!
//! | Type                        | Coefficients            | Used for                        |
//! |-----------------------------|-------------------------|---------------------------------|
//! | [`IntegerPolynomial`]       | `i32`                   | general arithmetic, inversion   |
//! | [`BigIntPolynomial`]        | arbitrary precision     | exact products, resultants      |
//! | [`BigDecimalPolynomial`]    | fixed-point decimals    | rational cross-checks           |
//! | [`DenseTernaryPolynomial`]  | `{-1, 0, 1}`            | ternary secrets, packed mult    |
//! | [`SparseTernaryPolynomial`] | `{-1, 0, 1}` by index   | low-weight secrets              |
//! | [`ProductFormPolynomial`]   | `f1 * f2 + f3`          | fast private-key multiplication |
//! | [`LongPolynomial2`]         | 2 x 11 bits per word    | lifting inverses mod 2048       |
//! | [`LongPolynomial5`]         | 5 x 12 bits per word    | ternary products mod 2048       |
//!
//! Conversions between representations are always explicit.

mod big_decimal;
mod big_int;
mod dense;
pub mod encoding;
mod integer;
mod long2;
mod long5;
mod product_form;
mod resultant;
mod sparse;

pub use big_decimal::{BigDecimalPolynomial, Decimal};
pub use big_int::BigIntPolynomial;
pub use dense::DenseTernaryPolynomial;
pub use integer::IntegerPolynomial;
pub use long2::LongPolynomial2;
pub use long5::LongPolynomial5;
pub use product_form::ProductFormPolynomial;
pub use resultant::{ModularResultant, Resultant};
pub use sparse::SparseTernaryPolynomial;

use crate::error::Result;

/// Ring element of `Z[x]/(x^N - 1)` that can multiply an [`IntegerPolynomial`].
pub trait Polynomial {
    /// Ring dimension `N`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact product mod `x^N - 1`, without coefficient reduction.
    fn mult(&self, other: &IntegerPolynomial) -> Result<IntegerPolynomial>;

    /// Product with every coefficient reduced into `[0, modulus)`.
    ///
    /// `other` is reduced first, so any `i32` coefficients are accepted.
    fn mult_mod(&self, other: &IntegerPolynomial, modulus: i32) -> Result<IntegerPolynomial> {
        IntegerPolynomial::check_modulus(modulus)?;
        Ok(self.mult(&other.mod_positive(modulus))?.mod_positive(modulus))
    }

    /// Exact product with an arbitrary-precision polynomial.
    fn mult_big(&self, other: &BigIntPolynomial) -> Result<BigIntPolynomial>;

    fn to_integer_polynomial(&self) -> IntegerPolynomial;
}

/// A polynomial whose coefficients are all in `{-1, 0, 1}`.
pub trait TernaryPolynomial: Polynomial {
    /// Sorted indices of the `+1` coefficients.
    fn ones(&self) -> &[usize];

    /// Sorted indices of the `-1` coefficients.
    fn neg_ones(&self) -> &[usize];
}

/// Multiply an integer polynomial by a ternary one given by its index sets.
///
/// Runs in `O(N * weight)`; `b` has length `n`.
pub(crate) fn mult_by_indices(
    n: usize,
    ones: &[usize],
    neg_ones: &[usize],
    b: &[i64],
) -> Vec<i64> {
    let mut c = vec![0i64; n];
    for &i in ones {
        for (j, &bj) in b.iter().enumerate() {
            let k = (i + j) % n;
            c[k] += bj;
        }
    }
    for &i in neg_ones {
        for (j, &bj) in b.iter().enumerate() {
            let k = (i + j) % n;
            c[k] -= bj;
        }
    }
    c
}

/// Pick `ones + neg_ones` distinct positions out of `n` at random.
pub(crate) fn random_ternary_indices<R: rand::Rng + ?Sized>(
    n: usize,
    ones: usize,
    neg_ones: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if ones + neg_ones > n {
        return Err(crate::Error::InvalidTernaryWeight { n, ones, neg_ones });
    }
    let picked = rand::seq::index::sample(rng, n, ones + neg_ones).into_vec();
    let mut pos = picked[..ones].to_vec();
    let mut neg = picked[ones..].to_vec();
    pos.sort_unstable();
    neg.sort_unstable();
    Ok((pos, neg))
}
