// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::BigInt;
use num_traits::{One, Zero};
use tracing::{debug, trace};

use super::encoding;
use super::{BigIntPolynomial, LongPolynomial2, ModularResultant, Polynomial, Resultant};
use crate::error::{Error, Result};
use crate::util::{invert_mod, pow_mod, resultant_primes, MAX_RESULTANT_PRIME};

/// Below this length Karatsuba falls back to schoolbook multiplication.
const KARATSUBA_THRESHOLD: usize = 32;

/// Moduli above this size are multiplied with 128-bit accumulators.
const WIDE_MODULUS: i64 = 1 << 20;

/// Polynomial with `i32` coefficients in `Z[x]/(x^N - 1)`.
///
/// Index `i` holds the coefficient of `x^i`. The length `N` is fixed at
/// construction; every binary operation checks that both operands agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegerPolynomial {
    coeffs: Vec<i32>,
}

impl IntegerPolynomial {
    pub fn new(coeffs: Vec<i32>) -> Self {
        Self { coeffs }
    }

    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![0; n] }
    }

    /// The multiplicative identity `1` of length `n`.
    pub fn one(n: usize) -> Self {
        let mut coeffs = vec![0; n];
        if let Some(c) = coeffs.first_mut() {
            *c = 1;
        }
        Self { coeffs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[inline]
    pub fn coeffs(&self) -> &[i32] {
        &self.coeffs
    }

    pub fn into_coeffs(self) -> Vec<i32> {
        self.coeffs
    }

    /// Index of the highest non-zero coefficient, 0 for the zero polynomial.
    pub fn degree(&self) -> usize {
        self.coeffs.iter().rposition(|&c| c != 0).unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    pub fn equals_one(&self) -> bool {
        self.coeffs.first() == Some(&1) && self.coeffs[1..].iter().all(|&c| c == 0)
    }

    /// True for the constants `1` and `-1`.
    pub fn equals_abs_one(&self) -> bool {
        matches!(self.coeffs.first(), Some(1) | Some(-1))
            && self.coeffs[1..].iter().all(|&c| c == 0)
    }

    /// Number of coefficients equal to `value`.
    pub fn count(&self, value: i32) -> usize {
        self.coeffs.iter().filter(|&&c| c == value).count()
    }

    /// Sum of the squared coefficients.
    pub fn square_sum(&self) -> BigInt {
        self.coeffs
            .iter()
            .map(|&c| BigInt::from(i64::from(c) * i64::from(c)))
            .fold(BigInt::zero(), |acc, v| acc + v)
    }

    fn widened(&self) -> Vec<i64> {
        self.coeffs.iter().map(|&c| i64::from(c)).collect()
    }

    fn narrowed(values: Vec<i64>) -> Result<Self> {
        let coeffs = values
            .into_iter()
            .map(|v| i32::try_from(v).map_err(|_| Error::ArithmeticOverflow))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { coeffs })
    }

    pub(crate) fn check_modulus(modulus: i32) -> Result<()> {
        if modulus <= 0 {
            return Err(Error::InvalidModulus(i64::from(modulus)));
        }
        Ok(())
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let sum = self.coeffs.iter().zip(&other.coeffs).map(|(&a, &b)| i64::from(a) + i64::from(b));
        Self::narrowed(sum.collect())
    }

    pub fn add_mod(&self, other: &Self, modulus: i32) -> Result<Self> {
        Self::check_modulus(modulus)?;
        Ok(self.add(other)?.mod_positive(modulus))
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let diff =
            self.coeffs.iter().zip(&other.coeffs).map(|(&a, &b)| i64::from(a) - i64::from(b));
        Self::narrowed(diff.collect())
    }

    pub fn sub_mod(&self, other: &Self, modulus: i32) -> Result<Self> {
        Self::check_modulus(modulus)?;
        Ok(self.sub(other)?.mod_positive(modulus))
    }

    pub fn mult_scalar(&self, factor: i32) -> Result<Self> {
        let scaled = self.coeffs.iter().map(|&c| i64::from(c) * i64::from(factor));
        Self::narrowed(scaled.collect())
    }

    /// Double every coefficient and reduce into `[0, modulus)`.
    pub fn mult2_mod(&self, modulus: i32) -> Result<Self> {
        Self::check_modulus(modulus)?;
        let m = i64::from(modulus);
        let coeffs = self.coeffs.iter().map(|&c| (i64::from(c) * 2).rem_euclid(m) as i32).collect();
        Ok(Self { coeffs })
    }

    /// Exact product mod `x^N - 1` without coefficient reduction.
    ///
    /// Fails with [`Error::ArithmeticOverflow`] when a coefficient of the
    /// product leaves the `i32` range.
    pub fn mult(&self, other: &Self) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        let n = self.len();
        let bound = i128::from(self.max_abs()) * i128::from(other.max_abs()) * n as i128;
        if bound <= i128::from(i32::MAX) {
            let full = karatsuba(&self.widened(), &other.widened());
            return Self::narrowed(fold(full, n));
        }
        let mut acc = vec![0i128; n];
        for (i, &ai) in self.coeffs.iter().enumerate() {
            for (j, &bj) in other.coeffs.iter().enumerate() {
                acc[(i + j) % n] += i128::from(ai) * i128::from(bj);
            }
        }
        let coeffs = acc
            .into_iter()
            .map(|v| i32::try_from(v).map_err(|_| Error::ArithmeticOverflow))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { coeffs })
    }

    fn max_abs(&self) -> i64 {
        self.coeffs.iter().map(|&c| i64::from(c).abs()).max().unwrap_or(0)
    }

    /// Product with every coefficient reduced into `[0, modulus)`.
    ///
    /// Congruent to [`mult`](Self::mult) but never overflows: the operands
    /// are reduced before multiplying.
    pub fn mult_mod(&self, other: &Self, modulus: i32) -> Result<Self> {
        Error::check_len(self.len(), other.len())?;
        Self::check_modulus(modulus)?;
        let m = i64::from(modulus);
        let a: Vec<i64> = self.coeffs.iter().map(|&c| i64::from(c).rem_euclid(m)).collect();
        let b: Vec<i64> = other.coeffs.iter().map(|&c| i64::from(c).rem_euclid(m)).collect();
        let n = self.len();

        let coeffs = if m <= WIDE_MODULUS {
            fold(karatsuba(&a, &b), n)
                .into_iter()
                .map(|c| c.rem_euclid(m) as i32)
                .collect()
        } else {
            let mut acc = vec![0i128; n];
            for (i, &ai) in a.iter().enumerate() {
                for (j, &bj) in b.iter().enumerate() {
                    let k = (i + j) % n;
                    acc[k] = (acc[k] + i128::from(ai) * i128::from(bj)) % i128::from(m);
                }
            }
            acc.into_iter().map(|c| c as i32).collect()
        };
        Ok(Self { coeffs })
    }

    /// Reduce every coefficient into `[0, modulus)`.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is not positive.
    pub fn mod_positive(&self, modulus: i32) -> Self {
        assert!(modulus > 0, "modulus must be positive, got {modulus}");
        let coeffs = self.coeffs.iter().map(|&c| c.rem_euclid(modulus)).collect();
        Self { coeffs }
    }

    /// Alias of [`mod_positive`](Self::mod_positive) naming the canonical
    /// non-negative representative.
    pub fn ensure_positive(&self, modulus: i32) -> Self {
        self.mod_positive(modulus)
    }

    /// Reduce every coefficient into `(-modulus/2, modulus/2]`.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is not positive.
    pub fn mod_centered(&self, modulus: i32) -> Self {
        assert!(modulus > 0, "modulus must be positive, got {modulus}");
        let half = modulus / 2;
        let coeffs = self
            .coeffs
            .iter()
            .map(|&c| {
                let r = c.rem_euclid(modulus);
                if r > half { r - modulus } else { r }
            })
            .collect();
        Self { coeffs }
    }

    /// Centered reduction mod 3, leaving coefficients in `{-1, 0, 1}`.
    pub fn mod3(&self) -> Self {
        self.mod_centered(3)
    }

    /// Inverse mod `(x^N - 1, q)` for a power of two `q`.
    ///
    /// Computes an inverse mod 2 and lifts it with Newton iteration. Returns
    /// `Ok(None)` when the polynomial is not invertible; callers draw a new
    /// candidate in that case.
    pub fn invert_fq(&self, q: i32) -> Result<Option<Self>> {
        if q < 2 || q & (q - 1) != 0 {
            return Err(Error::InvalidModulus(i64::from(q)));
        }
        let Some(inverse) = self.almost_inverse(2) else {
            trace!(n = self.len(), "not invertible mod 2");
            return Ok(None);
        };
        let lifted = if q == 2048 {
            self.lift_packed(inverse)?
        } else {
            self.lift(inverse, q)?
        };
        Ok(Some(lifted))
    }

    /// Inverse mod `(x^N - 1, 3)` with coefficients in `[0, 3)`, or `None`.
    pub fn invert_f3(&self) -> Option<Self> {
        self.almost_inverse(3)
    }

    /// Almost-inverse algorithm over GF(p) for `p` in `{2, 3}`.
    ///
    /// Keeps `b * a ≡ x^k * f` and `c * a ≡ x^k * g`, starting from
    /// `f = a`, `g = x^N - 1`, and strips factors of `x` from `f` until it
    /// becomes a non-zero constant.
    fn almost_inverse(&self, p: i32) -> Option<Self> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let mut f: Vec<i32> = self.coeffs.iter().map(|&c| c.rem_euclid(p)).collect();
        f.push(0);
        let mut g = vec![0i32; n + 1];
        g[0] = p - 1;
        g[n] = 1;
        // Cofactors live in the ring itself, so multiplying by x is a rotation.
        let mut b = vec![0i32; n];
        b[0] = 1;
        let mut c = vec![0i32; n];
        let mut k = 0usize;

        loop {
            while f[0] == 0 {
                f.remove(0);
                f.push(0);
                c.rotate_right(1);
                k += 1;
                if f.iter().all(|&v| v == 0) {
                    return None;
                }
            }
            if degree_of(&f) == 0 {
                break;
            }
            if degree_of(&f) < degree_of(&g) {
                std::mem::swap(&mut f, &mut g);
                std::mem::swap(&mut b, &mut c);
            }
            let u = f[0] * (invert_mod(i64::from(g[0]), i64::from(p)) as i32) % p;
            for (fi, gi) in f.iter_mut().zip(&g) {
                *fi = (*fi - u * gi).rem_euclid(p);
            }
            for (bi, ci) in b.iter_mut().zip(&c) {
                *bi = (*bi - u * ci).rem_euclid(p);
            }
        }

        // a^-1 = f0^-1 * x^-k * b
        let f0_inv = invert_mod(i64::from(f[0]), i64::from(p)) as i32;
        let shift = n - k % n;
        let mut out = vec![0i32; n];
        for (i, &bi) in b.iter().enumerate() {
            out[(i + shift) % n] = bi * f0_inv % p;
        }
        Some(Self { coeffs: out })
    }

    /// Newton lifting `F <- F * (2 - a * F)` from mod 2 up to mod `q`.
    fn lift(&self, mut inverse: Self, q: i32) -> Result<Self> {
        let n = self.len();
        let two = Self::one(n).mult_scalar(2)?;
        let mut v = 2i32;
        while v < q {
            v = v.saturating_mul(v).min(q);
            let af = self.mult_mod(&inverse, v)?;
            let correction = two.sub_mod(&af, v)?;
            inverse = inverse.mult_mod(&correction, v)?;
        }
        Ok(inverse)
    }

    /// Newton lifting to 2048 on packed coefficients.
    fn lift_packed(&self, inverse: Self) -> Result<Self> {
        let a = LongPolynomial2::from_integer(&self.mod_positive(2048));
        let mut f = LongPolynomial2::from_integer(&inverse);
        let mut v = 2u32;
        while v < 2048 {
            v *= 2;
            let mut doubled = f.clone();
            doubled.mult2_and(v - 1);
            let square = a.mult(&f)?.mult(&f)?;
            doubled.sub_and(&square, v - 1)?;
            f = doubled;
        }
        Ok(f.to_integer_polynomial())
    }

    /// Resultant of `x^N - 1` and this polynomial, with its cofactor.
    ///
    /// Combines [`resultant_mod`](Self::resultant_mod) over primes below
    /// `sqrt(2^31)` by CRT until the product of primes exceeds twice the
    /// Hadamard bound `||a||^N`. The returned `rho` satisfies
    /// `rho * a ≡ res (mod x^N - 1)` exactly, and is zero when `res` is.
    pub fn resultant(&self) -> Result<Resultant> {
        let n = self.len();
        if n == 0 {
            return Err(Error::LengthMismatch { expected: 1, actual: 0 });
        }
        let square_sum = self.square_sum();
        if square_sum.is_zero() {
            return Ok(Resultant::new(BigInt::zero(), BigIntPolynomial::zero(n)));
        }
        let target = num_traits::pow(square_sum, n.div_ceil(2)) * BigInt::from(2) + BigInt::one();

        let mut res = BigInt::zero();
        let mut res_modulus = BigInt::one();
        let mut rho_acc: Option<ModularResultant> = None;
        let mut used = 0usize;

        for &p in resultant_primes() {
            let modular = self.resultant_mod_unchecked(p);
            let prime = BigInt::from(p);
            res = super::resultant::crt_step(&res, &res_modulus, &modular.res, &prime);
            res_modulus *= &prime;
            used += 1;

            if !modular.res.is_zero() {
                rho_acc = Some(match rho_acc {
                    None => modular,
                    Some(acc) => acc.combine(&modular),
                });
            }

            if res_modulus > target {
                if res.is_zero() {
                    debug!(n, primes = used, "resultant is zero");
                    return Ok(Resultant::new(BigInt::zero(), BigIntPolynomial::zero(n)));
                }
                if let Some(acc) = rho_acc.as_ref().filter(|acc| acc.modulus > target) {
                    debug!(n, primes = used, "resultant reconstructed");
                    let res = super::resultant::centered(&res, &res_modulus);
                    return Ok(Resultant::new(res, acc.rho.centered(&acc.modulus)));
                }
            }
        }
        Err(Error::ArithmeticOverflow)
    }

    /// Resultant and cofactor reduced mod a prime `p` with `2 <= p <= 46337`.
    ///
    /// The bound keeps every product of two residues below `2^31`; larger
    /// primes are rejected with [`Error::InvalidModulus`].
    pub fn resultant_mod(&self, p: i32) -> Result<ModularResultant> {
        let p = i64::from(p);
        if !(2..=MAX_RESULTANT_PRIME).contains(&p) {
            return Err(Error::InvalidModulus(p));
        }
        if self.is_empty() {
            return Err(Error::LengthMismatch { expected: 1, actual: 0 });
        }
        Ok(self.resultant_mod_unchecked(p))
    }

    /// Euclidean remainder sequence of `x^N - 1` and `a` over GF(p), tracking
    /// the cofactor of `a` and the resultant's leading-coefficient powers.
    fn resultant_mod_unchecked(&self, p: i64) -> ModularResultant {
        let n = self.len();
        let size = n + 1;
        let mut a = vec![0i64; size];
        a[0] = p - 1;
        a[n] = 1;
        let mut b: Vec<i64> = self.coeffs.iter().map(|&c| i64::from(c).rem_euclid(p)).collect();
        b.push(0);
        let mut v1 = vec![0i64; size];
        let mut v2 = vec![0i64; size];
        v2[0] = 1;

        let mut da = n;
        let mut db = degree_of(&b);
        let mut ta = da;
        let mut r = 1i64;

        while db > 0 {
            let c = invert_mod(b[db], p) * a[da] % p;
            mult_shift_sub(&mut a, &b, c, da - db, p);
            mult_shift_sub(&mut v1, &v2, c, da - db, p);
            da = degree_of(&a);
            if da < db {
                r = r * pow_mod(b[db], (ta - da) as u64, p) % p;
                if ta % 2 == 1 && db % 2 == 1 {
                    r = (p - r) % p;
                }
                std::mem::swap(&mut a, &mut b);
                std::mem::swap(&mut v1, &mut v2);
                ta = db;
                std::mem::swap(&mut da, &mut db);
            }
        }
        r = r * pow_mod(b[0], da as u64, p) % p;

        let scale = invert_mod(b[0], p) * r % p;
        v2[0] = (v2[0] + v2[n]) % p;
        let rho: Vec<BigInt> = v2[..n].iter().map(|&v| BigInt::from(v * scale % p)).collect();
        ModularResultant::new(BigInt::from(r), BigIntPolynomial::new(rho), BigInt::from(p))
    }

    /// Pack coefficients mod `q` at `bit_length(q - 1)` bits each.
    pub fn to_binary(&self, q: i32) -> Result<Vec<u8>> {
        Self::check_modulus(q)?;
        encoding::encode_mod_q(&self.mod_positive(q).coeffs, q as u32)
    }

    pub fn from_binary(data: &[u8], n: usize, q: i32) -> Result<Self> {
        Self::check_modulus(q)?;
        Ok(Self::new(encoding::decode_mod_q(data, n, q as u32)?))
    }

    /// Encode the centered mod-3 reduction, 3 bits per coefficient pair.
    ///
    /// Fails when a pair reduces to `(-1, -1)`.
    pub fn to_binary3_sves(&self) -> Result<Vec<u8>> {
        encoding::encode_mod3_sves(&self.mod3().coeffs)
    }

    pub fn from_binary3_sves(data: &[u8], n: usize) -> Result<Self> {
        Ok(Self::new(encoding::decode_mod3_sves(data, n)?))
    }

    /// Encode the centered mod-3 reduction as one base-3 integer.
    pub fn to_binary3_tight(&self) -> Result<Vec<u8>> {
        encoding::encode_mod3_tight(&self.mod3().coeffs)
    }

    pub fn from_binary3_tight(data: &[u8], n: usize) -> Result<Self> {
        Ok(Self::new(encoding::decode_mod3_tight(data, n)?))
    }
}

impl From<Vec<i32>> for IntegerPolynomial {
    fn from(coeffs: Vec<i32>) -> Self {
        Self::new(coeffs)
    }
}

impl Polynomial for IntegerPolynomial {
    fn len(&self) -> usize {
        self.coeffs.len()
    }

    fn mult(&self, other: &IntegerPolynomial) -> Result<IntegerPolynomial> {
        IntegerPolynomial::mult(self, other)
    }

    fn mult_mod(&self, other: &IntegerPolynomial, modulus: i32) -> Result<IntegerPolynomial> {
        IntegerPolynomial::mult_mod(self, other, modulus)
    }

    fn mult_big(&self, other: &BigIntPolynomial) -> Result<BigIntPolynomial> {
        BigIntPolynomial::from(self).mult(other)
    }

    fn to_integer_polynomial(&self) -> IntegerPolynomial {
        self.clone()
    }
}

fn degree_of<T: Copy + Default + PartialEq>(coeffs: &[T]) -> usize {
    coeffs.iter().rposition(|&c| c != T::default()).unwrap_or(0)
}

/// `target -= c * x^k * src (mod p)`, truncated to `target`'s length.
fn mult_shift_sub(target: &mut [i64], src: &[i64], c: i64, k: usize, p: i64) {
    for i in k..target.len() {
        target[i] = (target[i] - src[i - k] * c).rem_euclid(p);
    }
}

/// Fold a linear product of length `2n - 1` onto `n` coefficients.
pub(crate) fn fold(full: Vec<i64>, n: usize) -> Vec<i64> {
    let mut out = vec![0i64; n];
    for (i, v) in full.into_iter().enumerate() {
        out[i % n] += v;
    }
    out
}

/// Linear product of two equal-length coefficient vectors.
///
/// Arithmetic wraps: the result is exact whenever every output coefficient
/// fits in an `i64`, whatever the size of the intermediate sums.
pub(crate) fn karatsuba(a: &[i64], b: &[i64]) -> Vec<i64> {
    let n = a.len();
    if n == 0 {
        return Vec::new();
    }
    if n <= KARATSUBA_THRESHOLD {
        let mut c = vec![0i64; 2 * n - 1];
        for (i, &ai) in a.iter().enumerate() {
            if ai == 0 {
                continue;
            }
            for (j, &bj) in b.iter().enumerate() {
                c[i + j] = c[i + j].wrapping_add(ai.wrapping_mul(bj));
            }
        }
        return c;
    }

    let half = n / 2;
    let (a1, a2) = a.split_at(half);
    let (b1, b2) = b.split_at(half);
    let mut sa = a2.to_vec();
    let mut sb = b2.to_vec();
    for i in 0..half {
        sa[i] = sa[i].wrapping_add(a1[i]);
        sb[i] = sb[i].wrapping_add(b1[i]);
    }

    let low = karatsuba(a1, b1);
    let high = karatsuba(a2, b2);
    let mut mid = karatsuba(&sa, &sb);
    for (i, v) in low.iter().enumerate() {
        mid[i] = mid[i].wrapping_sub(*v);
    }
    for (i, v) in high.iter().enumerate() {
        mid[i] = mid[i].wrapping_sub(*v);
    }

    let mut c = vec![0i64; 2 * n - 1];
    for (i, v) in low.into_iter().enumerate() {
        c[i] = c[i].wrapping_add(v);
    }
    for (i, v) in mid.into_iter().enumerate() {
        c[i + half] = c[i + half].wrapping_add(v);
    }
    for (i, v) in high.into_iter().enumerate() {
        c[i + 2 * half] = c[i + 2 * half].wrapping_add(v);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Signed;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tutorial() -> IntegerPolynomial {
        IntegerPolynomial::new(vec![-1, 1, 1, 0, -1, 0, 1, 0, 0, 1, -1])
    }

    fn random_poly(rng: &mut StdRng, n: usize, range: std::ops::Range<i32>) -> IntegerPolynomial {
        IntegerPolynomial::new((0..n).map(|_| rng.random_range(range.clone())).collect())
    }

    fn naive(a: &IntegerPolynomial, b: &IntegerPolynomial) -> Vec<i64> {
        let n = a.len();
        let mut c = vec![0i64; n];
        for i in 0..n {
            for j in 0..n {
                c[(i + j) % n] += i64::from(a.coeffs()[i]) * i64::from(b.coeffs()[j]);
            }
        }
        c
    }

    #[test]
    fn invert_fq_tutorial() {
        let a = tutorial();
        let inverse = a.invert_fq(32).unwrap().unwrap();
        assert_eq!(inverse.coeffs(), &[5, 9, 6, 16, 4, 15, 16, 22, 20, 18, 30]);
        assert!(a.mult_mod(&inverse, 32).unwrap().equals_one());
    }

    #[test]
    fn invert_f3_tutorial() {
        let a = tutorial();
        let inverse = a.invert_f3().unwrap();
        assert_eq!(inverse.coeffs(), &[1, 2, 0, 2, 2, 1, 0, 2, 1, 2, 0]);
        assert!(a.mult_mod(&inverse, 3).unwrap().equals_one());
    }

    #[test]
    fn invert_rejects_bad_modulus() {
        assert!(matches!(tutorial().invert_fq(30), Err(Error::InvalidModulus(30))));
        assert!(tutorial().invert_fq(0).is_err());
    }

    #[test]
    fn non_invertible_returns_none() {
        // 1 - x vanishes at x = 1, a root of x^N - 1 over every field.
        let mut coeffs = vec![0; 11];
        coeffs[0] = 1;
        coeffs[1] = -1;
        let a = IntegerPolynomial::new(coeffs);
        assert_eq!(a.invert_fq(2048).unwrap(), None);
        assert_eq!(a.invert_f3(), None);
        assert_eq!(IntegerPolynomial::zero(11).invert_f3(), None);
    }

    #[test]
    fn inversion_of_random_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut found_q = 0;
        let mut found_3 = 0;
        for _ in 0..30 {
            let a = random_poly(&mut rng, 107, -1..2);
            if let Some(fq) = a.invert_fq(2048).unwrap() {
                assert!(a.mult_mod(&fq, 2048).unwrap().equals_one());
                found_q += 1;
            }
            if let Some(fq) = a.invert_fq(256).unwrap() {
                assert!(a.mult_mod(&fq, 256).unwrap().ensure_positive(256).equals_one());
            }
            if let Some(f3) = a.invert_f3() {
                assert!(a.mult_mod(&f3, 3).unwrap().equals_one());
                found_3 += 1;
            }
        }
        assert!(found_q > 0 && found_3 > 0);
    }

    #[test]
    fn karatsuba_matches_schoolbook() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [1, 2, 31, 32, 33, 100, 439] {
            let a = random_poly(&mut rng, n, -2048..2048);
            let b = random_poly(&mut rng, n, -2048..2048);
            let product = a.mult(&b).unwrap();
            let expected: Vec<i32> = naive(&a, &b).into_iter().map(|c| c as i32).collect();
            assert_eq!(product.coeffs(), expected.as_slice());
        }
    }

    #[test]
    fn mult_rejects_mismatched_lengths() {
        let a = IntegerPolynomial::zero(5);
        let b = IntegerPolynomial::zero(6);
        assert_eq!(a.mult(&b), Err(Error::LengthMismatch { expected: 5, actual: 6 }));
        assert!(a.mult_mod(&b, 7).is_err());
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn mult_reports_overflow() {
        let a = IntegerPolynomial::new(vec![i32::MAX, 1]);
        assert_eq!(a.mult(&a), Err(Error::ArithmeticOverflow));
        assert!(a.mult_mod(&a, 2048).is_ok());
    }

    #[test]
    fn wide_modulus_path() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_poly(&mut rng, 40, -1000..1000);
        let b = random_poly(&mut rng, 40, -1000..1000);
        let m = 2_000_003;
        assert_eq!(a.mult_mod(&b, m).unwrap(), a.mult(&b).unwrap().mod_positive(m));
    }

    #[test]
    fn reductions() {
        let a = IntegerPolynomial::new(vec![-17, 16, 17, -16, 0, 33]);
        assert_eq!(a.mod_positive(32).coeffs(), &[15, 16, 17, 16, 0, 1]);
        assert_eq!(a.mod_centered(32).coeffs(), &[15, 16, -15, 16, 0, 1]);
        assert_eq!(IntegerPolynomial::new(vec![2, -2, 4, 3]).mod3().coeffs(), &[-1, 1, 1, 0]);
        assert_eq!(a.mult2_mod(32).unwrap().coeffs(), &[30, 0, 2, 0, 0, 2]);
    }

    #[test]
    #[should_panic(expected = "modulus must be positive")]
    fn mod_positive_rejects_negative_modulus() {
        IntegerPolynomial::new(vec![5, -5]).mod_positive(-3);
    }

    #[test]
    #[should_panic(expected = "modulus must be positive")]
    fn mod_centered_rejects_zero_modulus() {
        IntegerPolynomial::new(vec![5, -5]).mod_centered(0);
    }

    #[test]
    fn modular_ops_report_bad_modulus() {
        let a = IntegerPolynomial::new(vec![5, -5]);
        assert!(matches!(a.add_mod(&a, -3), Err(Error::InvalidModulus(-3))));
        assert!(matches!(a.mult_mod(&a, 0), Err(Error::InvalidModulus(0))));
        assert!(matches!(a.to_binary(-1), Err(Error::InvalidModulus(-1))));
    }

    #[test]
    fn resultant_relation() {
        let a = tutorial();
        let r = a.resultant().unwrap();
        assert!(!r.res.is_zero());
        let product = BigIntPolynomial::from(&a).mult(&r.rho).unwrap();
        let coeffs = product.coeffs();
        assert_eq!(coeffs[0], r.res);
        assert!(coeffs[1..].iter().all(|c| c.is_zero()));
    }

    #[test]
    fn resultant_of_random_polynomials() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let a = random_poly(&mut rng, 53, -3..4);
            let r = a.resultant().unwrap();
            let product = BigIntPolynomial::from(&a).mult(&r.rho).unwrap();
            let coeffs = product.coeffs();
            assert_eq!(coeffs[0], r.res);
            assert!(coeffs[1..].iter().all(|c| c.is_zero()));
        }
    }

    #[test]
    fn resultant_of_reducible_polynomial_is_zero() {
        // Every coefficient 1: divisible by 1 + x + ... + x^(N-1).
        let a = IntegerPolynomial::new(vec![1; 9]);
        let r = a.resultant().unwrap();
        assert!(r.res.is_zero());
        assert!(r.rho.coeffs().iter().all(|c| c.is_zero()));
    }

    #[test]
    fn resultant_of_constant() {
        let a = IntegerPolynomial::new(vec![3, 0, 0, 0]);
        let r = a.resultant().unwrap();
        assert_eq!(r.res.abs(), BigInt::from(81));
    }

    #[test]
    fn modular_resultant_agrees() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = random_poly(&mut rng, 37, -5..6);
        let r = a.resultant().unwrap();
        for p in [2, 3, 7, 10_007, 46_337] {
            let m = a.resultant_mod(p).unwrap();
            let prime = BigInt::from(p);
            let expected = ((&r.res % &prime) + &prime) % &prime;
            assert_eq!(m.res, expected, "p = {p}");
        }
    }

    #[test]
    fn modular_resultant_rejects_large_primes() {
        assert_eq!(tutorial().resultant_mod(46_349), Err(Error::InvalidModulus(46_349)));
        assert!(tutorial().resultant_mod(1).is_err());
    }

    #[test]
    fn binary_rejects_wrong_length() {
        let a = tutorial().mod_positive(2048);
        let mut data = a.to_binary(2048).unwrap();
        data.push(0);
        assert!(IntegerPolynomial::from_binary(&data, 11, 2048).is_err());
        data.truncate(data.len() - 2);
        assert!(IntegerPolynomial::from_binary(&data, 11, 2048).is_err());
    }

    #[test]
    fn ternary_encodings() {
        let a = tutorial();
        let tight = a.to_binary3_tight().unwrap();
        assert_eq!(IntegerPolynomial::from_binary3_tight(&tight, 11).unwrap(), a);
        // (-1, 1) ... no (-1, -1) pair at even offsets.
        let sves = a.to_binary3_sves().unwrap();
        assert_eq!(IntegerPolynomial::from_binary3_sves(&sves, 11).unwrap(), a);
    }

    proptest! {
        #[test]
        fn mult_mod_equivalence(
            a in prop::collection::vec(-2048i32..2048, 1..80),
            seed in any::<u64>(),
            m in prop::sample::select(vec![2, 3, 32, 2048, 65_536]),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let b = random_poly(&mut rng, a.len(), -2048..2048);
            let a = IntegerPolynomial::new(a);
            prop_assert_eq!(a.mult_mod(&b, m).unwrap(), a.mult(&b).unwrap().mod_positive(m));
        }

        #[test]
        fn binary_roundtrip(
            coeffs in prop::collection::vec(0i32..2048, 1..300),
            q in prop::sample::select(vec![256, 1000, 2048]),
        ) {
            let p = IntegerPolynomial::new(coeffs).mod_positive(q);
            let data = p.to_binary(q).unwrap();
            prop_assert_eq!(IntegerPolynomial::from_binary(&data, p.len(), q).unwrap(), p);
        }

        #[test]
        fn tight_roundtrip(coeffs in prop::collection::vec(-1i32..2, 1..200)) {
            let p = IntegerPolynomial::new(coeffs);
            let data = p.to_binary3_tight().unwrap();
            prop_assert_eq!(IntegerPolynomial::from_binary3_tight(&data, p.len()).unwrap(), p);
        }
    }
}
