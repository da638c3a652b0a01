// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bit-packing schemes for polynomial coefficients.
//!
//! Every scheme writes bits MSB first and fills bytes from their high bit
//! down. Unused bits of the final byte are zero on encode and ignored on
//! decode. Decoders reject inputs whose length differs from the exact packed
//! size for the requested shape.

use num_bigint_dig::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::util::bit_length;

/// Coefficient pairs addressed by their 3-bit sves code. `(-1, -1)` has no code.
const SVES_PAIRS: [(i32, i32); 8] =
    [(0, 0), (0, 1), (0, -1), (1, 0), (1, 1), (1, -1), (-1, 0), (-1, 1)];

pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit: usize,
}

impl BitWriter {
    pub(crate) fn with_bits(num_bits: usize) -> Self {
        Self { bytes: vec![0u8; num_bits.div_ceil(8)], bit: 0 }
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub(crate) fn write(&mut self, value: u32, width: u32) {
        for j in (0..width).rev() {
            if (value >> j) & 1 == 1 {
                self.bytes[self.bit / 8] |= 0x80 >> (self.bit % 8);
            }
            self.bit += 1;
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit: 0 }
    }

    pub(crate) fn read(&mut self, width: u32) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..width {
            let byte = self
                .bytes
                .get(self.bit / 8)
                .ok_or_else(|| Error::malformed("bit stream truncated"))?;
            let b = (byte >> (7 - self.bit % 8)) & 1;
            value = (value << 1) | u32::from(b);
            self.bit += 1;
        }
        Ok(value)
    }
}

fn expect_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(Error::malformed(format!(
            "expected {expected} bytes, got {}",
            data.len()
        )));
    }
    Ok(())
}

/// Bits per coefficient for values in `[0, q)`.
pub fn bits_per_coeff(q: u32) -> u32 {
    bit_length(u64::from(q.saturating_sub(1))).max(1)
}

/// Packed size in bytes of `n` coefficients mod `q`.
pub fn mod_q_len(n: usize, q: u32) -> usize {
    (n * bits_per_coeff(q) as usize).div_ceil(8)
}

/// Pack values already reduced into `[0, q)`.
pub fn encode_mod_q(values: &[i32], q: u32) -> Result<Vec<u8>> {
    let width = bits_per_coeff(q);
    let mut writer = BitWriter::with_bits(values.len() * width as usize);
    for &v in values {
        if v < 0 || v as u32 >= q {
            return Err(Error::malformed(format!("coefficient {v} outside [0, {q})")));
        }
        writer.write(v as u32, width);
    }
    Ok(writer.finish())
}

pub fn decode_mod_q(data: &[u8], n: usize, q: u32) -> Result<Vec<i32>> {
    expect_len(data, mod_q_len(n, q))?;
    let width = bits_per_coeff(q);
    let mut reader = BitReader::new(data);
    let mut coeffs = Vec::with_capacity(n);
    for _ in 0..n {
        let v = reader.read(width)?;
        if v >= q {
            return Err(Error::malformed(format!("decoded value {v} outside [0, {q})")));
        }
        coeffs.push(v as i32);
    }
    Ok(coeffs)
}

/// Packed size in bytes of `n` ternary coefficients in sves form.
pub fn mod3_sves_len(n: usize) -> usize {
    (n.div_ceil(2) * 3).div_ceil(8)
}

/// Pack ternary coefficients two at a time into 3-bit codes.
///
/// Fails on a `(-1, -1)` pair, which the code table cannot express.
pub fn encode_mod3_sves(values: &[i32]) -> Result<Vec<u8>> {
    let mut writer = BitWriter::with_bits(values.len().div_ceil(2) * 3);
    for pair in values.chunks(2) {
        let c1 = pair[0];
        let c2 = pair.get(1).copied().unwrap_or(0);
        let code = SVES_PAIRS
            .iter()
            .position(|&p| p == (c1, c2))
            .ok_or_else(|| Error::malformed(format!("pair ({c1}, {c2}) has no sves code")))?;
        writer.write(code as u32, 3);
    }
    Ok(writer.finish())
}

pub fn decode_mod3_sves(data: &[u8], n: usize) -> Result<Vec<i32>> {
    expect_len(data, mod3_sves_len(n))?;
    let mut reader = BitReader::new(data);
    let mut coeffs = Vec::with_capacity(n + 1);
    while coeffs.len() < n {
        let (c1, c2) = SVES_PAIRS[reader.read(3)? as usize];
        coeffs.push(c1);
        coeffs.push(c2);
    }
    if coeffs.len() > n && coeffs.pop() != Some(0) {
        return Err(Error::malformed("non-zero padding coefficient"));
    }
    Ok(coeffs)
}

/// Packed size in bytes of `n` ternary coefficients in tight form.
pub fn mod3_tight_len(n: usize) -> usize {
    let bound = num_traits::pow(BigUint::from(3u32), n);
    bound.bits().div_ceil(8)
}

/// Interpret coefficients as base-3 digits `c_i + 1`, least significant first.
pub fn encode_mod3_tight(values: &[i32]) -> Result<Vec<u8>> {
    let three = BigUint::from(3u32);
    let mut sum = BigUint::zero();
    for &c in values.iter().rev() {
        if !(-1..=1).contains(&c) {
            return Err(Error::malformed(format!("coefficient {c} is not ternary")));
        }
        sum = sum * &three + BigUint::from((c + 1) as u32);
    }
    let size = mod3_tight_len(values.len());
    let raw = if sum.is_zero() { Vec::new() } else { sum.to_bytes_be() };
    let mut out = vec![0u8; size - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

pub fn decode_mod3_tight(data: &[u8], n: usize) -> Result<Vec<i32>> {
    expect_len(data, mod3_tight_len(n))?;
    let three = BigUint::from(3u32);
    let mut sum = BigUint::from_bytes_be(data);
    if sum >= num_traits::pow(three.clone(), n) {
        return Err(Error::malformed("value exceeds 3^N"));
    }
    let mut coeffs = Vec::with_capacity(n);
    for _ in 0..n {
        let digit = (&sum % &three).to_i32().ok_or(Error::ArithmeticOverflow)?;
        coeffs.push(digit - 1);
        sum /= &three;
    }
    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod_q_is_msb_first() {
        // 11 bits per coefficient: 0x7FF then 0x001.
        let data = encode_mod_q(&[2047, 1], 2048).unwrap();
        assert_eq!(data, vec![0xFF, 0xE0, 0x04]);
        assert_eq!(decode_mod_q(&data, 2, 2048).unwrap(), vec![2047, 1]);
    }

    #[test]
    fn mod_q_rejects_bad_shapes() {
        assert!(encode_mod_q(&[2048], 2048).is_err());
        assert!(encode_mod_q(&[-1], 2048).is_err());
        assert!(decode_mod_q(&[0u8; 2], 2, 2048).is_err());
        // Non power-of-two modulus: 7 fits in 3 bits but is out of range for q = 5.
        assert!(decode_mod_q(&[0b1110_0000], 1, 5).is_err());
    }

    #[test]
    fn sves_pairs() {
        let coeffs = vec![1, -1, 0, 0, -1, 1, 1];
        let data = encode_mod3_sves(&coeffs).unwrap();
        assert_eq!(data.len(), mod3_sves_len(coeffs.len()));
        assert_eq!(decode_mod3_sves(&data, coeffs.len()).unwrap(), coeffs);
        assert!(encode_mod3_sves(&[-1, -1]).is_err());
    }

    #[test]
    fn sves_padding_must_be_zero() {
        // Code 1 is (0, 1): the second coefficient is padding for n = 1.
        assert!(decode_mod3_sves(&[0b0010_0000], 1).is_err());
        assert_eq!(decode_mod3_sves(&[0b0110_0000], 1).unwrap(), vec![1]);
    }

    #[test]
    fn tight_encoding() {
        let coeffs = vec![-1, 0, 1, 1, -1, 0, 0, 1];
        let data = encode_mod3_tight(&coeffs).unwrap();
        assert_eq!(data.len(), mod3_tight_len(8));
        assert_eq!(decode_mod3_tight(&data, 8).unwrap(), coeffs);
        assert_eq!(encode_mod3_tight(&[-1, -1]).unwrap(), vec![0]);
        assert!(decode_mod3_tight(&[0xFF], 2).is_err());
        assert!(encode_mod3_tight(&[2]).is_err());
    }
}
