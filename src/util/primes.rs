// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::OnceLock;

/// Largest modulus for which products of two residues still fit in 31 bits.
pub(crate) const MAX_RESULTANT_PRIME: i64 = 46337;

/// Lower end of the prime window used for multi-modular resultants.
const MIN_RESULTANT_PRIME: usize = 10_007;

static PRIMES: OnceLock<Vec<i64>> = OnceLock::new();

/// Primes in `[10007, 46337]`, largest first.
///
/// Sieved once per process; every prime keeps `p * p < 2^31`.
pub(crate) fn resultant_primes() -> &'static [i64] {
    PRIMES.get_or_init(|| {
        let limit = MAX_RESULTANT_PRIME as usize;
        let mut composite = vec![false; limit + 1];
        let mut i = 2;
        while i * i <= limit {
            if !composite[i] {
                let mut j = i * i;
                while j <= limit {
                    composite[j] = true;
                    j += i;
                }
            }
            i += 1;
        }
        (MIN_RESULTANT_PRIME..=limit)
            .rev()
            .filter(|&n| !composite[n])
            .map(|n| n as i64)
            .collect()
    })
}
