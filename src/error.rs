// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Errors that can occur during polynomial arithmetic and signing operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid modulus: {0}")]
    InvalidModulus(i64),

    #[error("Invalid ternary weight: {ones} ones and {neg_ones} negative ones in {n} coefficients")]
    InvalidTernaryWeight { n: usize, ones: usize, neg_ones: usize },

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Arithmetic overflow detected")]
    ArithmeticOverflow,

    #[error("No invertible candidate found after {0} attempts")]
    RetriesExhausted(usize),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Private key exhausted: every one-time key has been used")]
    KeyExhausted,

    #[error("Inconsistent key state: {0}")]
    InconsistentState(String),

    #[error("Parameter set mismatch")]
    ParameterMismatch,

    #[error("Signature verification failed")]
    VerificationFailed,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedEncoding(msg.into())
    }

    pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Error::LengthMismatch { expected, actual });
        }
        Ok(())
    }
}
