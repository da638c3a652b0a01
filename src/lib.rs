// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # pqkit
//!
//! Two post-quantum building blocks:
//!
//! - The NTRU polynomial engine: arithmetic in `Z[x]/(x^N - 1)` with dense,
//!   sparse, product-form and packed representations, inversion mod `2^k`
//!   and mod 3, and multi-modular resultants.
//! - XMSS and XMSS-MT stateful hash-based signatures (RFC 8391) whose private
//!   keys carry a BDS traversal state that advances exactly once per signature.
//!
//! ## Forward security
//!
//! Signing consumes the private key and hands back its successor. Persist the
//! returned key and discard every earlier copy: signing twice from the same
//! state reuses a one-time key and allows forgeries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pqkit::xmss::{DigestKind, XmssParameters, XmssPrivateKey};
//! use rand::SeedableRng;
//!
//! let params = XmssParameters::new(10, DigestKind::Sha256).expect("valid parameters");
//! let mut rng = rand::rngs::StdRng::from_os_rng();
//! let key = XmssPrivateKey::generate(&params, &mut rng).expect("key generation failed");
//! let public = key.public_key();
//!
//! let (signature, key) = key.sign(b"hello world").expect("signing failed");
//! public.verify(b"hello world", &signature).expect("signature invalid");
//! assert_eq!(key.index(), 1);
//! ```

mod error;
mod util;

pub mod ntru;
pub mod polynomial;
pub mod xmss;

pub use error::*;
