// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XMSS and XMSS-MT stateful hash-based signatures (RFC 8391, `w = 16`).
//!
//! Private keys are linear resources. Each signature consumes the key and
//! returns its successor with the leaf index and the BDS traversal state
//! advanced together; there is no way to move one without the other.
//! Neither key type is `Clone`, but serialized bytes can still be copied:
//! restoring an old snapshot and signing again reuses a one-time key.
//!
//! Keys are not synchronised. Sharing one between threads requires external
//! locking, or passing ownership along with each signature.

mod address;
mod bds;
mod codec;
mod digest;
mod hash;
mod key;
mod mt;
mod params;
mod tree;
mod wots;

pub use digest::{Digest, DigestKind, TreeDigest};
pub use key::{XmssPrivateKey, XmssPublicKey, XmssSignature, XmssSigner};
pub use mt::{BdsStateMap, XmssMtPrivateKey, XmssMtPublicKey, XmssMtSignature, XmssMtSigner};
pub use params::{XmssMtParameters, XmssParameters, MAX_HEIGHT, MAX_MT_HEIGHT, MIN_HEIGHT};
