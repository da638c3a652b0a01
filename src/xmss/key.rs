// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use rand::Rng;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::address::Address;
use super::bds::Bds;
use super::codec::Reader;
use super::hash::{message_digest, message_randomness};
use super::params::XmssParameters;
use super::tree::root_from_signature;
use crate::error::{Error, Result};

/// Public half of an XMSS key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmssPublicKey {
    params: XmssParameters,
    root: Vec<u8>,
    public_seed: Vec<u8>,
}

impl XmssPublicKey {
    /// Both values must be `n` bytes long.
    pub fn new(params: XmssParameters, root: Vec<u8>, public_seed: Vec<u8>) -> Result<Self> {
        Error::check_len(params.n(), root.len())?;
        Error::check_len(params.n(), public_seed.len())?;
        Ok(Self { params, root, public_seed })
    }

    #[inline]
    pub fn params(&self) -> &XmssParameters {
        &self.params
    }

    #[inline]
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    #[inline]
    pub fn public_seed(&self) -> &[u8] {
        &self.public_seed
    }

    /// `root || public_seed`.
    pub fn to_bytes(&self) -> Vec<u8> {
        [self.root.as_slice(), self.public_seed.as_slice()].concat()
    }

    pub fn from_bytes(params: &XmssParameters, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        Error::check_len(2 * n, bytes.len())?;
        Self::new(*params, bytes[..n].to_vec(), bytes[n..].to_vec())
    }

    /// Check `signature` over `msg`.
    ///
    /// Returns [`Error::ParameterMismatch`] if the signature was produced for
    /// another parameter set and [`Error::VerificationFailed`] otherwise.
    pub fn verify(&self, msg: &[u8], signature: &XmssSignature) -> Result<()> {
        if signature.params != self.params {
            return Err(Error::ParameterMismatch);
        }
        if u64::from(signature.index) >= self.params.max_signatures() {
            return Err(Error::VerificationFailed);
        }
        let kind = self.params.digest();
        let index = u64::from(signature.index);
        let digest = message_digest(kind, &signature.r, &self.root, index, msg);
        let root = root_from_signature(
            &self.params.wots(),
            signature.index,
            &signature.wots,
            &signature.auth,
            &digest,
            &self.public_seed,
            0,
            0,
        );
        if root != self.root {
            return Err(Error::VerificationFailed);
        }
        Ok(())
    }
}

/// XMSS signature: leaf index, randomness, WOTS+ signature and authentication path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmssSignature {
    params: XmssParameters,
    index: u32,
    r: Vec<u8>,
    wots: Vec<Vec<u8>>,
    auth: Vec<Vec<u8>>,
}

impl XmssSignature {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn randomness(&self) -> &[u8] {
        &self.r
    }

    #[inline]
    pub fn params(&self) -> &XmssParameters {
        &self.params
    }

    /// `[index: 4][r][wots][auth]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.params.signature_len());
        out.extend(self.index.to_be_bytes());
        out.extend_from_slice(&self.r);
        for chunk in self.wots.iter().chain(&self.auth) {
            out.extend_from_slice(chunk);
        }
        out
    }

    pub fn from_bytes(params: &XmssParameters, bytes: &[u8]) -> Result<Self> {
        Error::check_len(params.signature_len(), bytes.len())?;
        let mut reader = Reader::new(bytes);
        let index = reader.u32()?;
        let r = reader.take_vec(params.n())?;
        let sig = read_reduced_signature(&mut reader, params)?;
        reader.finish()?;
        Ok(Self { params: *params, index, r, wots: sig.0, auth: sig.1 })
    }
}

/// Read one WOTS+ signature followed by its authentication path.
pub(crate) fn read_reduced_signature(
    reader: &mut Reader<'_>,
    params: &XmssParameters,
) -> Result<(Vec<Vec<u8>>, Vec<Vec<u8>>)> {
    let n = params.n();
    let wots = (0..params.wots().len()).map(|_| reader.take_vec(n)).collect::<Result<Vec<_>>>()?;
    let auth = (0..params.height()).map(|_| reader.take_vec(n)).collect::<Result<Vec<_>>>()?;
    Ok((wots, auth))
}

/// XMSS private key with its traversal state.
///
/// The key is move-only: [`sign`](Self::sign) consumes it and returns the
/// successor. Seeds are wiped on drop.
#[allow(missing_debug_implementations)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct XmssPrivateKey {
    #[zeroize(skip)]
    params: XmssParameters,
    index: u32,
    sk_seed: Vec<u8>,
    sk_prf: Vec<u8>,
    #[zeroize(skip)]
    public_seed: Vec<u8>,
    #[zeroize(skip)]
    root: Vec<u8>,
    #[zeroize(skip)]
    bds: Bds,
}

impl XmssPrivateKey {
    /// Draw fresh seeds from `rng` and build the tree.
    pub fn generate<R: Rng + ?Sized>(params: &XmssParameters, rng: &mut R) -> Result<Self> {
        let n = params.n();
        let mut sk_seed = vec![0u8; n];
        let mut sk_prf = vec![0u8; n];
        let mut public_seed = vec![0u8; n];
        rng.fill(sk_seed.as_mut_slice());
        rng.fill(sk_prf.as_mut_slice());
        rng.fill(public_seed.as_mut_slice());
        Self::from_seeds(params, sk_seed, sk_prf, public_seed)
    }

    /// Deterministic key generation from caller-supplied `n`-byte seeds.
    pub fn from_seeds(
        params: &XmssParameters,
        sk_seed: Vec<u8>,
        sk_prf: Vec<u8>,
        public_seed: Vec<u8>,
    ) -> Result<Self> {
        let n = params.n();
        Error::check_len(n, sk_seed.len())?;
        Error::check_len(n, sk_prf.len())?;
        Error::check_len(n, public_seed.len())?;
        let bds = Bds::initialize(params, &params.wots(), &sk_seed, &public_seed, 0, 0)?;
        debug!(height = params.height(), digest = %params.digest(), "generated XMSS key");
        Ok(Self {
            params: *params,
            index: 0,
            sk_seed,
            sk_prf,
            public_seed,
            root: bds.root().to_vec(),
            bds,
        })
    }

    #[inline]
    pub fn params(&self) -> &XmssParameters {
        &self.params
    }

    /// Index of the next unused one-time key.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Signatures still available.
    pub fn usages_remaining(&self) -> u64 {
        self.params.max_signatures().saturating_sub(u64::from(self.index))
    }

    pub fn is_exhausted(&self) -> bool {
        self.usages_remaining() == 0
    }

    pub fn public_key(&self) -> XmssPublicKey {
        XmssPublicKey {
            params: self.params,
            root: self.root.clone(),
            public_seed: self.public_seed.clone(),
        }
    }

    /// Sign `msg` and return the signature with the advanced key.
    ///
    /// The caller must persist the returned key and discard every copy of
    /// the previous state. On error the key is dropped.
    pub fn sign(mut self, msg: &[u8]) -> Result<(XmssSignature, Self)> {
        let signature = self.sign_in_place(msg)?;
        Ok((signature, self))
    }

    /// Sign and advance. Index and traversal state move together or not at all.
    fn sign_in_place(&mut self, msg: &[u8]) -> Result<XmssSignature> {
        if self.is_exhausted() {
            return Err(Error::KeyExhausted);
        }
        if self.bds.index() != self.index {
            return Err(Error::InconsistentState(format!(
                "key index {} but traversal at leaf {}",
                self.index,
                self.bds.index()
            )));
        }
        let kind = self.params.digest();
        let wots = self.params.wots();
        let index = self.index;
        let r = message_randomness(kind, &self.sk_prf, u64::from(index));
        let digest = message_digest(kind, &r, &self.root, u64::from(index), msg);
        let addr = Address::ots(0, 0, index);
        let wots_sig = wots.sign(&digest, &self.sk_seed, &self.public_seed, &addr);
        let auth = self.bds.auth_path();

        let mut next = self.bds.clone();
        next.next_state(&wots, &self.sk_seed, &self.public_seed)?;
        self.bds = next;
        self.index += 1;
        debug!(index, remaining = self.usages_remaining(), "XMSS signature issued");

        Ok(XmssSignature { params: self.params, index, r, wots: wots_sig, auth })
    }

    /// `[index: 4][sk_seed][sk_prf][public_seed][root][bds]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.index.to_be_bytes());
        out.extend_from_slice(&self.sk_seed);
        out.extend_from_slice(&self.sk_prf);
        out.extend_from_slice(&self.public_seed);
        out.extend_from_slice(&self.root);
        out.extend(self.bds.to_bytes());
        out
    }

    /// Restore a key written by [`to_bytes`](Self::to_bytes).
    ///
    /// Fails with [`Error::ParameterMismatch`] if the state was written for
    /// another height or digest, and with [`Error::InconsistentState`] unless
    /// the traversal state belongs to this tree, sits at the stored index and
    /// its authentication path leads from the current leaf to the root.
    pub fn from_bytes(params: &XmssParameters, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        let mut reader = Reader::new(bytes);
        let index = reader.u32()?;
        let sk_seed = reader.take_vec(n)?;
        let sk_prf = reader.take_vec(n)?;
        let public_seed = reader.take_vec(n)?;
        let root = reader.take_vec(n)?;
        let bds = Bds::read(&mut reader, params)?;
        reader.finish()?;

        if u64::from(index) > params.max_signatures() {
            return Err(Error::InconsistentState(format!(
                "index {index} beyond {}",
                params.max_signatures()
            )));
        }
        if bds.index() != index {
            return Err(Error::InconsistentState(format!(
                "key index {index} but traversal at leaf {}",
                bds.index()
            )));
        }
        if bds.layer() != 0 || bds.tree() != 0 || bds.root() != root.as_slice() {
            return Err(Error::InconsistentState("traversal state belongs to another tree".into()));
        }
        bds.check_path(&params.wots(), &sk_seed, &public_seed)?;
        Ok(Self { params: *params, index, sk_seed, sk_prf, public_seed, root, bds })
    }
}

/// Stateful signer that keeps the private key across calls.
///
/// Unlike [`XmssPrivateKey::sign`], a failed signature leaves the key in
/// place, unchanged.
#[allow(missing_debug_implementations)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct XmssSigner {
    key: XmssPrivateKey,
    public_key: XmssPublicKey,
}

impl XmssSigner {
    pub fn new(key: XmssPrivateKey) -> Self {
        let public_key = key.public_key();
        Self { key, public_key }
    }

    pub fn sign(&mut self, msg: &[u8]) -> Result<XmssSignature> {
        self.key.sign_in_place(msg)
    }

    /// Verify against the signer's own public key.
    pub fn verify(&self, msg: &[u8], signature: &XmssSignature) -> Result<()> {
        self.public_key.verify(msg, signature)
    }

    #[inline]
    pub fn public_key(&self) -> &XmssPublicKey {
        &self.public_key
    }

    pub fn usages_remaining(&self) -> u64 {
        self.key.usages_remaining()
    }

    /// Hand back the advanced key for persistence.
    pub fn updated_private_key(self) -> XmssPrivateKey {
        self.key
    }
}
