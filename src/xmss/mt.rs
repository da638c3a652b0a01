// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XMSS-MT: a hypertree of XMSS trees where each layer signs the root of
//! the tree below it and layer 0 signs messages.

use std::collections::BTreeMap;

use rand::Rng;
use rayon::prelude::*;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::address::Address;
use super::bds::Bds;
use super::codec::Reader;
use super::hash::{message_digest, message_randomness};
use super::key::read_reduced_signature;
use super::params::{XmssMtParameters, XmssParameters};
use super::tree::root_from_signature;
use crate::error::{Error, Result};
use crate::util::to_bytes_be;

/// Traversal states of the current tree on each layer, keyed by layer.
///
/// A layer whose tree has been used up is dropped and rebuilt for the next
/// tree when the first leaf of that tree is needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BdsStateMap {
    states: BTreeMap<u32, Bds>,
}

impl BdsStateMap {
    /// Number of layers with a live traversal state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True if `layer` has a live traversal state.
    pub fn contains_layer(&self, layer: u32) -> bool {
        self.states.contains_key(&layer)
    }

    fn get(&self, layer: u32) -> Option<&Bds> {
        self.states.get(&layer)
    }

    /// `[count: 1]` then each state in layer order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.states.len() as u8];
        for bds in self.states.values() {
            out.extend(bds.to_bytes());
        }
        out
    }

    fn read(reader: &mut Reader<'_>, params: &XmssMtParameters) -> Result<Self> {
        let count = reader.u8()?;
        if u32::from(count) > params.layers() {
            return Err(Error::malformed(format!(
                "{count} layer states for {} layers",
                params.layers()
            )));
        }
        let mut states: BTreeMap<u32, Bds> = BTreeMap::new();
        for _ in 0..count {
            let bds = Bds::read(reader, params.xmss())?;
            let layer = bds.layer();
            if layer >= params.layers() {
                return Err(Error::InconsistentState(format!("state for missing layer {layer}")));
            }
            if states.keys().next_back().is_some_and(|&last| last >= layer) {
                return Err(Error::InconsistentState(format!("layer {layer} state out of order")));
            }
            states.insert(layer, bds);
        }
        Ok(Self { states })
    }
}

/// Tree and leaf that `layer` signs with at global index `index`.
fn position(params: &XmssMtParameters, index: u64, layer: u32) -> (u64, u32) {
    let h = params.xmss().height();
    let tree = index >> (h * (layer + 1));
    let leaf = (index >> (h * layer)) & ((1u64 << h) - 1);
    (tree, leaf as u32)
}

/// Public half of an XMSS-MT key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmssMtPublicKey {
    params: XmssMtParameters,
    root: Vec<u8>,
    public_seed: Vec<u8>,
}

impl XmssMtPublicKey {
    pub fn new(params: XmssMtParameters, root: Vec<u8>, public_seed: Vec<u8>) -> Result<Self> {
        Error::check_len(params.n(), root.len())?;
        Error::check_len(params.n(), public_seed.len())?;
        Ok(Self { params, root, public_seed })
    }

    #[inline]
    pub fn params(&self) -> &XmssMtParameters {
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

    pub fn from_bytes(params: &XmssMtParameters, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        Error::check_len(2 * n, bytes.len())?;
        Self::new(*params, bytes[..n].to_vec(), bytes[n..].to_vec())
    }

    /// Walk the signature up the hypertree and compare with the root.
    pub fn verify(&self, msg: &[u8], signature: &XmssMtSignature) -> Result<()> {
        if signature.params != self.params {
            return Err(Error::ParameterMismatch);
        }
        if signature.index >= self.params.max_signatures() {
            return Err(Error::VerificationFailed);
        }
        let kind = self.params.digest();
        let wots = self.params.xmss().wots();
        let mut node = message_digest(kind, &signature.r, &self.root, signature.index, msg);
        for (layer, reduced) in (0u32..).zip(&signature.layers) {
            let (tree, leaf) = position(&self.params, signature.index, layer);
            node = root_from_signature(
                &wots,
                leaf,
                &reduced.wots,
                &reduced.auth,
                &node,
                &self.public_seed,
                layer,
                tree,
            );
        }
        if node != self.root {
            return Err(Error::VerificationFailed);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReducedSignature {
    wots: Vec<Vec<u8>>,
    auth: Vec<Vec<u8>>,
}

/// XMSS-MT signature: global index, randomness and one reduced signature per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmssMtSignature {
    params: XmssMtParameters,
    index: u64,
    r: Vec<u8>,
    layers: Vec<ReducedSignature>,
}

impl XmssMtSignature {
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn randomness(&self) -> &[u8] {
        &self.r
    }

    #[inline]
    pub fn params(&self) -> &XmssMtParameters {
        &self.params
    }

    /// `[index][r]` then `wots || auth` for each layer, bottom first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.params.signature_len());
        out.extend(to_bytes_be(self.index, self.params.index_len()));
        out.extend_from_slice(&self.r);
        for reduced in &self.layers {
            for chunk in reduced.wots.iter().chain(&reduced.auth) {
                out.extend_from_slice(chunk);
            }
        }
        out
    }

    pub fn from_bytes(params: &XmssMtParameters, bytes: &[u8]) -> Result<Self> {
        Error::check_len(params.signature_len(), bytes.len())?;
        let mut reader = Reader::new(bytes);
        let index = reader.uint(params.index_len())?;
        let r = reader.take_vec(params.n())?;
        let layers = (0..params.layers())
            .map(|_| {
                read_reduced_signature(&mut reader, params.xmss())
                    .map(|(wots, auth)| ReducedSignature { wots, auth })
            })
            .collect::<Result<Vec<_>>>()?;
        reader.finish()?;
        Ok(Self { params: *params, index, r, layers })
    }
}

/// XMSS-MT private key: seeds, global index and per-layer traversal states.
#[allow(missing_debug_implementations)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct XmssMtPrivateKey {
    #[zeroize(skip)]
    params: XmssMtParameters,
    index: u64,
    sk_seed: Vec<u8>,
    sk_prf: Vec<u8>,
    #[zeroize(skip)]
    public_seed: Vec<u8>,
    #[zeroize(skip)]
    root: Vec<u8>,
    #[zeroize(skip)]
    states: BdsStateMap,
}

impl XmssMtPrivateKey {
    pub fn generate<R: Rng + ?Sized>(params: &XmssMtParameters, rng: &mut R) -> Result<Self> {
        let n = params.n();
        let mut sk_seed = vec![0u8; n];
        let mut sk_prf = vec![0u8; n];
        let mut public_seed = vec![0u8; n];
        rng.fill(sk_seed.as_mut_slice());
        rng.fill(sk_prf.as_mut_slice());
        rng.fill(public_seed.as_mut_slice());
        Self::from_seeds(params, sk_seed, sk_prf, public_seed)
    }

    /// Deterministic key generation. The first tree of every layer is built
    /// in parallel.
    pub fn from_seeds(
        params: &XmssMtParameters,
        sk_seed: Vec<u8>,
        sk_prf: Vec<u8>,
        public_seed: Vec<u8>,
    ) -> Result<Self> {
        let n = params.n();
        Error::check_len(n, sk_seed.len())?;
        Error::check_len(n, sk_prf.len())?;
        Error::check_len(n, public_seed.len())?;

        let xmss = *params.xmss();
        let wots = xmss.wots();
        let states = (0..params.layers())
            .into_par_iter()
            .map(|layer| -> Result<(u32, Bds)> {
                let bds = Bds::initialize(&xmss, &wots, &sk_seed, &public_seed, layer, 0)?;
                Ok((layer, bds))
            })
            .collect::<Result<BTreeMap<u32, Bds>>>()?;
        let root = states
            .get(&(params.layers() - 1))
            .map(|top| top.root().to_vec())
            .ok_or_else(|| Error::InconsistentState("no top layer tree".into()))?;
        debug!(
            height = params.height(),
            layers = params.layers(),
            digest = %params.digest(),
            "generated XMSS-MT key"
        );

        Ok(Self {
            params: *params,
            index: 0,
            sk_seed,
            sk_prf,
            public_seed,
            root,
            states: BdsStateMap { states },
        })
    }

    #[inline]
    pub fn params(&self) -> &XmssMtParameters {
        &self.params
    }

    /// Global index of the next unused one-time key.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn usages_remaining(&self) -> u64 {
        self.params.max_signatures().saturating_sub(self.index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.usages_remaining() == 0
    }

    #[inline]
    pub fn states(&self) -> &BdsStateMap {
        &self.states
    }

    pub fn public_key(&self) -> XmssMtPublicKey {
        XmssMtPublicKey {
            params: self.params,
            root: self.root.clone(),
            public_seed: self.public_seed.clone(),
        }
    }

    /// Sign `msg` and return the signature with the advanced key.
    ///
    /// The caller must persist the returned key and discard every copy of
    /// the previous state. On error the key is dropped.
    pub fn sign(mut self, msg: &[u8]) -> Result<(XmssMtSignature, Self)> {
        let signature = self.sign_in_place(msg)?;
        Ok((signature, self))
    }

    /// Every present state must sit on the tree and leaf the global index
    /// selects; a missing one is only allowed at the first leaf of a tree.
    fn check_states(&self) -> Result<()> {
        for layer in 0..self.params.layers() {
            let (tree, leaf) = position(&self.params, self.index, layer);
            match self.states.get(layer) {
                Some(bds) if bds.tree() != tree || bds.index() != leaf => {
                    return Err(Error::InconsistentState(format!(
                        "layer {layer} at tree {} leaf {}, index {} expects tree {tree} \
                         leaf {leaf}",
                        bds.tree(),
                        bds.index(),
                        self.index
                    )));
                }
                None if leaf != 0 => {
                    return Err(Error::InconsistentState(format!(
                        "layer {layer} lost its state mid-tree"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn sign_in_place(&mut self, msg: &[u8]) -> Result<XmssMtSignature> {
        if self.is_exhausted() {
            return Err(Error::KeyExhausted);
        }
        self.check_states()?;

        let xmss: XmssParameters = *self.params.xmss();
        let h = xmss.height();
        let kind = xmss.digest();
        let wots = xmss.wots();
        let index = self.index;
        let mut states = self.states.clone();

        for layer in 0..self.params.layers() {
            if !states.contains_layer(layer) {
                let (tree, _) = position(&self.params, index, layer);
                let bds =
                    Bds::initialize(&xmss, &wots, &self.sk_seed, &self.public_seed, layer, tree)?;
                debug!(layer, tree, "regenerated XMSS-MT layer tree");
                states.states.insert(layer, bds);
            }
        }

        let r = message_randomness(kind, &self.sk_prf, index);
        let mut node = message_digest(kind, &r, &self.root, index, msg);
        let mut layers = Vec::with_capacity(self.params.layers() as usize);
        for bds in states.states.values() {
            let addr = Address::ots(bds.layer(), bds.tree(), bds.index());
            let wots_sig = wots.sign(&node, &self.sk_seed, &self.public_seed, &addr);
            layers.push(ReducedSignature { wots: wots_sig, auth: bds.auth_path() });
            node = bds.root().to_vec();
        }

        for layer in 0..self.params.layers() {
            if (index + 1) % (1u64 << (h * layer)) != 0 {
                continue;
            }
            let Some(bds) = states.states.get_mut(&layer) else { continue };
            bds.next_state(&wots, &self.sk_seed, &self.public_seed)?;
            if bds.is_exhausted() {
                states.states.remove(&layer);
            }
        }

        self.states = states;
        self.index += 1;
        debug!(index, remaining = self.usages_remaining(), "XMSS-MT signature issued");
        Ok(XmssMtSignature { params: self.params, index, r, layers })
    }

    /// `[index][sk_seed][sk_prf][public_seed][root][state map]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_bytes_be(self.index, self.params.index_len());
        out.extend_from_slice(&self.sk_seed);
        out.extend_from_slice(&self.sk_prf);
        out.extend_from_slice(&self.public_seed);
        out.extend_from_slice(&self.root);
        out.extend(self.states.to_bytes());
        out
    }

    /// Restore a key written by [`to_bytes`](Self::to_bytes), checking that
    /// every layer state was written for these parameters, agrees with the
    /// stored index and holds a path that leads to its tree root.
    pub fn from_bytes(params: &XmssMtParameters, bytes: &[u8]) -> Result<Self> {
        let n = params.n();
        let mut reader = Reader::new(bytes);
        let index = reader.uint(params.index_len())?;
        let sk_seed = reader.take_vec(n)?;
        let sk_prf = reader.take_vec(n)?;
        let public_seed = reader.take_vec(n)?;
        let root = reader.take_vec(n)?;
        let states = BdsStateMap::read(&mut reader, params)?;
        reader.finish()?;

        if index > params.max_signatures() {
            return Err(Error::InconsistentState(format!(
                "index {index} beyond {}",
                params.max_signatures()
            )));
        }
        let key = Self { params: *params, index, sk_seed, sk_prf, public_seed, root, states };
        if key.is_exhausted() {
            return Ok(key);
        }
        let top = key.states.get(params.layers() - 1).ok_or_else(|| {
            Error::InconsistentState("top layer state missing before exhaustion".into())
        })?;
        if top.root() != key.root.as_slice() {
            return Err(Error::InconsistentState("top layer tree does not match the root".into()));
        }
        key.check_states()?;
        let wots = params.xmss().wots();
        for bds in key.states.states.values() {
            bds.check_path(&wots, &key.sk_seed, &key.public_seed)?;
        }
        Ok(key)
    }
}

/// Stateful XMSS-MT signer; a failed signature leaves the key unchanged.
#[allow(missing_debug_implementations)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct XmssMtSigner {
    key: XmssMtPrivateKey,
    public_key: XmssMtPublicKey,
}

impl XmssMtSigner {
    pub fn new(key: XmssMtPrivateKey) -> Self {
        let public_key = key.public_key();
        Self { key, public_key }
    }

    pub fn sign(&mut self, msg: &[u8]) -> Result<XmssMtSignature> {
        self.key.sign_in_place(msg)
    }

    pub fn verify(&self, msg: &[u8], signature: &XmssMtSignature) -> Result<()> {
        self.public_key.verify(msg, signature)
    }

    #[inline]
    pub fn public_key(&self) -> &XmssMtPublicKey {
        &self.public_key
    }

    pub fn usages_remaining(&self) -> u64 {
        self.key.usages_remaining()
    }

    pub fn updated_private_key(self) -> XmssMtPrivateKey {
        self.key
    }
}
