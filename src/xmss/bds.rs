// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BDS tree traversal.
//!
//! Keeps the authentication path of the next unused leaf and refreshes it
//! after every signature with `O(h)` stored nodes and at most
//! `(h - k) / 2` leaf computations, instead of rebuilding the tree.
//!
//! Right authentication nodes below height `h - k` come from tree-hash
//! instances that share one stack; those between `h - k` and `h - 2` are
//! retained from the initial tree build. Left nodes are recombined from the
//! previous path and the `keep` cache.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, trace};

use super::codec::Reader;
use super::digest::DigestKind;
use super::params::XmssParameters;
use super::tree::{Node, TreeContext};
use super::wots::Wots;
use crate::error::{Error, Result};

/// Incremental computation of one future right authentication node.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TreeHash {
    base_height: u8,
    tail: Option<Node>,
    height: u8,
    next_index: u32,
    initialized: bool,
    finished: bool,
}

impl TreeHash {
    fn new(base_height: u8) -> Self {
        Self {
            base_height,
            tail: None,
            height: base_height,
            next_index: 0,
            initialized: false,
            finished: false,
        }
    }

    /// Restart at leaf `start`.
    fn initialize(&mut self, start: u32) {
        self.tail = None;
        self.height = self.base_height;
        self.next_index = start;
        self.initialized = true;
        self.finished = false;
    }

    /// Install a completed node taken from the initial tree build.
    fn set_node(&mut self, node: Node) {
        self.height = node.height;
        self.tail = Some(node);
        self.finished = true;
    }

    fn is_pending(&self) -> bool {
        self.initialized && !self.finished
    }

    /// Compute one more leaf and fold it into the stack and tail node.
    fn update(&mut self, stack: &mut Vec<Node>, ctx: &TreeContext<'_>) {
        let leaf = self.next_index;
        let mut node = ctx.leaf(leaf);
        while let Some(top) = stack.last() {
            if top.height != node.height || top.height == self.base_height {
                break;
            }
            let Some(left) = stack.pop() else { break };
            node = ctx.parent(&left, &node, leaf >> (node.height + 1));
        }
        match self.tail.take() {
            None => self.tail = Some(node.clone()),
            Some(tail) if tail.height == node.height => {
                node = ctx.parent(&tail, &node, leaf >> (node.height + 1));
                self.tail = Some(node.clone());
            }
            Some(tail) => {
                self.tail = Some(tail);
                stack.push(node.clone());
            }
        }
        if self.tail.as_ref().is_some_and(|t| t.height == self.base_height) {
            self.finished = true;
        } else {
            self.height = node.height;
            self.next_index += 1;
        }
    }
}

/// Authentication-path state of one XMSS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bds {
    digest: DigestKind,
    layer: u32,
    tree: u64,
    tree_height: u8,
    k: u8,
    /// Leaf whose authentication path is currently held.
    index: u32,
    root: Node,
    auth: Vec<Node>,
    keep: BTreeMap<u8, Node>,
    retain: BTreeMap<u8, VecDeque<Node>>,
    treehash: Vec<TreeHash>,
    stack: Vec<Node>,
}

impl Bds {
    /// Build tree `tree` of `layer` once, keeping what later signatures need.
    pub(crate) fn initialize(
        params: &XmssParameters,
        wots: &Wots,
        sk_seed: &[u8],
        public_seed: &[u8],
        layer: u32,
        tree: u64,
    ) -> Result<Self> {
        let h = params.height();
        let k = params.bds_k();
        if k > h || (h - k) % 2 != 0 {
            return Err(Error::InvalidParameters(format!("BDS k = {k} invalid for height {h}")));
        }
        let ctx = TreeContext { wots, sk_seed, public_seed, layer, tree };
        let lower = (h - k) as u8;
        let mut treehash: Vec<TreeHash> = (0..lower).map(TreeHash::new).collect();
        let mut auth = Vec::with_capacity(h as usize);
        let mut retain: BTreeMap<u8, VecDeque<Node>> = BTreeMap::new();
        let mut stack: Vec<Node> = Vec::with_capacity(h as usize + 1);

        for leaf in 0..(1u32 << h) {
            let mut node = ctx.leaf(leaf);
            while stack.last().is_some_and(|top| top.height == node.height) {
                let index_on_height = leaf >> node.height;
                if index_on_height == 1 {
                    auth.push(node.clone());
                }
                if index_on_height == 3 && node.height < lower {
                    treehash[node.height as usize].set_node(node.clone());
                }
                if index_on_height >= 3
                    && index_on_height & 1 == 1
                    && node.height >= lower
                    && u32::from(node.height) + 2 <= h
                {
                    retain.entry(node.height).or_default().push_back(node.clone());
                }
                let Some(left) = stack.pop() else { break };
                node = ctx.parent(&left, &node, leaf >> (node.height + 1));
            }
            stack.push(node);
        }
        let root = stack
            .pop()
            .ok_or_else(|| Error::InconsistentState("tree build left an empty stack".into()))?;
        debug!(layer, tree, height = h, "built XMSS tree");

        Ok(Self {
            digest: params.digest(),
            layer,
            tree,
            tree_height: h as u8,
            k: k as u8,
            index: 0,
            root,
            auth,
            keep: BTreeMap::new(),
            retain,
            treehash,
            stack,
        })
    }

    pub(crate) fn layer(&self) -> u32 {
        self.layer
    }

    pub(crate) fn tree(&self) -> u64 {
        self.tree
    }

    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn root(&self) -> &[u8] {
        &self.root.value
    }

    /// Authentication path of leaf [`index`](Self::index), lowest level first.
    pub(crate) fn auth_path(&self) -> Vec<Vec<u8>> {
        self.auth.iter().map(|node| node.value.clone()).collect()
    }

    fn max_index(&self) -> u32 {
        1u32 << self.tree_height
    }

    /// True once every leaf of this tree has been used.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.index >= self.max_index()
    }

    /// Advance from leaf `index` to `index + 1`.
    ///
    /// After the last leaf the index moves past the end and no path is
    /// computed; advancing again fails with [`Error::KeyExhausted`].
    pub(crate) fn next_state(
        &mut self,
        wots: &Wots,
        sk_seed: &[u8],
        public_seed: &[u8],
    ) -> Result<()> {
        let max = self.max_index();
        if self.index >= max {
            return Err(Error::KeyExhausted);
        }
        if self.index == max - 1 {
            self.index = max;
            return Ok(());
        }
        let ctx = TreeContext { wots, sk_seed, public_seed, layer: self.layer, tree: self.tree };
        let h = u32::from(self.tree_height);
        let lower = h - u32::from(self.k);
        let index = self.index;
        let tau = index.trailing_ones();

        if (index >> (tau + 1)) & 1 == 0 && tau < h - 1 {
            self.keep.insert(tau as u8, self.auth[tau as usize].clone());
        }

        if tau == 0 {
            self.auth[0] = ctx.leaf(index);
        } else {
            let kept = self.keep.remove(&(tau as u8 - 1)).ok_or_else(|| missing("keep", tau - 1))?;
            self.auth[tau as usize] = ctx.parent(&self.auth[tau as usize - 1], &kept, index >> tau);

            for height in 0..tau {
                let node = if height < lower {
                    self.treehash[height as usize].tail.clone()
                } else {
                    self.retain.get_mut(&(height as u8)).and_then(VecDeque::pop_front)
                };
                self.auth[height as usize] = node.ok_or_else(|| missing("right node", height))?;
            }

            for height in 0..tau.min(lower) {
                let start = index + 1 + 3 * (1u32 << height);
                if start < max {
                    self.treehash[height as usize].initialize(start);
                }
            }
        }

        for _ in 0..lower / 2 {
            let Some(i) = self.treehash_for_update() else { break };
            self.treehash[i].update(&mut self.stack, &ctx);
        }
        self.index += 1;
        trace!(layer = self.layer, tree = self.tree, index = self.index, "advanced BDS state");
        Ok(())
    }

    /// Recompute the current leaf, fold it up the stored path and compare
    /// with the stored root. An exhausted state has no path to check.
    pub(crate) fn check_path(
        &self,
        wots: &Wots,
        sk_seed: &[u8],
        public_seed: &[u8],
    ) -> Result<()> {
        if self.is_exhausted() {
            return Ok(());
        }
        let ctx = TreeContext { wots, sk_seed, public_seed, layer: self.layer, tree: self.tree };
        let mut node = ctx.leaf(self.index);
        for (z, sibling) in (0u32..).zip(&self.auth) {
            let parent_index = self.index >> (z + 1);
            node = if (self.index >> z) & 1 == 0 {
                ctx.parent(&node, sibling, parent_index)
            } else {
                ctx.parent(sibling, &node, parent_index)
            };
        }
        if node != self.root {
            return Err(Error::InconsistentState(format!(
                "authentication path of leaf {} does not lead to the root",
                self.index
            )));
        }
        Ok(())
    }

    /// The pending instance with the lowest current height, earliest leaf on ties.
    fn treehash_for_update(&self) -> Option<usize> {
        self.treehash
            .iter()
            .enumerate()
            .filter(|(_, th)| th.is_pending())
            .min_by_key(|(_, th)| (th.height, th.next_index))
            .map(|(i, _)| i)
    }

    /// Serialize. Nodes are written as `[height: 1][value: n]`.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.layer.to_be_bytes());
        out.extend(self.tree.to_be_bytes());
        out.push(self.tree_height);
        out.push(self.k);
        out.push(self.digest.tag());
        out.extend(self.index.to_be_bytes());
        write_node(&mut out, &self.root);
        for node in &self.auth {
            write_node(&mut out, node);
        }
        out.push(self.keep.len() as u8);
        for (height, node) in &self.keep {
            out.push(*height);
            write_node(&mut out, node);
        }
        out.push(self.retain.len() as u8);
        for (height, queue) in &self.retain {
            out.push(*height);
            out.extend((queue.len() as u32).to_be_bytes());
            for node in queue {
                write_node(&mut out, node);
            }
        }
        for th in &self.treehash {
            let flags = u8::from(th.initialized)
                | u8::from(th.finished) << 1
                | u8::from(th.tail.is_some()) << 2;
            out.push(flags);
            out.push(th.height);
            out.extend(th.next_index.to_be_bytes());
            if let Some(tail) = &th.tail {
                write_node(&mut out, tail);
            }
        }
        out.extend((self.stack.len() as u32).to_be_bytes());
        for node in &self.stack {
            write_node(&mut out, node);
        }
        out
    }

    /// Parse a state written by [`to_bytes`](Self::to_bytes) for `params`.
    pub(crate) fn read(reader: &mut Reader<'_>, params: &XmssParameters) -> Result<Self> {
        let n = params.n();
        let h = params.height();
        let layer = reader.u32()?;
        let tree = reader.u64()?;
        let tree_height = reader.u8()?;
        let k = reader.u8()?;
        let digest = reader.u8()?;
        if u32::from(tree_height) != h
            || u32::from(k) != params.bds_k()
            || digest != params.digest().tag()
        {
            return Err(Error::ParameterMismatch);
        }
        let index = reader.u32()?;
        if index > 1u32 << h {
            return Err(Error::InconsistentState(format!(
                "BDS index {index} beyond tree of height {h}"
            )));
        }
        let root = read_node(reader, n, h)?;
        let auth = (0..h).map(|_| read_node(reader, n, h)).collect::<Result<Vec<_>>>()?;

        let mut keep: BTreeMap<u8, Node> = BTreeMap::new();
        for _ in 0..reader.u8()? {
            let height = read_key(reader, keep.keys().next_back())?;
            keep.insert(height, read_node(reader, n, h)?);
        }
        let mut retain: BTreeMap<u8, VecDeque<Node>> = BTreeMap::new();
        for _ in 0..reader.u8()? {
            let height = read_key(reader, retain.keys().next_back())?;
            let count = reader.u32()?;
            if count > 1u32 << h {
                return Err(Error::malformed("retain queue longer than the tree"));
            }
            let queue =
                (0..count).map(|_| read_node(reader, n, h)).collect::<Result<VecDeque<_>>>()?;
            retain.insert(height, queue);
        }
        let lower = (h - u32::from(k)) as u8;
        let mut treehash = Vec::with_capacity(lower as usize);
        for base_height in 0..lower {
            let flags = reader.u8()?;
            if flags & !0b111 != 0 {
                return Err(Error::malformed("unknown tree-hash flags"));
            }
            let height = reader.u8()?;
            let next_index = reader.u32()?;
            let tail = if flags & 0b100 != 0 { Some(read_node(reader, n, h)?) } else { None };
            treehash.push(TreeHash {
                base_height,
                tail,
                height,
                next_index,
                initialized: flags & 0b001 != 0,
                finished: flags & 0b010 != 0,
            });
        }
        let stack_len = reader.u32()?;
        if stack_len > h + 1 {
            return Err(Error::malformed("tree-hash stack deeper than the tree"));
        }
        let stack = (0..stack_len).map(|_| read_node(reader, n, h)).collect::<Result<Vec<_>>>()?;

        Ok(Self {
            digest: params.digest(),
            layer,
            tree,
            tree_height,
            k,
            index,
            root,
            auth,
            keep,
            retain,
            treehash,
            stack,
        })
    }
}

fn missing(what: &str, height: u32) -> Error {
    Error::InconsistentState(format!("no {what} available at height {height}"))
}

/// Map keys are written in strictly increasing order.
fn read_key(reader: &mut Reader<'_>, previous: Option<&u8>) -> Result<u8> {
    let key = reader.u8()?;
    if previous.is_some_and(|&p| p >= key) {
        return Err(Error::malformed("map keys out of order"));
    }
    Ok(key)
}

fn write_node(out: &mut Vec<u8>, node: &Node) {
    out.push(node.height);
    out.extend_from_slice(&node.value);
}

fn read_node(reader: &mut Reader<'_>, n: usize, max_height: u32) -> Result<Node> {
    let height = reader.u8()?;
    if u32::from(height) > max_height {
        return Err(Error::malformed(format!("node height {height} above {max_height}")));
    }
    Ok(Node { height, value: reader.take_vec(n)? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmss::DigestKind;

    fn naive_node(ctx: &TreeContext<'_>, height: u8, index: u32) -> Node {
        if height == 0 {
            return ctx.leaf(index);
        }
        let left = naive_node(ctx, height - 1, 2 * index);
        let right = naive_node(ctx, height - 1, 2 * index + 1);
        ctx.parent(&left, &right, index)
    }

    fn check_every_path(height: u32) {
        let params = XmssParameters::new(height, DigestKind::Sha256).unwrap();
        let wots = params.wots();
        let sk_seed = [8u8; 32];
        let public_seed = [9u8; 32];
        let ctx = TreeContext {
            wots: &wots,
            sk_seed: &sk_seed,
            public_seed: &public_seed,
            layer: 0,
            tree: 0,
        };

        // Every node of the tree, level by level.
        let levels: Vec<Vec<Node>> = (0..height)
            .map(|z| (0..(1u32 << (height - z))).map(|i| naive_node(&ctx, z as u8, i)).collect())
            .collect();

        let mut bds = Bds::initialize(&params, &wots, &sk_seed, &public_seed, 0, 0).unwrap();
        assert_eq!(bds.root, naive_node(&ctx, height as u8, 0));
        for leaf in 0..(1u32 << height) {
            assert_eq!(bds.index(), leaf);
            for z in 0..height {
                let sibling = &levels[z as usize][((leaf >> z) ^ 1) as usize];
                assert_eq!(&bds.auth[z as usize], sibling, "leaf {leaf}, height {z}");
            }
            bds.next_state(&wots, &sk_seed, &public_seed).unwrap();
        }
        assert!(bds.is_exhausted());
        assert_eq!(bds.next_state(&wots, &sk_seed, &public_seed), Err(Error::KeyExhausted));
    }

    #[test]
    fn paths_for_even_height() {
        check_every_path(4);
    }

    #[test]
    fn paths_for_odd_height() {
        check_every_path(5);
    }

    #[test]
    fn paths_for_smallest_tree() {
        check_every_path(2);
    }

    #[test]
    fn serialization_preserves_state() {
        let params = XmssParameters::new(6, DigestKind::Shake128).unwrap();
        let wots = params.wots();
        let seed = [3u8; 32];
        let mut bds = Bds::initialize(&params, &wots, &seed, &seed, 1, 7).unwrap();
        for _ in 0..13 {
            bds.next_state(&wots, &seed, &seed).unwrap();
        }
        let bytes = bds.to_bytes();
        let mut reader = Reader::new(&bytes);
        let restored = Bds::read(&mut reader, &params).unwrap();
        reader.finish().unwrap();
        assert_eq!(restored, bds);

        let other = XmssParameters::new(4, DigestKind::Shake128).unwrap();
        assert_eq!(Bds::read(&mut Reader::new(&bytes), &other), Err(Error::ParameterMismatch));
        let same_n = XmssParameters::new(6, DigestKind::Sha256).unwrap();
        assert_eq!(Bds::read(&mut Reader::new(&bytes), &same_n), Err(Error::ParameterMismatch));
        assert!(Bds::read(&mut Reader::new(&bytes[..bytes.len() - 1]), &params).is_err());
    }

    #[test]
    fn path_check_detects_tampering() {
        let params = XmssParameters::new(4, DigestKind::Sha256).unwrap();
        let wots = params.wots();
        let seed = [5u8; 32];
        let mut bds = Bds::initialize(&params, &wots, &seed, &seed, 0, 0).unwrap();
        for _ in 0..6 {
            bds.check_path(&wots, &seed, &seed).unwrap();
            bds.next_state(&wots, &seed, &seed).unwrap();
        }
        let other = [6u8; 32];
        assert!(matches!(bds.check_path(&wots, &other, &seed), Err(Error::InconsistentState(_))));
        bds.auth[2].value[0] ^= 1;
        assert!(matches!(bds.check_path(&wots, &seed, &seed), Err(Error::InconsistentState(_))));
    }
}
