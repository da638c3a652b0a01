// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::address::Address;
use super::hash::rand_hash;
use super::wots::Wots;

/// A hash-tree node and its height above the leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) height: u8,
    pub(crate) value: Vec<u8>,
}

/// Everything needed to compute nodes of one tree in the hypertree.
#[derive(Clone, Copy)]
pub(crate) struct TreeContext<'a> {
    pub(crate) wots: &'a Wots,
    pub(crate) sk_seed: &'a [u8],
    pub(crate) public_seed: &'a [u8],
    pub(crate) layer: u32,
    pub(crate) tree: u64,
}

impl TreeContext<'_> {
    /// Leaf `index`: the L-tree compression of its WOTS+ public key.
    pub(crate) fn leaf(&self, index: u32) -> Node {
        let ots = Address::ots(self.layer, self.tree, index);
        let pk = self.wots.public_key(self.sk_seed, self.public_seed, &ots);
        let ltree = Address::ltree(self.layer, self.tree, index);
        let value = l_tree(self.wots, pk, self.public_seed, ltree);
        Node { height: 0, value }
    }

    /// Parent of two siblings; `index` is the parent's position on its level.
    pub(crate) fn parent(&self, left: &Node, right: &Node, index: u32) -> Node {
        let mut addr = Address::hash_tree(self.layer, self.tree);
        addr.set_tree_height(u32::from(left.height));
        addr.set_tree_index(index);
        let value =
            rand_hash(self.wots.kind(), &left.value, &right.value, self.public_seed, &mut addr);
        Node { height: left.height + 1, value }
    }
}

/// Compress a WOTS+ public key into one `n`-byte value.
pub(crate) fn l_tree(
    wots: &Wots,
    mut pk: Vec<Vec<u8>>,
    public_seed: &[u8],
    mut addr: Address,
) -> Vec<u8> {
    addr.set_tree_height(0);
    while pk.len() > 1 {
        let half = pk.len() / 2;
        for i in 0..half {
            addr.set_tree_index(i as u32);
            pk[i] = rand_hash(wots.kind(), &pk[2 * i], &pk[2 * i + 1], public_seed, &mut addr);
        }
        if pk.len() % 2 == 1 {
            let last = pk.len() - 1;
            pk.swap(half, last);
        }
        pk.truncate(pk.len().div_ceil(2));
        addr.set_tree_height(addr.tree_height() + 1);
    }
    pk.pop().unwrap_or_default()
}

/// Root of the tree a WOTS+ signature and authentication path lead to.
#[allow(clippy::too_many_arguments)]
pub(crate) fn root_from_signature(
    wots: &Wots,
    index: u32,
    wots_sig: &[Vec<u8>],
    auth: &[Vec<u8>],
    msg: &[u8],
    public_seed: &[u8],
    layer: u32,
    tree: u64,
) -> Vec<u8> {
    let ots = Address::ots(layer, tree, index);
    let pk = wots.public_key_from_sig(wots_sig, msg, public_seed, &ots);
    let mut node = l_tree(wots, pk, public_seed, Address::ltree(layer, tree, index));
    let mut addr = Address::hash_tree(layer, tree);
    for (k, sibling) in auth.iter().enumerate() {
        addr.set_tree_height(k as u32);
        addr.set_tree_index(index >> (k + 1));
        node = if (index >> k) & 1 == 0 {
            rand_hash(wots.kind(), &node, sibling, public_seed, &mut addr)
        } else {
            rand_hash(wots.kind(), sibling, &node, public_seed, &mut addr)
        };
    }
    node
}
