// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

const TYPE_OTS: u32 = 0;
const TYPE_LTREE: u32 = 1;
const TYPE_HASH_TREE: u32 = 2;

/// 32-byte hash address: eight big-endian words.
///
/// | word | OTS          | L-tree       | hash tree   |
/// |------|--------------|--------------|-------------|
/// | 0    | layer        | layer        | layer       |
/// | 1-2  | tree         | tree         | tree        |
/// | 3    | type 0       | type 1       | type 2      |
/// | 4    | OTS index    | L-tree index | padding     |
/// | 5    | chain        | tree height  | tree height |
/// | 6    | hash         | tree index   | tree index  |
/// | 7    | key and mask | key and mask | key and mask|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Address {
    words: [u32; 8],
}

impl Address {
    fn with_type(layer: u32, tree: u64, kind: u32) -> Self {
        let mut words = [0u32; 8];
        words[0] = layer;
        words[1] = (tree >> 32) as u32;
        words[2] = tree as u32;
        words[3] = kind;
        Self { words }
    }

    pub(crate) fn ots(layer: u32, tree: u64, leaf: u32) -> Self {
        let mut addr = Self::with_type(layer, tree, TYPE_OTS);
        addr.words[4] = leaf;
        addr
    }

    pub(crate) fn ltree(layer: u32, tree: u64, leaf: u32) -> Self {
        let mut addr = Self::with_type(layer, tree, TYPE_LTREE);
        addr.words[4] = leaf;
        addr
    }

    pub(crate) fn hash_tree(layer: u32, tree: u64) -> Self {
        Self::with_type(layer, tree, TYPE_HASH_TREE)
    }

    pub(crate) fn set_chain(&mut self, chain: u32) {
        self.words[5] = chain;
    }

    pub(crate) fn set_hash(&mut self, hash: u32) {
        self.words[6] = hash;
    }

    pub(crate) fn set_tree_height(&mut self, height: u32) {
        self.words[5] = height;
    }

    pub(crate) fn tree_height(&self) -> u32 {
        self.words[5]
    }

    pub(crate) fn set_tree_index(&mut self, index: u32) {
        self.words[6] = index;
    }

    pub(crate) fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.words[7] = key_and_mask;
    }

    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}
