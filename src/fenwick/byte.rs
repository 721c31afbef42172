/*
 * SPDX-FileCopyrightText: 2024 Inria
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use epserde::*;
use mem_dbg::*;

use super::{leaf_bitsize, nodes_at_height, num_levels, read_word, write_word, BYTE_MASK};
use crate::traits::FenwickTree;

/// A byte-packed Fenwick tree with the classical layout: a node of height
/// `h` occupies `⌈(LEAF_BITSIZE + h)/8⌉` bytes, and nodes are stored in
/// index order, with a per-node offset table built at construction.
///
/// Rounding node widths up to whole bytes leaves reserved high bits in
/// every node, so an update is a single unaligned 64-bit addition at the
/// node's offset: a carry can never propagate out of the node's bytes as
/// long as the stored value stays within its legal bound.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct ByteFenwickTree<const LEAF_MAXVAL: usize = 64> {
    tree: Vec<u8>,
    offset: Vec<usize>,
    size: usize,
}

impl<const LEAF_MAXVAL: usize> ByteFenwickTree<LEAF_MAXVAL> {
    const LEAF_BITSIZE: usize = leaf_bitsize(LEAF_MAXVAL);

    /// Bytes used by a node of the given height.
    #[inline(always)]
    const fn node_size(height: usize) -> usize {
        (Self::LEAF_BITSIZE + height).div_ceil(8)
    }

    #[inline(always)]
    fn read_node(&self, node: usize) -> u64 {
        let height = node.trailing_zeros() as usize;
        let word = unsafe { read_word(&self.tree, self.offset[node]) };
        word & BYTE_MASK[Self::node_size(height)]
    }

    #[inline(always)]
    fn add_to_node(&mut self, node: usize, delta: u64) {
        let pos = self.offset[node];
        let word = unsafe { read_word(&self.tree, pos) };
        unsafe { write_word(&mut self.tree, pos, word.wrapping_add(delta)) };
    }

    fn search(&self, mut val: u64, complement: bool) -> usize {
        let mut node = 0;
        for height in (0..num_levels(self.size)).rev() {
            let candidate = node + (1 << height);
            if candidate > self.size {
                continue;
            }
            let mut value = self.read_node(candidate);
            if complement {
                value = ((LEAF_MAXVAL as u64) << height) - value;
            }
            if val >= value {
                node = candidate;
                val -= value;
            }
        }
        node.saturating_sub(1)
    }
}

impl<const LEAF_MAXVAL: usize> FenwickTree for ByteFenwickTree<LEAF_MAXVAL> {
    const LEAF_MAXVAL: usize = LEAF_MAXVAL;

    fn from_increments(increments: &[u64]) -> Self {
        let size = increments.len();
        assert!(size > 0, "a Fenwick tree must have at least one element");
        debug_assert!(increments.iter().all(|&inc| inc <= LEAF_MAXVAL as u64));

        let mut offset = vec![0; size + 1];
        let mut pos = 0;
        for node in 1..=size {
            offset[node] = pos;
            pos += Self::node_size(node.trailing_zeros() as usize);
        }

        let mut tree = Self {
            tree: vec![0; pos + 7],
            offset,
            size,
        };
        for node in 1..=size {
            tree.add_to_node(node, increments[node - 1]);
        }
        for node in 1..=size {
            let parent = node + (node & node.wrapping_neg());
            if parent <= size {
                let value = tree.read_node(node);
                tree.add_to_node(parent, value);
            }
        }
        tree
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.size
    }

    fn get(&self, idx: usize) -> u64 {
        debug_assert!(idx < self.size);
        let mut idx = idx + 1;
        let mut sum = 0;
        while idx != 0 {
            sum += self.read_node(idx);
            idx &= idx - 1;
        }
        sum
    }

    fn set(&mut self, idx: usize, delta: i64) {
        debug_assert!(idx < self.size);
        let mut idx = idx + 1;
        while idx <= self.size {
            self.add_to_node(idx, delta as u64);
            idx += idx & idx.wrapping_neg();
        }
    }

    fn find(&self, val: u64) -> usize {
        self.search(val, false)
    }

    fn find_complement(&self, val: u64) -> usize {
        self.search(val, true)
    }

    fn bit_count(&self) -> usize {
        core::mem::size_of::<Self>() * 8
            + self.tree.len() * 8
            + self.offset.len() * usize::BITS as usize
    }
}

/// A byte-packed Fenwick tree with the level-order layout: nodes are
/// grouped by height, and `level[h]` records the starting byte of the
/// height-`h` group, so node offsets are a multiply-add instead of a
/// table lookup.
#[derive(Epserde, Debug, Clone, MemDbg, MemSize)]
pub struct ByteLevelFenwickTree<const LEAF_MAXVAL: usize = 64> {
    tree: Vec<u8>,
    level: Vec<usize>,
    size: usize,
}

impl<const LEAF_MAXVAL: usize> ByteLevelFenwickTree<LEAF_MAXVAL> {
    const LEAF_BITSIZE: usize = leaf_bitsize(LEAF_MAXVAL);

    #[inline(always)]
    const fn node_size(height: usize) -> usize {
        (Self::LEAF_BITSIZE + height).div_ceil(8)
    }

    /// Value of the `idx`-th node of the given height.
    #[inline(always)]
    fn read_at(&self, height: usize, idx: usize) -> u64 {
        let pos = self.level[height] + Self::node_size(height) * idx;
        let word = unsafe { read_word(&self.tree, pos) };
        word & BYTE_MASK[Self::node_size(height)]
    }

    #[inline(always)]
    fn add_to_node(&mut self, node: usize, delta: u64) {
        let height = node.trailing_zeros() as usize;
        let pos = self.level[height] + Self::node_size(height) * (node >> (height + 1));
        let word = unsafe { read_word(&self.tree, pos) };
        unsafe { write_word(&mut self.tree, pos, word.wrapping_add(delta)) };
    }

    fn search(&self, mut val: u64, complement: bool) -> usize {
        let mut node = 0;
        for height in (0..self.level.len() - 1).rev() {
            let candidate = node + (1 << height);
            if candidate > self.size {
                continue;
            }
            let mut value = self.read_at(height, candidate >> (height + 1));
            if complement {
                value = ((LEAF_MAXVAL as u64) << height) - value;
            }
            if val >= value {
                node = candidate;
                val -= value;
            }
        }
        node.saturating_sub(1)
    }
}

impl<const LEAF_MAXVAL: usize> FenwickTree for ByteLevelFenwickTree<LEAF_MAXVAL> {
    const LEAF_MAXVAL: usize = LEAF_MAXVAL;

    fn from_increments(increments: &[u64]) -> Self {
        let size = increments.len();
        assert!(size > 0, "a Fenwick tree must have at least one element");
        debug_assert!(increments.iter().all(|&inc| inc <= LEAF_MAXVAL as u64));

        let levels = num_levels(size);
        let mut level = vec![0; levels + 1];
        for height in 0..levels {
            level[height + 1] =
                level[height] + nodes_at_height(height, size) * Self::node_size(height);
        }

        let mut tree = Self {
            tree: vec![0; level[levels] + 7],
            level,
            size,
        };
        for height in 0..levels {
            let mut node = 1 << height;
            while node <= size {
                let mut value = increments[node - 1];
                let mut idx = node - 1;
                for h in 0..height {
                    idx >>= 1;
                    value += tree.read_at(h, idx);
                }
                tree.add_to_node(node, value);
                node += 1 << (height + 1);
            }
        }
        tree
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.size
    }

    fn get(&self, idx: usize) -> u64 {
        debug_assert!(idx < self.size);
        let mut idx = idx + 1;
        let mut sum = 0;
        while idx != 0 {
            let height = idx.trailing_zeros() as usize;
            sum += self.read_at(height, idx >> (height + 1));
            idx &= idx - 1;
        }
        sum
    }

    fn set(&mut self, idx: usize, delta: i64) {
        debug_assert!(idx < self.size);
        let mut idx = idx + 1;
        while idx <= self.size {
            self.add_to_node(idx, delta as u64);
            idx += idx & idx.wrapping_neg();
        }
    }

    fn find(&self, val: u64) -> usize {
        self.search(val, false)
    }

    fn find_complement(&self, val: u64) -> usize {
        self.search(val, true)
    }

    fn bit_count(&self) -> usize {
        core::mem::size_of::<Self>() * 8
            + self.tree.len() * 8
            + self.level.len() * usize::BITS as usize
    }
}
