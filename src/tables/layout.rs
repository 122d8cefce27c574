// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Index arithmetic for the flat tables.
//!
//! Every table is one contiguous vector made of equally long blocks, one block per
//! atom type, ordered type pair, or unordered type pair. The functions below map
//! logical indices to block indices and linear offsets.

/// Block holding the embedding function of a type
#[inline(always)]
pub const fn embedding_block(type_id: usize) -> usize {
    type_id
}

/// Block holding the density at an atom of `type_i` due to a neighbor of `type_j`
#[inline(always)]
pub const fn density_block(n_types: usize, type_i: usize, type_j: usize) -> usize {
    type_i * n_types + type_j
}

/// Block holding the pair potential between two types.
///
/// Pairs are unordered and stored as the upper triangle of the type matrix, row by
/// row: with `lo ≤ hi` the block is `lo·(2n - lo - 1)/2 + hi`.
///
/// # Examples
/// ~~~
/// use eam::tables::layout::pair_block;
/// // n = 3: (0,0) (0,1) (0,2) (1,1) (1,2) (2,2)
/// assert_eq!(pair_block(3, 0, 2), 2);
/// assert_eq!(pair_block(3, 1, 1), 3);
/// assert_eq!(pair_block(3, 2, 1), 4);
/// assert_eq!(pair_block(3, 2, 2), 5);
/// ~~~
#[inline(always)]
pub const fn pair_block(n_types: usize, type_a: usize, type_b: usize) -> usize {
    let (lo, hi) = if type_a <= type_b {
        (type_a, type_b)
    } else {
        (type_b, type_a)
    };
    lo * (2 * n_types - lo - 1) / 2 + hi
}

/// Number of embedding blocks
pub const fn embedding_block_count(n_types: usize) -> usize {
    n_types
}

/// Number of density blocks, one per ordered type pair
pub const fn density_block_count(n_types: usize) -> usize {
    n_types * n_types
}

/// Number of pair potential blocks, one per unordered type pair
pub const fn pair_block_count(n_types: usize) -> usize {
    n_types * (n_types + 1) / 2
}

/// Linear offset of a sample within a table of `block_len` long blocks
#[inline(always)]
pub const fn sample_offset(block: usize, block_len: usize, bin: usize) -> usize {
    block * block_len + bin
}
