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

//! Neighbor list interface consumed by the force compute.

use crate::ParticleData;

/// How pairs are stored in a neighbor list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Each unordered pair is listed once, allowing Newton's third law to be exploited
    Half,
    /// Each pair is listed twice, once from each particle
    Full,
}

/// Precomputed particle adjacency.
///
/// Building and maintaining the list (cell lists, skin distances, ...) is up to the
/// implementor. The force compute calls [`NeighborList::update`] once at the start
/// of each step and afterwards only reads the adjacency.
pub trait NeighborList: Send + Sync {
    /// Bring the list up to date for the given step.
    ///
    /// The default implementation does nothing, which suits static lists.
    fn update(&mut self, _timestep: u64, _particles: &ParticleData) -> anyhow::Result<()> {
        Ok(())
    }

    /// Storage mode of the pairs
    fn storage_mode(&self) -> StorageMode;

    /// Number of particles the list was built for
    fn particle_count(&self) -> usize;

    /// Neighbor indices of a particle
    fn neighbors(&self, particle: usize) -> &[usize];
}

/// Neighbor list stored as a per-particle neighbor count and a flat index array
/// with a fixed row pitch, the `j`th neighbor of particle `i` at `i * pitch + j`.
///
/// # Examples
/// ~~~
/// use eam::{FlatNeighborList, NeighborList, StorageMode};
/// let half = FlatNeighborList::from_pairs(3, [(0, 1), (0, 2)], StorageMode::Half);
/// assert_eq!(half.neighbors(0), &[1, 2]);
/// assert!(half.neighbors(1).is_empty());
///
/// let full = FlatNeighborList::from_pairs(3, [(0, 1), (0, 2)], StorageMode::Full);
/// assert_eq!(full.neighbors(2), &[0]);
/// ~~~
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNeighborList {
    storage_mode: StorageMode,
    counts: Vec<usize>,
    pitch: usize,
    list: Vec<usize>,
}

impl FlatNeighborList {
    /// Create from raw per-particle counts and a flat index array.
    ///
    /// # Panics
    /// Panics if `list.len() != counts.len() * pitch` or if a count exceeds the pitch.
    pub fn new(
        storage_mode: StorageMode,
        counts: Vec<usize>,
        pitch: usize,
        list: Vec<usize>,
    ) -> Self {
        assert_eq!(
            list.len(),
            counts.len() * pitch,
            "Flat neighbor array must hold one row of `pitch` entries per particle"
        );
        assert!(
            counts.iter().all(|&count| count <= pitch),
            "Neighbor count cannot exceed the row pitch"
        );
        Self {
            storage_mode,
            counts,
            pitch,
            list,
        }
    }

    /// Create from a set of unordered pairs.
    ///
    /// In half mode the pair `(i, k)` is stored under `i` only, in full mode it is
    /// stored under both `i` and `k`.
    pub fn from_pairs<I>(n_particles: usize, pairs: I, storage_mode: StorageMode) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut rows = vec![Vec::new(); n_particles];
        for (i, k) in pairs {
            rows[i].push(k);
            if storage_mode == StorageMode::Full {
                rows[k].push(i);
            }
        }
        Self::from_rows(rows, storage_mode)
    }

    /// Reference O(N²) builder collecting all pairs closer than `range`.
    ///
    /// Distances use the minimum image convention of the particle box. Meant for
    /// testing and small systems; production codes supply their own [`NeighborList`].
    pub fn brute_force(particles: &ParticleData, range: f64, storage_mode: StorageMode) -> Self {
        let positions = particles.positions();
        let simulation_box = particles.simulation_box();
        let range_squared = range * range;
        let pairs = (0..positions.len()).flat_map(move |i| {
            (i + 1..positions.len())
                .filter(move |&k| {
                    simulation_box
                        .displacement(&positions[i], &positions[k])
                        .distance_squared
                        < range_squared
                })
                .map(move |k| (i, k))
        });
        Self::from_pairs(positions.len(), pairs, storage_mode)
    }

    fn from_rows(rows: Vec<Vec<usize>>, storage_mode: StorageMode) -> Self {
        let pitch = rows.iter().map(Vec::len).max().unwrap_or(0);
        let counts = rows.iter().map(Vec::len).collect();
        let mut list = vec![0; rows.len() * pitch];
        for (row, neighbors) in list.chunks_exact_mut(pitch.max(1)).zip(&rows) {
            row[..neighbors.len()].copy_from_slice(neighbors);
        }
        Self::new(storage_mode, counts, pitch, list)
    }

    /// Total number of stored neighbor entries
    pub fn len(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NeighborList for FlatNeighborList {
    fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    fn particle_count(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    fn neighbors(&self, particle: usize) -> &[usize] {
        let start = particle * self.pitch;
        &self.list[start..start + self.counts[particle]]
    }
}
