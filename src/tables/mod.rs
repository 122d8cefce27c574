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

//! # Tabulated EAM functions
//!
//! Storage for the embedding function, _F(ρ)_, the electron density, _ρ(r)_, and the
//! pair potential, _r·φ(r)_, on uniform grids. Each sample carries the forward
//! difference slope to the next sample so that a lookup is a single linear
//! interpolation:
//!
//! $$ f(x) = f_i + f'_i \cdot (x - x_i), \qquad f'_i = \frac{f_{i+1} - f_i}{\Delta x} $$
//!
//! The last sample of every block has zero slope; arguments at or beyond the last
//! grid point therefore evaluate to the last tabulated value.

pub mod layout;

use crate::Cutoff;
use itertools::Itertools;

/// Tabulated value and its forward-difference slope
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub derivative: f64,
}

/// Uniform grid starting at zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    points: usize,
    spacing: f64,
    inv_spacing: f64,
}

/// Interpolation base point on a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// Index of the base sample
    pub index: usize,
    /// Distance past the base sample
    pub offset: f64,
}

impl Grid {
    /// # Panics
    /// Panics if `points` is zero.
    pub fn new(points: usize, spacing: f64) -> Self {
        assert!(points > 0, "Grid needs at least one point");
        Self {
            points,
            spacing,
            inv_spacing: spacing.recip(),
        }
    }

    /// Number of grid points
    pub fn points(&self) -> usize {
        self.points
    }

    /// Distance between grid points
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Position of the last grid point
    pub fn last_point(&self) -> f64 {
        (self.points - 1) as f64 * self.spacing
    }

    /// Find the base sample for interpolating at `x`.
    ///
    /// The index is clamped to the last grid point. Negative (and NaN) arguments map
    /// to the first point with a negative (NaN) offset.
    #[inline]
    pub fn locate(&self, x: f64) -> Bin {
        let position = x * self.inv_spacing;
        let index = (position as usize).min(self.points - 1);
        Bin {
            index,
            offset: (position - index as f64) * self.spacing,
        }
    }
}

/// Equally long blocks of samples sharing one grid
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    grid: Grid,
    samples: Vec<Sample>,
}

impl Table {
    /// Table of `blocks` zero-filled blocks
    pub(crate) fn zeros(grid: Grid, blocks: usize) -> Self {
        Self {
            grid,
            samples: vec![Sample::default(); grid.points * blocks],
        }
    }

    /// Overwrite the values of one block; slopes are set by [`Table::differentiate`]
    pub(crate) fn set_values(&mut self, block: usize, values: &[f64]) {
        let points = self.grid.points;
        let start = layout::sample_offset(block, points, 0);
        for (sample, &value) in self.samples[start..start + points].iter_mut().zip(values) {
            sample.value = value;
        }
    }

    /// Copy the values of one block into another
    pub(crate) fn copy_block(&mut self, from: usize, to: usize) {
        let points = self.grid.points;
        let source = layout::sample_offset(from, points, 0);
        let target = layout::sample_offset(to, points, 0);
        self.samples.copy_within(source..source + points, target);
    }

    /// Forward-difference slopes within each block; the last sample gets zero
    pub(crate) fn differentiate(&mut self) {
        let spacing = self.grid.spacing;
        for block in self.samples.chunks_exact_mut(self.grid.points) {
            let slopes = block
                .iter()
                .tuple_windows()
                .map(|(current, next)| (next.value - current.value) / spacing)
                .collect_vec();
            for (sample, slope) in block.iter_mut().zip(slopes.into_iter().chain([0.0])) {
                sample.derivative = slope;
            }
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of blocks
    pub fn block_count(&self) -> usize {
        self.samples.len() / self.grid.points
    }

    /// Samples of one block
    pub fn block(&self, block: usize) -> &[Sample] {
        let start = layout::sample_offset(block, self.grid.points, 0);
        &self.samples[start..start + self.grid.points]
    }

    /// All samples, block after block
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Interpolated value and slope of a block at a located grid position
    #[inline]
    pub fn interpolate(&self, block: usize, bin: Bin) -> Sample {
        let sample = self.samples[layout::sample_offset(block, self.grid.points, bin.index)];
        Sample {
            value: sample.value + sample.derivative * bin.offset,
            derivative: sample.derivative,
        }
    }

    /// Interpolated value and slope of a block at `x`
    #[inline]
    pub fn evaluate(&self, block: usize, x: f64) -> Sample {
        self.interpolate(block, self.grid.locate(x))
    }
}

/// Per-type record from the potential file header
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Type name as given in the file
    pub name: String,
    pub atomic_number: u32,
    pub mass: f64,
    /// Informational only
    pub lattice_constant: f64,
    /// Lattice structure, e.g. "fcc"; informational only
    pub lattice: String,
}

/// Complete set of EAM tables, indexed by simulation type.
///
/// Created once by the loader and immutable afterwards; all lookups take `&self`
/// and the tables may be shared freely between threads.
#[derive(Debug, Clone)]
pub struct EamTables {
    comments: Vec<String>,
    elements: Vec<Element>,
    cutoff: f64,
    embedding: Table,
    density: Table,
    pair: Table,
}

impl EamTables {
    /// Assemble tables from raw values and compute all slopes.
    ///
    /// `elements` must be in simulation type order, with the table blocks laid out
    /// as described in [`layout`].
    pub(crate) fn new(
        comments: Vec<String>,
        elements: Vec<Element>,
        cutoff: f64,
        mut embedding: Table,
        mut density: Table,
        mut pair: Table,
    ) -> Self {
        embedding.differentiate();
        density.differentiate();
        pair.differentiate();
        Self {
            comments,
            elements,
            cutoff,
            embedding,
            density,
            pair,
        }
    }

    /// Number of atom types
    pub fn type_count(&self) -> usize {
        self.elements.len()
    }

    /// Header comment lines of the potential file
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Element records in simulation type order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Grid of the embedding function, in electron density
    pub fn rho_grid(&self) -> &Grid {
        self.embedding.grid()
    }

    /// Grid of the density and pair tables, in distance
    pub fn r_grid(&self) -> &Grid {
        self.density.grid()
    }

    /// Embedding function table, one block per type
    pub fn embedding(&self) -> &Table {
        &self.embedding
    }

    /// Electron density table, one block per ordered type pair
    pub fn density(&self) -> &Table {
        &self.density
    }

    /// Pair table holding r·φ(r), one block per unordered type pair
    pub fn pair(&self) -> &Table {
        &self.pair
    }

    /// Embedding energy and its slope for a type at electron density `rho`
    #[inline]
    pub fn embedding_at(&self, type_id: usize, rho: f64) -> Sample {
        self.embedding.evaluate(layout::embedding_block(type_id), rho)
    }

    /// Density contribution at an atom of `type_i` from a neighbor of `type_j`
    #[inline]
    pub fn density_at(&self, type_i: usize, type_j: usize, bin: Bin) -> Sample {
        self.density.interpolate(
            layout::density_block(self.type_count(), type_i, type_j),
            bin,
        )
    }

    /// Interpolated r·φ(r) between two types
    #[inline]
    pub fn pair_at(&self, type_a: usize, type_b: usize, bin: Bin) -> Sample {
        self.pair
            .interpolate(layout::pair_block(self.type_count(), type_a, type_b), bin)
    }
}

impl Cutoff for EamTables {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}
