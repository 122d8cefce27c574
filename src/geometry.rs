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

//! Periodic simulation box and pair displacements.

use crate::Vector3;

/// Axis-aligned, periodic simulation box given by its lower and upper corners.
///
/// # Examples
/// ~~~
/// use eam::{SimulationBox, Vector3};
/// let simulation_box = SimulationBox::cubic(10.0);
/// let pair = simulation_box.displacement(&Vector3::new(4.5, 0.0, 0.0), &Vector3::new(-4.5, 0.0, 0.0));
/// assert_eq!(pair.vector.x, -1.0);
/// assert_eq!(pair.distance_squared, 1.0);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    lo: Vector3,
    hi: Vector3,
    lengths: Vector3,
}

/// Minimum image displacement between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDisplacement {
    /// Displacement vector, 𝒓ᵢ - 𝒓ₖ, folded into the box
    pub vector: Vector3,
    /// Squared length of `vector`
    pub distance_squared: f64,
}

impl SimulationBox {
    /// Create a box from its lower and upper corners.
    ///
    /// # Panics
    /// Panics if any upper bound is not strictly larger than the lower bound.
    pub fn new(lo: Vector3, hi: Vector3) -> Self {
        assert!(
            hi.iter().zip(lo.iter()).all(|(h, l)| h > l),
            "Box upper bounds must exceed the lower bounds"
        );
        Self {
            lo,
            hi,
            lengths: hi - lo,
        }
    }

    /// Cubic box with the given side length, centered at the origin
    pub fn cubic(side: f64) -> Self {
        let half = Vector3::repeat(0.5 * side);
        Self::new(-half, half)
    }

    /// Lower corner
    pub fn lo(&self) -> &Vector3 {
        &self.lo
    }

    /// Upper corner
    pub fn hi(&self) -> &Vector3 {
        &self.hi
    }

    /// Side lengths, (Lx, Ly, Lz)
    pub fn lengths(&self) -> &Vector3 {
        &self.lengths
    }

    /// Volume of the box
    pub fn volume(&self) -> f64 {
        self.lengths.product()
    }

    /// Fold a raw displacement into the box by at most one box length per axis.
    ///
    /// A component at or above the upper bound is shifted down by the side length;
    /// one below the lower bound is shifted up. Images further away than one box
    /// length are *not* wrapped, so this is only valid when neighbors are known to
    /// lie within one box length of each other.
    #[inline]
    pub fn minimum_image(&self, mut delta: Vector3) -> Vector3 {
        for axis in 0..3 {
            if delta[axis] >= self.hi[axis] {
                delta[axis] -= self.lengths[axis];
            } else if delta[axis] < self.lo[axis] {
                delta[axis] += self.lengths[axis];
            }
        }
        delta
    }

    /// Minimum image displacement, 𝒂 - 𝒃, and its squared length
    #[inline]
    pub fn displacement(&self, a: &Vector3, b: &Vector3) -> PairDisplacement {
        let vector = self.minimum_image(a - b);
        PairDisplacement {
            vector,
            distance_squared: vector.norm_squared(),
        }
    }
}
