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

//! Read-only particle snapshot consumed by the force compute.

use crate::{SimulationBox, Vector3};

/// Lookup of the atom types known to a simulation
pub trait TypeCatalog {
    /// Number of distinct atom types
    fn type_count(&self) -> usize;

    /// Type index for a type name, if known
    fn type_by_name(&self, name: &str) -> Option<usize>;
}

impl<S: AsRef<str>> TypeCatalog for [S] {
    fn type_count(&self) -> usize {
        self.len()
    }
    fn type_by_name(&self, name: &str) -> Option<usize> {
        self.iter().position(|s| s.as_ref() == name)
    }
}

impl<S: AsRef<str>> TypeCatalog for Vec<S> {
    fn type_count(&self) -> usize {
        self.as_slice().type_count()
    }
    fn type_by_name(&self, name: &str) -> Option<usize> {
        self.as_slice().type_by_name(name)
    }
}

/// Positions and types of all particles together with the periodic box.
///
/// Type indices refer to `type_names`, which also serves as the [`TypeCatalog`]
/// that potential files are validated against.
#[derive(Debug, Clone)]
pub struct ParticleData {
    simulation_box: SimulationBox,
    type_names: Vec<String>,
    positions: Vec<Vector3>,
    types: Vec<usize>,
}

impl ParticleData {
    /// Create an empty snapshot with the given box and atom type names
    pub fn new<I, S>(simulation_box: SimulationBox, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            simulation_box,
            type_names: type_names.into_iter().map(Into::into).collect(),
            positions: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Append a particle and return its index
    pub fn push(&mut self, position: Vector3, type_id: usize) -> usize {
        self.positions.push(position);
        self.types.push(type_id);
        self.positions.len() - 1
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn simulation_box(&self) -> &SimulationBox {
        &self.simulation_box
    }

    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Mutable positions, e.g. for an integrator moving the particles
    pub fn positions_mut(&mut self) -> &mut [Vector3] {
        &mut self.positions
    }

    pub fn types(&self) -> &[usize] {
        &self.types
    }
}

impl TypeCatalog for ParticleData {
    fn type_count(&self) -> usize {
        self.type_names.len()
    }
    fn type_by_name(&self, name: &str) -> Option<usize> {
        self.type_names.type_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_catalog() {
        let names = ["Cu", "Ag", "Au"];
        assert_eq!(names[..].type_count(), 3);
        assert_eq!(names[..].type_by_name("Ag"), Some(1));
        assert_eq!(names[..].type_by_name("Ni"), None);
    }

    #[test]
    fn test_particle_data() {
        let mut particles = ParticleData::new(SimulationBox::cubic(5.0), ["Ni", "Al"]);
        assert!(particles.is_empty());
        assert_eq!(particles.push(Vector3::zeros(), 1), 0);
        assert_eq!(particles.push(Vector3::new(1.0, 0.0, 0.0), 0), 1);
        assert_eq!(particles.len(), 2);
        assert_eq!(particles.types(), &[1, 0]);
        assert_eq!(particles.type_count(), 2);
        assert_eq!(particles.type_by_name("Al"), Some(1));
        particles.positions_mut()[1].y = 2.0;
        assert_eq!(particles.positions()[1], Vector3::new(1.0, 2.0, 0.0));
    }
}
