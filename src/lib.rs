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

//! # EAM
//!
//! A library for evaluating tabulated embedded-atom method (EAM) potentials.
//!
//! The energy of atom _i_ is
//! $$ E_i = F_{t_i}\left(\sum_{k} \rho_{t_i t_k}(r_{ik})\right) + \frac{1}{2}\sum_k \phi_{t_i t_k}(r_{ik}) $$
//! where _F_ is the embedding function, _ρ_ the electron density contributed by a
//! neighbor and _φ_ a pair potential. All three are read as tables from a
//! DYNAMO `setfl` file ("alloy") or its Finnis-Sinclair variant ("fs").
//!
//! ## Examples
//! ~~~
//! use eam::{EamForceCompute, FlatNeighborList, ParticleData, SimulationBox, StorageMode};
//! use eam::{TableFormat, Vector3};
//!
//! let setfl = "\
//! single element test file
//! made up numbers
//! --
//! 1 Cu
//! 3 1.0 3 1.0 2.5
//! 29 63.546 3.615 fcc
//! 0.0 -1.0 -1.5
//! 1.0 0.5 0.0
//! 2.0 1.0 0.0
//! ";
//! let mut particles = ParticleData::new(SimulationBox::cubic(10.0), ["Cu"]);
//! particles.push(Vector3::new(0.0, 0.0, 0.0), 0);
//! particles.push(Vector3::new(1.5, 0.0, 0.0), 0);
//!
//! let mut eam = EamForceCompute::from_reader(setfl.as_bytes(), TableFormat::Alloy, &particles)?;
//! let mut neighbors = FlatNeighborList::from_pairs(2, [(0, 1)], StorageMode::Half);
//! eam.compute(0, &particles, &mut neighbors)?;
//!
//! let forces = eam.forces();
//! assert_eq!(forces.force[0].x, -forces.force[1].x);
//! # Ok::<(), eam::Error>(())
//! ~~~

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;

mod compute;
mod config;
mod error;
mod geometry;
mod neighbor;
mod particles;
mod reader;
pub mod tables;
#[cfg(test)]
mod testing;

pub use compute::{EamForceCompute, ForceData, PAIR_EAM_ENERGY};
pub use config::EamConfig;
pub use error::{Error, Result};
pub use geometry::{PairDisplacement, SimulationBox};
pub use neighbor::{FlatNeighborList, NeighborList, StorageMode};
pub use particles::{ParticleData, TypeCatalog};
pub use reader::TableFormat;
pub use tables::{EamTables, Element};

/// Largest number of atom types a potential file may declare
pub const MAX_TYPES: usize = 10;

/// Largest number of grid points in any tabulated function
pub const MAX_POINTS: usize = 1_000_000;

/// Defines a cutoff distance
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self) -> f64 {
        self.cutoff().powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self) -> f64;
}

/// Descriptive information about an interaction model
pub trait Info {
    /// Short name of the model, e.g. for use in configuration files
    fn short_name(&self) -> Option<&'static str> {
        None
    }
    /// Long, human readable name of the model
    fn long_name(&self) -> Option<&'static str> {
        None
    }
    /// Reference to the original publication, preferably as a DOI
    fn citation(&self) -> Option<&'static str> {
        None
    }
    /// Link to the citation, if it is a DOI
    fn url(&self) -> Option<String> {
        self.citation()
            .and_then(|c| c.strip_prefix("doi:"))
            .map(|doi| format!("https://doi.org/{}", doi))
    }
}
