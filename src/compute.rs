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

//! # Force evaluation
//!
//! Forces are evaluated in three passes over the neighbor list:
//!
//! 1. Electron density at each particle, $\rho_i = \sum_k \rho_{t_i t_k}(r_{ik})$.
//! 2. Embedding energy $F_{t_i}(\rho_i)$ and its slope $F'_i$.
//! 3. Pair forces from
//!    $$ \frac{dE}{dr} = F'_i \rho'_{t_i t_k}(r) + F'_k \rho'_{t_k t_i}(r) + \phi'_{t_i t_k}(r) $$
//!    with $\phi = (r\phi)/r$ taken from the pair table.
//!
//! With a half neighbor list every pair is visited once and both particles are
//! updated (Newton's third law). With a full list every pair is visited from both
//! ends and each visit only writes to its own particle, so passes 1 and 3 run in
//! parallel.

use crate::geometry::PairDisplacement;
use crate::tables::{Bin, EamTables};
use crate::{
    Cutoff, EamConfig, Error, Info, NeighborList, ParticleData, Result, StorageMode, TableFormat,
    TypeCatalog, Vector3,
};
use rayon::prelude::*;
use std::io::Read;
use std::path::Path;

/// Name of the log quantity holding the total potential energy
pub const PAIR_EAM_ENERGY: &str = "pair_eam_energy";

/// Per-particle output of a force evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceData {
    pub force: Vec<Vector3>,
    /// Potential energy attributed to each particle
    pub energy: Vec<f64>,
    /// Trace of the virial attributed to each particle, divided by three
    pub virial: Vec<f64>,
}

impl ForceData {
    fn reset(&mut self, n: usize) {
        self.force.clear();
        self.force.resize(n, Vector3::zeros());
        self.energy.clear();
        self.energy.resize(n, 0.0);
        self.virial.clear();
        self.virial.resize(n, 0.0);
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    /// Sum of the per-particle virials
    pub fn total_virial(&self) -> f64 {
        self.virial.iter().sum()
    }
}

/// Force, energy and virial contributed to one particle by one neighbor
#[derive(Debug, Clone, Copy)]
struct PairContribution {
    force: Vector3,
    energy: f64,
    virial: f64,
}

impl std::ops::Add for PairContribution {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            force: self.force + other.force,
            energy: self.energy + other.energy,
            virial: self.virial + other.virial,
        }
    }
}

impl Default for PairContribution {
    fn default() -> Self {
        Self {
            force: Vector3::zeros(),
            energy: 0.0,
            virial: 0.0,
        }
    }
}

/// Particle properties reused between passes
#[derive(Debug, Clone, Default)]
struct Scratch {
    density: Vec<f64>,
    embedding_derivative: Vec<f64>,
}

impl Scratch {
    fn reset(&mut self, n: usize) {
        self.density.clear();
        self.density.resize(n, 0.0);
        self.embedding_derivative.clear();
        self.embedding_derivative.resize(n, 0.0);
    }
}

/// Tabulated embedded-atom method force compute.
///
/// Owns the tables loaded at construction and per-particle buffers that are
/// reused between steps.
#[derive(Debug, Clone)]
pub struct EamForceCompute {
    tables: EamTables,
    scratch: Scratch,
    output: ForceData,
    /// Densities beyond the embedding grid have been reported
    density_warned: bool,
}

impl EamForceCompute {
    pub fn from_tables(tables: EamTables) -> Self {
        Self {
            tables,
            scratch: Scratch::default(),
            output: ForceData::default(),
            density_warned: false,
        }
    }

    /// Load a potential file with types resolved against `catalog`
    pub fn from_file(
        path: impl AsRef<Path>,
        format: TableFormat,
        catalog: &(impl TypeCatalog + ?Sized),
    ) -> Result<Self> {
        EamTables::from_file(path, format, catalog).map(Self::from_tables)
    }

    /// Load potential data from a reader with types resolved against `catalog`
    pub fn from_reader(
        reader: impl Read,
        format: TableFormat,
        catalog: &(impl TypeCatalog + ?Sized),
    ) -> Result<Self> {
        EamTables::from_reader(reader, format, catalog).map(Self::from_tables)
    }

    pub fn from_config(config: &EamConfig, catalog: &(impl TypeCatalog + ?Sized)) -> Result<Self> {
        Self::from_file(&config.file, config.format, catalog)
    }

    /// Evaluate forces, energies and virials for the current particle positions.
    ///
    /// The neighbor list is updated first. Pairs at or beyond the cutoff are ignored;
    /// coincident particles give non-finite results. If the particles or the
    /// neighbor list are inconsistent with each other or with the tables, an error
    /// is returned and the previous output is left untouched.
    pub fn compute<N>(
        &mut self,
        timestep: u64,
        particles: &ParticleData,
        neighbors: &mut N,
    ) -> Result<()>
    where
        N: NeighborList + ?Sized,
    {
        neighbors.update(timestep, particles)?;
        let neighbors: &N = neighbors;
        self.validate(particles, neighbors)?;

        let n = particles.len();
        self.scratch.reset(n);
        self.output.reset(n);

        let step = Step {
            tables: &self.tables,
            particles,
            neighbors,
            cutoff_squared: self.tables.cutoff_squared(),
        };
        let scratch = &mut self.scratch;
        step.accumulate_density(&mut scratch.density);
        let beyond = step.embed(
            &scratch.density,
            &mut scratch.embedding_derivative,
            &mut self.output.energy,
        );
        step.pair_forces(&scratch.embedding_derivative, &mut self.output);

        if beyond > 0 {
            let level = if self.density_warned {
                log::Level::Debug
            } else {
                log::Level::Warn
            };
            log::log!(
                level,
                "step {}: {} particles have electron densities beyond the tabulated range (max. {})",
                timestep,
                beyond,
                self.tables.rho_grid().last_point()
            );
            self.density_warned = true;
        }

        log::debug!(
            "EAM step {}: {} particles ({:?} list), energy {}, virial {}",
            timestep,
            n,
            neighbors.storage_mode(),
            self.total_energy(),
            self.output.total_virial()
        );
        Ok(())
    }

    fn validate<N: NeighborList + ?Sized>(
        &self,
        particles: &ParticleData,
        neighbors: &N,
    ) -> Result<()> {
        let count = particles.len();
        if neighbors.particle_count() != count {
            return Err(Error::ParticleCountMismatch {
                particles: count,
                neighbor_list: neighbors.particle_count(),
            });
        }
        let table_names = self.tables.elements().iter().map(|e| &e.name);
        if !particles.type_names().iter().eq(table_names) {
            return Err(Error::TypeCatalogMismatch {
                particles: particles.type_names().to_vec(),
                tables: self.tables.elements().iter().map(|e| e.name.clone()).collect(),
            });
        }
        let n_types = self.tables.type_count();
        if let Some((particle, &type_id)) = particles
            .types()
            .iter()
            .enumerate()
            .find(|&(_, &type_id)| type_id >= n_types)
        {
            return Err(Error::InvalidParticleType {
                particle,
                type_id,
                count: n_types,
            });
        }
        for particle in 0..count {
            let invalid = neighbors.neighbors(particle).iter().find(|&&k| k >= count);
            if let Some(&neighbor) = invalid {
                return Err(Error::InvalidNeighbor {
                    particle,
                    neighbor,
                    count,
                });
            }
        }
        Ok(())
    }

    /// Output of the last successful [`EamForceCompute::compute`]
    pub fn forces(&self) -> &ForceData {
        &self.output
    }

    /// Sum of the per-particle potential energies
    pub fn total_energy(&self) -> f64 {
        self.output.energy.iter().sum()
    }

    pub fn tables(&self) -> &EamTables {
        &self.tables
    }

    /// Masses from the potential file, in simulation type order
    pub fn masses(&self) -> Vec<f64> {
        self.tables.elements().iter().map(|e| e.mass).collect()
    }

    /// Names of the quantities available through [`EamForceCompute::log_value`]
    pub fn provided_log_quantities(&self) -> &'static [&'static str] {
        &[PAIR_EAM_ENERGY]
    }

    /// Evaluate the forces and return the requested log quantity
    pub fn log_value<N>(
        &mut self,
        name: &str,
        timestep: u64,
        particles: &ParticleData,
        neighbors: &mut N,
    ) -> Result<f64>
    where
        N: NeighborList + ?Sized,
    {
        if name != PAIR_EAM_ENERGY {
            return Err(Error::InvalidLogQuantity(name.to_string()));
        }
        self.compute(timestep, particles, neighbors)?;
        Ok(self.total_energy())
    }
}

impl Cutoff for EamForceCompute {
    fn cutoff(&self) -> f64 {
        self.tables.cutoff()
    }
}

impl Info for EamForceCompute {
    fn short_name(&self) -> Option<&'static str> {
        Some("eam")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Tabulated embedded-atom method")
    }
    fn citation(&self) -> Option<&'static str> {
        Some("doi:10.1103/PhysRevB.29.6443")
    }
}

/// Pair geometry within the cutoff
struct Pair {
    displacement: PairDisplacement,
    distance: f64,
    bin: Bin,
}

/// Read-only state shared by the passes of one step
struct Step<'a, N: ?Sized> {
    tables: &'a EamTables,
    particles: &'a ParticleData,
    neighbors: &'a N,
    cutoff_squared: f64,
}

impl<'a, N: NeighborList + ?Sized> Step<'a, N> {
    fn full_list(&self) -> bool {
        self.neighbors.storage_mode() == StorageMode::Full
    }

    #[inline]
    fn pair(&self, i: usize, k: usize) -> Option<Pair> {
        let positions = self.particles.positions();
        let displacement = self
            .particles
            .simulation_box()
            .displacement(&positions[i], &positions[k]);
        if displacement.distance_squared >= self.cutoff_squared {
            return None;
        }
        let distance = displacement.distance_squared.sqrt();
        Some(Pair {
            displacement,
            distance,
            bin: self.tables.r_grid().locate(distance),
        })
    }

    /// Pass 1: electron density at every particle
    fn accumulate_density(&self, density: &mut [f64]) {
        let types = self.particles.types();
        if self.full_list() {
            density.par_iter_mut().enumerate().for_each(|(i, rho)| {
                *rho = self
                    .neighbors
                    .neighbors(i)
                    .iter()
                    .filter_map(|&k| {
                        let pair = self.pair(i, k)?;
                        Some(self.tables.density_at(types[i], types[k], pair.bin).value)
                    })
                    .sum();
            });
        } else {
            for i in 0..density.len() {
                for &k in self.neighbors.neighbors(i) {
                    if let Some(pair) = self.pair(i, k) {
                        density[i] += self.tables.density_at(types[i], types[k], pair.bin).value;
                        density[k] += self.tables.density_at(types[k], types[i], pair.bin).value;
                    }
                }
            }
        }
    }

    /// Pass 2: embedding energy and its slope at every particle.
    ///
    /// Returns the number of particles with a density beyond the embedding grid.
    fn embed(
        &self,
        density: &[f64],
        embedding_derivative: &mut [f64],
        energy: &mut [f64],
    ) -> usize {
        let types = self.particles.types();
        embedding_derivative
            .par_iter_mut()
            .zip(energy.par_iter_mut())
            .enumerate()
            .for_each(|(i, (derivative, energy))| {
                let embedding = self.tables.embedding_at(types[i], density[i]);
                *energy += embedding.value;
                *derivative = embedding.derivative;
            });

        let rho_max = self.tables.rho_grid().last_point();
        density.par_iter().filter(|&&rho| rho > rho_max).count()
    }

    /// Pass 3 contribution to particle `i` from neighbor `k`
    #[inline]
    fn pair_contribution(
        &self,
        embedding_derivative: &[f64],
        i: usize,
        k: usize,
    ) -> Option<PairContribution> {
        let pair = self.pair(i, k)?;
        let types = self.particles.types();
        let (type_i, type_k) = (types[i], types[k]);

        let r_phi = self.tables.pair_at(type_i, type_k, pair.bin);
        let inv_r = pair.distance.recip();
        let pair_energy = r_phi.value * inv_r;
        let pair_derivative = (r_phi.derivative - pair_energy) * inv_r;

        let density_i = self.tables.density_at(type_i, type_k, pair.bin);
        let density_k = self.tables.density_at(type_k, type_i, pair.bin);
        let de_dr = embedding_derivative[i] * density_i.derivative
            + embedding_derivative[k] * density_k.derivative
            + pair_derivative;
        let pair_force = -de_dr * inv_r;

        Some(PairContribution {
            force: pair.displacement.vector * pair_force,
            energy: 0.5 * pair_energy,
            virial: pair.displacement.distance_squared * pair_force / 6.0,
        })
    }

    /// Pass 3: pair forces, pair energies and virials
    fn pair_forces(&self, embedding_derivative: &[f64], output: &mut ForceData) {
        if self.full_list() {
            output
                .force
                .par_iter_mut()
                .zip(output.energy.par_iter_mut())
                .zip(output.virial.par_iter_mut())
                .enumerate()
                .for_each(|(i, ((force, energy), virial))| {
                    let sum = self
                        .neighbors
                        .neighbors(i)
                        .iter()
                        .filter_map(|&k| self.pair_contribution(embedding_derivative, i, k))
                        .fold(PairContribution::default(), |sum, c| sum + c);
                    *force += sum.force;
                    *energy += sum.energy;
                    *virial += sum.virial;
                });
        } else {
            for i in 0..output.len() {
                for &k in self.neighbors.neighbors(i) {
                    if let Some(c) = self.pair_contribution(embedding_derivative, i, k) {
                        output.force[i] += c.force;
                        output.energy[i] += c.energy;
                        output.virial[i] += c.virial;
                        output.force[k] -= c.force;
                        output.energy[k] += c.energy;
                        output.virial[k] += c.virial;
                    }
                }
            }
        }
    }
}
