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

//! Potential files and particle setups shared by the unit tests.

use crate::{ParticleData, SimulationBox, TableFormat, Vector3};
use itertools::Itertools;
use std::cell::RefCell;
use std::fmt;
use std::sync::Once;

/// Contents of a potential file, with elements and pair blocks in file order
#[derive(Debug, Clone)]
pub struct Setfl {
    pub names: Vec<String>,
    pub format: TableFormat,
    pub n_rho: usize,
    pub d_rho: f64,
    pub n_r: usize,
    pub d_r: f64,
    pub r_cut: f64,
    /// One block per element
    pub embedding: Vec<Vec<f64>>,
    /// One (alloy) or `n_types` (fs) blocks per element
    pub density: Vec<Vec<Vec<f64>>>,
    /// Blocks for k = 0..n, j = 0..=k
    pub pair: Vec<Vec<f64>>,
}

/// Mass written for the element at `index` in the file
pub fn mass(index: usize) -> f64 {
    10.0 * (index + 1) as f64
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    for chunk in values.chunks(5) {
        writeln!(f, "{}", chunk.iter().join(" "))?;
    }
    Ok(())
}

impl fmt::Display for Setfl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generated for unit tests")?;
        writeln!(f, "format: {}", self.format)?;
        writeln!(f, "--")?;
        writeln!(f, "{} {}", self.names.len(), self.names.join(" "))?;
        writeln!(
            f,
            "{} {} {} {} {}",
            self.n_rho, self.d_rho, self.n_r, self.d_r, self.r_cut
        )?;
        let elements = self.embedding.iter().zip(&self.density);
        for (index, (embedding, density)) in elements.enumerate() {
            writeln!(f, "{} {} 3.5 fcc", index + 1, mass(index))?;
            write_values(f, embedding)?;
            for block in density {
                write_values(f, block)?;
            }
        }
        for block in &self.pair {
            write_values(f, block)?;
        }
        Ok(())
    }
}

/// Two types with linear tables that can be evaluated by hand.
///
/// Grids are `d_rho = d_r = 1` with two points each. Every embedding function
/// is `F(ρ) = ρ` and every density `ρ(r) = r`; the only non-zero pair table is the
/// unlike pair with `r·φ(r) = 1 + 2r`.
pub fn two_type_ramp() -> Setfl {
    Setfl {
        names: vec!["A".to_string(), "B".to_string()],
        format: TableFormat::Alloy,
        n_rho: 2,
        d_rho: 1.0,
        n_r: 2,
        d_r: 1.0,
        r_cut: 2.0,
        embedding: vec![vec![0.0, 1.0]; 2],
        density: vec![vec![vec![0.0, 1.0]]; 2],
        pair: vec![vec![0.0, 0.0], vec![1.0, 3.0], vec![0.0, 0.0]],
    }
}

/// Cutoff of [`smooth`]
pub const SMOOTH_CUTOFF: f64 = 3.5;

/// Type names used by [`smooth`] and [`lattice`]
pub const SMOOTH_NAMES: [&str; 3] = ["Ni", "Al", "Cu"];

fn sample(points: usize, spacing: f64, f: impl Fn(f64) -> f64) -> Vec<f64> {
    (0..points).map(|i| f(i as f64 * spacing)).collect()
}

/// Quadratic taper reaching zero with zero slope at the cutoff
fn taper(r: f64) -> f64 {
    (SMOOTH_CUTOFF - r).max(0.0).powi(2)
}

/// Finely tabulated analytic functions for up to three types.
///
/// Type `t` has `F(ρ) = (1 + t/10)(ρ² - 2ρ)`, densities `∝ exp(-r)` and
/// Morse-like pair potentials, all tapered to zero at [`SMOOTH_CUTOFF`].
pub fn smooth(n_types: usize, format: TableFormat) -> Setfl {
    let (n_rho, d_rho) = (10_001, 0.001);
    let (n_r, d_r) = (3_501, 0.001);

    let embedding = (0..n_types)
        .map(|t| {
            let scale = 1.0 + 0.1 * t as f64;
            sample(n_rho, d_rho, |rho| scale * (rho * rho - 2.0 * rho))
        })
        .collect();

    let density_block = |t: usize, j: usize| {
        let scale = 1.0 + 0.2 * t as f64 + 0.05 * j as f64;
        sample(n_r, d_r, move |r| scale * taper(r) * (-r).exp())
    };
    let density = (0..n_types)
        .map(|t| {
            (0..format.density_blocks_per_element(n_types))
                .map(|j| density_block(t, j))
                .collect()
        })
        .collect();

    let pair = (0..n_types)
        .flat_map(|k| (0..=k).map(move |j| (k, j)))
        .map(|(k, j)| {
            let depth = 0.5 + 0.1 * (k + j) as f64;
            sample(n_r, d_r, move |r| {
                let x = (-1.5 * (r - 1.9)).exp();
                r * depth * taper(r) * (x * x - 2.0 * x)
            })
        })
        .collect();

    Setfl {
        names: SMOOTH_NAMES[..n_types].iter().map(|s| s.to_string()).collect(),
        format,
        n_rho,
        d_rho,
        n_r,
        d_r,
        r_cut: SMOOTH_CUTOFF,
        embedding,
        density,
        pair,
    }
}

/// Slightly distorted 4×4×4 simple cubic lattice with spacing 1.8 in a periodic
/// box of side 7.2; particle types cycle through the first `n_types` names.
pub fn lattice(n_types: usize) -> ParticleData {
    let (cells, spacing) = (4, 1.8);
    let side = cells as f64 * spacing;
    let names = SMOOTH_NAMES[..n_types].to_vec();
    let mut particles = ParticleData::new(SimulationBox::cubic(side), names);
    let sites = (0..cells)
        .cartesian_product(0..cells)
        .cartesian_product(0..cells)
        .map(|((x, y), z)| Vector3::new(x as f64, y as f64, z as f64));
    for (index, site) in sites.enumerate() {
        let jitter =
            Vector3::from_fn(|axis, _| 0.1 * (1.3 * index as f64 + 2.1 * axis as f64).sin());
        let position =
            (site + Vector3::repeat(0.5)) * spacing - Vector3::repeat(0.5 * side) + jitter;
        particles.push(position, index % n_types);
    }
    particles
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(log::Level, String)>>> = RefCell::new(None);
}

/// Logger recording messages of threads inside [`capture_logs`]
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|captured| {
            if let Some(records) = captured.borrow_mut().as_mut() {
                records.push((record.level(), record.args().to_string()));
            }
        });
    }

    fn flush(&self) {}
}

/// Run `f` and return the log records it emitted on the current thread
pub fn capture_logs(f: impl FnOnce()) -> Vec<(log::Level, String)> {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if log::set_logger(&CaptureLogger).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    f();
    CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default())
}
