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

//! Error type shared by table loading and force evaluation.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias using the crate [`enum@Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while loading EAM tables or evaluating forces.
///
/// Loading errors are fatal for construction and no partially filled tables are
/// ever returned. Evaluation errors abort the current step before any output
/// buffer is modified.
#[derive(Debug, Error)]
pub enum Error {
    /// The potential file could not be opened or read.
    #[error("cannot load EAM file '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Potential data could not be read from a stream.
    #[error("cannot read EAM data: {0}")]
    Io(#[from] std::io::Error),

    /// The potential file violates a structural constraint.
    #[error("invalid EAM file format: {0}")]
    Format(String),

    /// The potential file ended inside the tabulated data.
    #[error("EAM file is truncated: expected {expected} values for {section}, found {found}")]
    TruncatedFile {
        /// Table being read when the file ended
        section: String,
        expected: usize,
        found: usize,
    },

    /// A log quantity was requested that this compute does not provide.
    #[error("'{0}' is not a valid log quantity for the EAM force compute")]
    InvalidLogQuantity(String),

    /// The neighbor list could not be brought up to date.
    #[error("neighbor list update failed: {0}")]
    NeighborList(#[from] anyhow::Error),

    /// A neighbor index points outside the particle range.
    #[error("particle {particle} lists neighbor {neighbor}, but there are only {count} particles")]
    InvalidNeighbor {
        particle: usize,
        neighbor: usize,
        count: usize,
    },

    /// The particle type names differ from the types the tables were loaded for.
    #[error("particle types [{}] do not match the EAM table types [{}]", particles.join(", "), tables.join(", "))]
    TypeCatalogMismatch {
        particles: Vec<String>,
        tables: Vec<String>,
    },

    /// A particle has a type that the loaded tables do not describe.
    #[error("particle {particle} has type {type_id}, but the tables describe {count} types")]
    InvalidParticleType {
        particle: usize,
        type_id: usize,
        count: usize,
    },

    /// The neighbor list was built for a different number of particles.
    #[error("neighbor list holds {neighbor_list} particles, but {particles} were given")]
    ParticleCountMismatch {
        particles: usize,
        neighbor_list: usize,
    },
}

impl Error {
    pub(crate) fn format(details: impl Into<String>) -> Self {
        Self::Format(details.into())
    }
}
