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

//! Loader for DYNAMO `setfl` potential files.
//!
//! After three comment lines the file is a stream of whitespace separated tokens:
//!
//! ~~~text
//! <n_types> <name_1> ... <name_n>
//! <n_rho> <d_rho> <n_r> <d_r> <r_cut>
//! for each type:
//!     <atomic_number> <mass> <lattice_constant> <lattice>
//!     <n_rho values of F(ρ)>
//!     <one (alloy) or n_types (fs) blocks of n_r values of ρ(r)>
//! for k in 0..n_types, j in 0..=k:
//!     <n_r values of r·φ(r)>
//! ~~~

use crate::tables::{layout, EamTables, Element, Grid, Table};
use crate::{Error, Result, TypeCatalog, MAX_POINTS, MAX_TYPES};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Layout of the electron density section of a potential file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum TableFormat {
    /// `setfl`: one density function per element, independent of the host type
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "alloy"))]
    Alloy,
    /// Finnis-Sinclair: one density function per ordered pair of types
    #[cfg_attr(
        feature = "serde",
        serde(rename = "fs", alias = "finnis-sinclair")
    )]
    FinnisSinclair,
}

impl TableFormat {
    /// Number of density blocks listed under each element
    pub const fn density_blocks_per_element(&self, n_types: usize) -> usize {
        match self {
            Self::Alloy => 1,
            Self::FinnisSinclair => n_types,
        }
    }
}

/// Legacy integer code, `0` for alloy and `1` for Finnis-Sinclair
impl TryFrom<i32> for TableFormat {
    type Error = Error;
    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Alloy),
            1 => Ok(Self::FinnisSinclair),
            _ => Err(Error::format(format!("unknown table format code {}", code))),
        }
    }
}

impl FromStr for TableFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alloy" | "setfl" => Ok(Self::Alloy),
            "fs" | "finnis-sinclair" => Ok(Self::FinnisSinclair),
            _ => Err(Error::format(format!("unknown table format '{}'", s))),
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alloy => write!(f, "alloy"),
            Self::FinnisSinclair => write!(f, "fs"),
        }
    }
}

impl EamTables {
    /// Load tables from a potential file.
    ///
    /// Every type of `catalog` must be declared exactly once in the file; the
    /// returned tables are indexed by the catalog's type indices.
    pub fn from_file(
        path: impl AsRef<Path>,
        format: TableFormat,
        catalog: &(impl TypeCatalog + ?Sized),
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = parse(BufReader::new(file), format, catalog)?;
        log::info!("Loaded EAM tables from {}", path.display());
        Ok(tables)
    }

    /// Load tables from any reader, e.g. the bytes of an in-memory string
    pub fn from_reader(
        reader: impl Read,
        format: TableFormat,
        catalog: &(impl TypeCatalog + ?Sized),
    ) -> Result<Self> {
        parse(BufReader::new(reader), format, catalog)
    }
}

/// Whitespace separated tokens, read one line at a time
struct Tokens<R> {
    reader: R,
    line: String,
    position: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            position: 0,
        }
    }

    /// Read a whole line, e.g. a comment, discarding unread tokens of the current one
    fn line(&mut self) -> Result<Option<String>> {
        self.position = 0;
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        let line = self.line.trim_end().to_string();
        self.line.clear();
        Ok(Some(line))
    }

    /// Next token, or `None` at the end of the input
    fn next_token(&mut self) -> Result<Option<&str>> {
        loop {
            let rest = &self.line[self.position..];
            let skipped = rest.len() - rest.trim_start().len();
            if skipped < rest.len() {
                let start = self.position + skipped;
                let end = self.line[start..]
                    .find(char::is_whitespace)
                    .map_or(self.line.len(), |length| start + length);
                self.position = end;
                return Ok(Some(&self.line[start..end]));
            }
            self.line.clear();
            self.position = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }

    /// Single header value; running out is a format error
    fn header<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.next_token()? {
            Some(token) => parse_token(token, what),
            None => Err(Error::format(format!("missing {}", what))),
        }
    }

    /// Next `count` tokens as owned strings; running out is a truncation error
    fn record(&mut self, section: &str, count: usize) -> Result<Vec<String>> {
        let mut tokens = Vec::with_capacity(count);
        while tokens.len() < count {
            match self.next_token()? {
                Some(token) => tokens.push(token.to_string()),
                None => return Err(truncated(section, count, tokens.len())),
            }
        }
        Ok(tokens)
    }

    /// Next `count` table values
    fn values(&mut self, section: &str, count: usize) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(count);
        while values.len() < count {
            match self.next_token()? {
                Some(token) => values.push(parse_token(token, section)?),
                None => return Err(truncated(section, count, values.len())),
            }
        }
        Ok(values)
    }
}

fn truncated(section: &str, expected: usize, found: usize) -> Error {
    Error::TruncatedFile {
        section: section.to_string(),
        expected,
        found,
    }
}

fn parse_token<T: FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::format(format!("unexpected '{}' in {}", token, what)))
}

fn check_points(points: i64, what: &str) -> Result<usize> {
    if !(1..=MAX_POINTS as i64).contains(&points) {
        return Err(Error::format(format!(
            "{} must be in [1, {}], got {}",
            what, MAX_POINTS, points
        )));
    }
    Ok(points as usize)
}

fn check_positive(value: f64, what: &str) -> Result<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(Error::format(format!(
            "{} must be positive and finite, got {}",
            what, value
        )));
    }
    Ok(value)
}

/// Map the type names declared in the file onto catalog types
fn resolve_types(names: &[&str], catalog: &(impl TypeCatalog + ?Sized)) -> Result<Vec<usize>> {
    let resolved = names
        .iter()
        .map(|name| {
            catalog.type_by_name(name).ok_or_else(|| {
                Error::format(format!("type '{}' is not known to the simulation", name))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(name) = names.iter().duplicates().next() {
        return Err(Error::format(format!("type '{}' is declared twice", name)));
    }
    if resolved.len() != catalog.type_count() {
        return Err(Error::format(format!(
            "file declares {} types but the simulation has {}; every type needs tables",
            resolved.len(),
            catalog.type_count()
        )));
    }
    Ok(resolved)
}

fn parse(
    reader: impl BufRead,
    format: TableFormat,
    catalog: &(impl TypeCatalog + ?Sized),
) -> Result<EamTables> {
    let mut tokens = Tokens::new(reader);
    let mut comments = Vec::with_capacity(3);
    for _ in 0..3 {
        comments.extend(tokens.line()?);
    }

    let n_types: i64 = tokens.header("number of types")?;
    if !(1..=MAX_TYPES as i64).contains(&n_types) {
        return Err(Error::format(format!(
            "number of types must be in [1, {}], got {}",
            MAX_TYPES, n_types
        )));
    }
    let n_types = n_types as usize;
    let names = (0..n_types)
        .map(|_| tokens.header::<String>("type name"))
        .collect::<Result<Vec<_>>>()?;
    let resolved = resolve_types(&names.iter().map(String::as_str).collect_vec(), catalog)?;

    let n_rho = check_points(tokens.header("n_rho")?, "n_rho")?;
    let d_rho = check_positive(tokens.header("d_rho")?, "d_rho")?;
    let n_r = check_points(tokens.header("n_r")?, "n_r")?;
    let d_r = check_positive(tokens.header("d_r")?, "d_r")?;
    let cutoff = check_positive(tokens.header("r_cut")?, "r_cut")?;

    let r_grid = Grid::new(n_r, d_r);
    let rho_grid = Grid::new(n_rho, d_rho);
    let mut embedding = Table::zeros(rho_grid, layout::embedding_block_count(n_types));
    let mut density = Table::zeros(r_grid, layout::density_block_count(n_types));
    let mut pair = Table::zeros(r_grid, layout::pair_block_count(n_types));
    let mut elements = vec![None; n_types];

    for (name, &type_id) in names.iter().zip(&resolved) {
        let record = tokens.record(&format!("element header of {}", name), 4)?;
        // the atomic number is informational; accept e.g. "29.0" as well
        let atomic_number: f64 = parse_token(&record[0], "atomic number")?;
        elements[type_id] = Some(Element {
            name: name.clone(),
            atomic_number: atomic_number as u32,
            mass: parse_token(&record[1], "mass")?,
            lattice_constant: parse_token(&record[2], "lattice constant")?,
            lattice: record[3].clone(),
        });

        let values = tokens.values(&format!("embedding function of {}", name), n_rho)?;
        embedding.set_values(layout::embedding_block(type_id), &values);

        match format {
            TableFormat::Alloy => {
                let values = tokens.values(&format!("electron density of {}", name), n_r)?;
                let first = layout::density_block(n_types, type_id, 0);
                density.set_values(first, &values);
                for target in 1..n_types {
                    density.copy_block(first, layout::density_block(n_types, type_id, target));
                }
            }
            TableFormat::FinnisSinclair => {
                for (other, &target) in names.iter().zip(&resolved) {
                    let section = format!("electron density of {} for {}", name, other);
                    let values = tokens.values(&section, n_r)?;
                    density.set_values(layout::density_block(n_types, type_id, target), &values);
                }
            }
        }
    }

    for (k, j) in (0..n_types).flat_map(|k| (0..=k).map(move |j| (k, j))) {
        let section = format!("pair potential {}-{}", names[k], names[j]);
        let values = tokens.values(&section, n_r)?;
        pair.set_values(layout::pair_block(n_types, resolved[k], resolved[j]), &values);
    }

    let elements = elements.into_iter().flatten().collect_vec();
    debug_assert_eq!(elements.len(), n_types);

    log::info!(
        "EAM {} tables for {}: {} x {} in rho, {} x {} in r, cutoff {}",
        format,
        elements.iter().map(|e| e.name.as_str()).join(", "),
        n_rho,
        d_rho,
        n_r,
        d_r,
        cutoff
    );
    Ok(EamTables::new(comments, elements, cutoff, embedding, density, pair))
}
