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

use crate::TableFormat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for constructing an [`crate::EamForceCompute`].
///
/// With the `serde` feature this can be read from e.g. JSON or YAML, where the
/// format defaults to `alloy`:
///
/// ~~~json
/// { "file": "Cu_mishin1.eam.alloy", "format": "alloy" }
/// ~~~
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct EamConfig {
    /// Path to the potential file
    #[cfg_attr(feature = "serde", serde(alias = "filename"))]
    pub file: PathBuf,
    #[cfg_attr(feature = "serde", serde(default))]
    pub format: TableFormat,
}

impl EamConfig {
    pub fn new(file: impl Into<PathBuf>, format: TableFormat) -> Self {
        Self {
            file: file.into(),
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing, EamForceCompute, Error};
    use std::io::Write;

    #[test]
    fn test_from_config() {
        let setfl = testing::two_type_ramp();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", setfl).unwrap();
        let config = EamConfig::new(file.path(), TableFormat::Alloy);
        let eam = EamForceCompute::from_config(&config, &["B", "A"][..]).unwrap();
        assert_eq!(eam.tables().elements()[0].name, "B");

        let config = EamConfig::new("missing.eam.fs", TableFormat::FinnisSinclair);
        let result = EamForceCompute::from_config(&config, &["A", "B"][..]);
        assert!(matches!(result, Err(Error::FileOpen { .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        let config: EamConfig =
            serde_json::from_str(r#"{ "file": "NiAl.eam.fs", "format": "fs" }"#).unwrap();
        assert_eq!(
            config,
            EamConfig::new("NiAl.eam.fs", TableFormat::FinnisSinclair)
        );

        let config: EamConfig = serde_json::from_str(r#"{ "filename": "Cu.eam.alloy" }"#).unwrap();
        assert_eq!(config.format, TableFormat::Alloy);

        assert!(serde_json::from_str::<EamConfig>(r#"{ "file": "a", "cutoff": 5.0 }"#).is_err());

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<EamConfig>(&json).unwrap(), config);
    }
}
