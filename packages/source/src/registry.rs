//! Dataset registry: loads all dataset definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// Identifier of the dataset used when none is requested explicitly.
pub const DEFAULT_DATASET_ID: &str = "nypd_shooting_historic";

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    (
        "nypd_shooting_historic",
        include_str!("../datasets/nypd_shooting_historic.toml"),
    ),
    (
        "nypd_shooting_ytd",
        include_str!("../datasets/nypd_shooting_ytd.toml"),
    ),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 2;

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a dataset definition by identifier.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if no definition has the id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id() == id)
        .ok_or_else(|| SourceError::UnknownDataset(id.to_owned()))
}
