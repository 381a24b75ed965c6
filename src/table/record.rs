use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Value of the `_comment` field written into every table file
pub const RECORD_COMMENT: &str = "polylut piecewise polynomial lookup table";

/// Coefficients of one table entry, keyed by their index as a string
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryRecord {
    /// `"j" -> c_j`
    pub coefs: BTreeMap<String, f64>,
}

/// Persisted form of a lookup table.
///
/// Every number is stored as `f64`; `f32` tables widen exactly, so reading a file back
/// reproduces the table bit for bit.
///
/// ```json
/// {
///   "_comment": "...",
///   "name": "UniformCubicHermiteTable",
///   "minArg": 0.0, "maxArg": 1.0, "stepSize": 0.5,
///   "order": 4, "dataSize": 96,
///   "numIntervals": 2, "numTableEntries": 3, "tableMaxArg": 1.0,
///   "transfer_function_coefs": [0.0, 2.0, 0.0, 0.0],
///   "table": { "0": { "coefs": { "0": 1.0, "1": 0.5, ... } }, ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    /// Free-form note
    #[serde(rename = "_comment", default)]
    pub comment: String,

    /// Canonical table kind name
    pub name: String,

    /// Requested lower bound
    #[serde(rename = "minArg")]
    pub min_arg: f64,

    /// Requested upper bound
    #[serde(rename = "maxArg")]
    pub max_arg: f64,

    /// Grid spacing in parameter space
    #[serde(rename = "stepSize")]
    pub step_size: f64,

    /// Reported order of the table
    pub order: usize,

    /// Coefficient storage in bytes
    #[serde(rename = "dataSize")]
    pub data_size: usize,

    /// Number of subintervals
    #[serde(rename = "numIntervals")]
    pub num_intervals: usize,

    /// Number of stored entries, sentinels included
    #[serde(rename = "numTableEntries")]
    pub num_table_entries: usize,

    /// Right edge of the last subinterval
    #[serde(rename = "tableMaxArg")]
    pub table_max_arg: f64,

    /// Hashed inverse transfer cubic; the identity map for uniform tables
    pub transfer_function_coefs: [f64; 4],

    /// `"i" -> entry i`
    pub table: BTreeMap<String, EntryRecord>,
}

impl TableRecord {
    /// Serializes to pretty-printed JSON
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if a value cannot be represented (non-finite numbers).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a record from JSON
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if the text is not a table record.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the record to `path`
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a record from `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Coefficients of entry `i`, in index order, if present
    pub fn entry(&self, i: usize) -> Option<Vec<f64>> {
        let entry = self.table.get(&i.to_string())?;
        (0..entry.coefs.len())
            .map(|j| entry.coefs.get(&j.to_string()).copied())
            .collect()
    }
}
