//! Reported-heights samples loaded from CSV.
//!
//! Expected layout: a header row with a `height` column (inches) and an
//! optional `sex` column.
//!
//! ```text
//! sex,height
//! Male,75
//! Female,64
//! Male,70.47244
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::distributions::Normal;
use crate::ecdf::Ecdf;
use crate::error::{ProbError, Result};
use crate::stats::SampleSummary;

pub const INCHES_PER_FOOT: f64 = 12.0;

pub fn feet_to_inches(feet: f64) -> f64 {
    feet * INCHES_PER_FOOT
}

pub fn inches_to_feet(inches: f64) -> f64 {
    inches / INCHES_PER_FOOT
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightRecord {
    pub sex: Option<String>,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    sex: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    height: Option<f64>,
}

/// A sample of height records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heights {
    records: Vec<HeightRecord>,
}

impl Heights {
    pub fn from_records(records: Vec<HeightRecord>) -> Self {
        Self { records }
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading heights");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses CSV from any reader.
    ///
    /// Rows whose height is missing, unparsable or non-finite are skipped
    /// with a warning. Structurally broken CSV is an error.
    ///
    /// # Errors
    /// - [`ProbError::Csv`] on malformed CSV.
    /// - [`ProbError::EmptySample`] if no row carries a usable height.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (row, result) in rdr.deserialize::<RawRecord>().enumerate() {
            let raw = result?;
            match raw.height {
                Some(height) if height.is_finite() => records.push(HeightRecord {
                    sex: raw.sex.filter(|s| !s.is_empty()),
                    height,
                }),
                _ => {
                    skipped += 1;
                    warn!(row = row + 1, "skipping row without a usable height");
                }
            }
        }
        if records.is_empty() {
            return Err(ProbError::EmptySample);
        }
        debug!(records = records.len(), skipped, "loaded heights");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[HeightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Heights, optionally restricted to one sex (case-insensitive).
    pub fn values(&self, sex: Option<&str>) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| match sex {
                None => true,
                Some(want) => r
                    .sex
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(want)),
            })
            .map(|r| r.height)
            .collect()
    }

    /// Distinct sex labels in order of first appearance.
    pub fn groups(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for s in self.records.iter().filter_map(|r| r.sex.as_ref()) {
            if !seen.iter().any(|g| g.eq_ignore_ascii_case(s)) {
                seen.push(s.clone());
            }
        }
        seen
    }

    pub fn summary(&self, sex: Option<&str>) -> Option<SampleSummary> {
        SampleSummary::from_data(&self.values(sex))
    }

    pub fn ecdf(&self, sex: Option<&str>) -> Result<Ecdf> {
        Ecdf::new(&self.values(sex))
    }

    /// Normal with the sample mean and standard deviation of the group.
    pub fn fit_normal(&self, sex: Option<&str>) -> Result<Normal> {
        Normal::fit(&self.values(sex))
    }
}
