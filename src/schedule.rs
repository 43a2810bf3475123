//! Measurement schedules from the outside world.
//!
//! Batches are written as `"1,2;3,4;..."`, one pair of qubit ids per `;`
//! separated entry. A whole schedule is either a text file with one batch per
//! line or a JSON [`SimulationConfig`].

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::lattice::Lattice;
use crate::math::pauli::QubitId;
use crate::time_step::{StepReport, TimeStepController};

pub type Batch = Vec<(QubitId, QubitId)>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of cells vertically.
    #[serde(default = "default_size")]
    pub rows: usize,
    /// Number of cells horizontally.
    #[serde(default = "default_size")]
    pub cols: usize,
    #[serde(default)]
    pub steps: Vec<Batch>,
}

fn default_size() -> usize {
    4
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            rows: default_size(),
            cols: default_size(),
            steps: Vec::new(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(data: &str) -> Result<Self, ScheduleError> {
        let config: SimulationConfig = serde_json::from_str(data)?;
        config.lattice()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn lattice(&self) -> Result<Lattice, ScheduleError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ScheduleError::EmptyLattice {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if Lattice::qubit_count(self.rows, self.cols).is_none() {
            return Err(ScheduleError::LatticeTooLarge {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(Lattice::new(self.rows, self.cols))
    }

    /// Runs every step in order on a fresh controller.
    pub fn run(&self) -> Result<(TimeStepController, Vec<StepReport>), ScheduleError> {
        let mut controller = TimeStepController::new(self.lattice()?);
        let reports = self
            .steps
            .iter()
            .map(|batch| controller.submit(batch))
            .collect();
        Ok((controller, reports))
    }
}

fn pair_pattern() -> Regex {
    Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*$").expect("pair pattern is valid")
}

fn parse_with(pattern: &Regex, input: &str) -> Result<Batch, ScheduleError> {
    let invalid = |reason: String| ScheduleError::InvalidBatchFormat {
        input: input.to_string(),
        reason,
    };
    let mut batch = Vec::new();
    for entry in input.split(';') {
        if entry.trim().is_empty() {
            continue;
        }
        let captures = pattern
            .captures(entry)
            .ok_or_else(|| invalid(format!("expected `a,b`, found {:?}", entry.trim())))?;
        let mut ids = [0 as QubitId; 2];
        for (ix, id) in ids.iter_mut().enumerate() {
            *id = captures[ix + 1]
                .parse()
                .map_err(|_| invalid(format!("qubit id {} is too large", &captures[ix + 1])))?;
        }
        batch.push((ids[0], ids[1]));
    }
    Ok(batch)
}

pub fn parse_batch(input: &str) -> Result<Batch, ScheduleError> {
    parse_with(&pair_pattern(), input)
}

/// One batch per line. Blank lines and lines starting with `#` are skipped.
pub fn parse_schedule(input: &str) -> Result<Vec<Batch>, ScheduleError> {
    let pattern = pair_pattern();
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| parse_with(&pattern, line))
        .collect()
}
