use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::lattice::{Coordinate, Lattice};
use crate::math::pauli::{Pauli, PauliTerm, QubitId, TermKind};
use crate::stabilizer_group::StabilizerGroup;

/// An accepted two qubit parity measurement together with its basis, which
/// is always derived from the lattice geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Measurement {
    pub qubits: (QubitId, QubitId),
    pub basis: Pauli,
}

impl Measurement {
    pub fn to_term(&self) -> PauliTerm {
        PauliTerm::two_qubit(self.qubits.0, self.qubits.1, self.basis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub accepted: Vec<Measurement>,
    pub rejected: Vec<((QubitId, QubitId), Rejection)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorView {
    pub term: PauliTerm,
    pub label: String,
    pub kind: TermKind,
    pub plaquettes: Vec<Coordinate>,
}

/// Everything a renderer needs to draw the lattice after a time step.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub rows: usize,
    pub cols: usize,
    pub generators: Vec<GeneratorView>,
    pub current: Vec<Measurement>,
    pub previous: Vec<Measurement>,
}

/// Drives the stabilizer group through a sequence of measurement batches.
/// [`TimeStepController::submit`] is the only way to change its state.
#[derive(Debug, Clone)]
pub struct TimeStepController {
    lattice: Lattice,
    group: StabilizerGroup,
    history: Vec<Vec<Measurement>>,
    step: usize,
    bootstrapped: bool,
}

impl TimeStepController {
    pub fn new(lattice: Lattice) -> Self {
        TimeStepController {
            lattice,
            group: StabilizerGroup::new(),
            history: Vec::new(),
            step: 0,
            bootstrapped: false,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn group(&self) -> &StabilizerGroup {
        &self.group
    }

    /// Number of completed time steps.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn history(&self) -> &[Vec<Measurement>] {
        &self.history
    }

    pub fn current_measurements(&self) -> &[Measurement] {
        self.history.last().map(|v| &v[..]).unwrap_or(&[])
    }

    pub fn previous_measurements(&self) -> &[Measurement] {
        match self.history.len() {
            0 | 1 => &[],
            n => &self.history[n - 2],
        }
    }

    /// Generators in their canonical order.
    pub fn current_generators(&self) -> Vec<PauliTerm> {
        self.group.generators().cloned().collect()
    }

    fn validate(&self, a: QubitId, b: QubitId) -> Result<Measurement, Rejection> {
        for q in [a, b] {
            if !self.lattice.contains(q) {
                return Err(Rejection::OutOfRangeQubit(q));
            }
        }
        match self.lattice.edge_type(a, b) {
            Some(basis) => Ok(Measurement {
                qubits: (a, b),
                basis,
            }),
            None => Err(Rejection::NotAdjacent(a, b)),
        }
    }

    pub fn submit(&mut self, batch: &[(QubitId, QubitId)]) -> StepReport {
        self.step += 1;
        debug!("=== Time Step {} ===", self.step);

        let mut accepted = Vec::with_capacity(batch.len());
        let mut rejected = Vec::new();
        for &(a, b) in batch {
            match self.validate(a, b) {
                Ok(m) => accepted.push(m),
                Err(reason) => {
                    warn!("Invalid measurement ({}, {}): {}", a, b, reason);
                    rejected.push(((a, b), reason));
                }
            }
        }

        let terms: Vec<PauliTerm> = accepted.iter().map(Measurement::to_term).collect();
        if !self.bootstrapped {
            if !terms.is_empty() {
                self.group.bootstrap(&terms);
                self.bootstrapped = true;
            }
        } else {
            self.group.incorporate(&self.lattice, &terms);
        }
        for g in self.group.generators() {
            debug!("generator: {}", g);
        }

        self.history.push(accepted.clone());
        StepReport {
            step: self.step,
            accepted,
            rejected,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let generators = self
            .group
            .generators()
            .map(|g| GeneratorView {
                term: g.clone(),
                label: g.to_string(),
                kind: g.kind(),
                plaquettes: self.lattice.covered_plaquettes(g),
            })
            .collect();
        Snapshot {
            step: self.step,
            rows: self.lattice.rows(),
            cols: self.lattice.cols(),
            generators,
            current: self.current_measurements().to_vec(),
            previous: self.previous_measurements().to_vec(),
        }
    }
}
