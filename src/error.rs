use serde::Serialize;
use thiserror::Error;

use crate::math::pauli::QubitId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LatticeError {
    #[error("qubit {0} does not exist in the lattice")]
    NotFound(QubitId),
}

/// Why a proposed pair measurement was left out of a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum Rejection {
    #[error("qubit {0} does not exist in the lattice")]
    OutOfRangeQubit(QubitId),
    #[error("qubits {0} and {1} are not adjacent")]
    NotAdjacent(QubitId, QubitId),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("could not parse batch {input:?}: {reason}")]
    InvalidBatchFormat { input: String, reason: String },
    #[error("lattice needs at least one row and one column, got {rows}x{cols}")]
    EmptyLattice { rows: usize, cols: usize },
    #[error("a {rows}x{cols} lattice has more qubits than fit in a qubit id")]
    LatticeTooLarge { rows: usize, cols: usize },
    #[error("could not read schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),
}
