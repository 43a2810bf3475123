pub mod error;
pub mod lattice;
pub mod math;
pub mod schedule;
pub mod stabilizer_group;
pub mod time_step;

pub use error::{LatticeError, Rejection, ScheduleError};
pub use lattice::{Coordinate, Lattice};
pub use math::pauli::{Pauli, PauliTerm, QubitId, TermKind};
pub use stabilizer_group::StabilizerGroup;
pub use time_step::{Measurement, Snapshot, StepReport, TimeStepController};
