//! Vertex lattice of a Bacon-Shor code.
//!
//! A code with `rows x cols` cells has `(rows + 1) x (cols + 1)` qubits on
//! its vertices, numbered `1..=num_qubits` in row-major order. Vertical
//! neighbours are coupled by XX gauge measurements and horizontal neighbours
//! by ZZ gauge measurements.

use std::fmt::Display;

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::LatticeError;
use crate::math::pauli::{Pauli, PauliTerm, QubitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    /// Number of cells vertically.
    rows: usize,
    /// Number of cells horizontally.
    cols: usize,
}

impl Lattice {
    pub fn new(rows: usize, cols: usize) -> Self {
        Lattice { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Qubit count of a `rows x cols` cell lattice, `None` if the ids would
    /// not fit in a [`QubitId`].
    pub fn qubit_count(rows: usize, cols: usize) -> Option<usize> {
        let count = rows.checked_add(1)?.checked_mul(cols.checked_add(1)?)?;
        (count <= QubitId::MAX as usize).then_some(count)
    }

    pub fn num_qubits(&self) -> usize {
        (self.rows + 1) * (self.cols + 1)
    }

    pub fn contains(&self, qubit: QubitId) -> bool {
        qubit >= 1 && (qubit as usize) <= self.num_qubits()
    }

    pub fn coordinate_of(&self, qubit: QubitId) -> Result<Coordinate, LatticeError> {
        if !self.contains(qubit) {
            return Err(LatticeError::NotFound(qubit));
        }
        let ix = qubit as usize - 1;
        Ok(Coordinate {
            row: ix / (self.cols + 1),
            col: ix % (self.cols + 1),
        })
    }

    pub fn qubit_at(&self, row: usize, col: usize) -> Option<QubitId> {
        if row > self.rows || col > self.cols {
            return None;
        }
        Some((row * (self.cols + 1) + col + 1) as QubitId)
    }

    /// Manhattan distance exactly one. Out of range qubits are never adjacent.
    pub fn is_adjacent(&self, a: QubitId, b: QubitId) -> bool {
        match (self.coordinate_of(a), self.coordinate_of(b)) {
            (Ok(pa), Ok(pb)) => pa.row.abs_diff(pb.row) + pa.col.abs_diff(pb.col) == 1,
            _ => false,
        }
    }

    /// Basis of the parity check on the edge `(a, b)`: `X` for a vertical
    /// edge, `Z` for a horizontal one, `None` if the qubits are not neighbours.
    pub fn edge_type(&self, a: QubitId, b: QubitId) -> Option<Pauli> {
        if !self.is_adjacent(a, b) {
            return None;
        }
        let pa = self.coordinate_of(a).ok()?;
        let pb = self.coordinate_of(b).ok()?;
        if pa.col == pb.col {
            Some(Pauli::X)
        } else {
            Some(Pauli::Z)
        }
    }

    /// All edges of the lattice, horizontal ones first, each in row-major order.
    pub fn edges(&self) -> Vec<(QubitId, QubitId)> {
        let mut edges = Vec::with_capacity(2 * self.num_qubits());
        for row in 0..=self.rows {
            for col in 0..self.cols {
                if let (Some(a), Some(b)) = (self.qubit_at(row, col), self.qubit_at(row, col + 1)) {
                    edges.push((a, b));
                }
            }
        }
        for row in 0..self.rows {
            for col in 0..=self.cols {
                if let (Some(a), Some(b)) = (self.qubit_at(row, col), self.qubit_at(row + 1, col)) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    /// Distinct rows touched by the support of `term`. Qubits outside the
    /// lattice are ignored.
    pub fn row_span(&self, term: &PauliTerm) -> FxHashSet<usize> {
        term.support()
            .filter_map(|q| self.coordinate_of(q).ok())
            .map(|c| c.row)
            .collect()
    }

    pub fn column_span(&self, term: &PauliTerm) -> FxHashSet<usize> {
        term.support()
            .filter_map(|q| self.coordinate_of(q).ok())
            .map(|c| c.col)
            .collect()
    }

    /// Cells whose four corner qubits are all in the support of `term`,
    /// identified by the coordinate of their top-left corner.
    pub fn covered_plaquettes(&self, term: &PauliTerm) -> Vec<Coordinate> {
        let support: FxHashSet<QubitId> = term.support().collect();
        let mut cells = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let corners = [
                    self.qubit_at(row, col),
                    self.qubit_at(row, col + 1),
                    self.qubit_at(row + 1, col),
                    self.qubit_at(row + 1, col + 1),
                ];
                if corners
                    .iter()
                    .all(|q| q.is_some_and(|q| support.contains(&q)))
                {
                    cells.push(Coordinate { row, col });
                }
            }
        }
        cells
    }
}

impl Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.num_qubits().to_string().len();
        for row in 0..=self.rows {
            for col in 0..=self.cols {
                if let Some(q) = self.qubit_at(row, col) {
                    write!(f, "{:>width$} ", q, width = width)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
