use std::{
    collections::BTreeMap,
    fmt::Display,
    ops::Mul,
};

use serde::{Deserialize, Serialize};

pub type QubitId = u32;

/// Non-identity single qubit Pauli. Identity is never stored, it is the
/// absence of a qubit from a [`PauliTerm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// Phase-free product. Equal symbols cancel (`None` is the identity) and
    /// two different symbols give the third, so X·Z = Y but X·Y = Z.
    pub fn mul(&self, rhs: &Pauli) -> Option<Pauli> {
        match (self, rhs) {
            (Pauli::X, Pauli::X) => None,
            (Pauli::X, Pauli::Y) => Some(Pauli::Z),
            (Pauli::X, Pauli::Z) => Some(Pauli::Y),
            (Pauli::Y, Pauli::X) => Some(Pauli::Z),
            (Pauli::Y, Pauli::Y) => None,
            (Pauli::Y, Pauli::Z) => Some(Pauli::X),
            (Pauli::Z, Pauli::X) => Some(Pauli::Y),
            (Pauli::Z, Pauli::Y) => Some(Pauli::X),
            (Pauli::Z, Pauli::Z) => None,
        }
    }
}

impl Display for Pauli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        })
    }
}

/// Colour class of a term as a renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    Identity,
    PureX,
    PureZ,
    Mixed,
}

/// Sparse Pauli operator over the lattice qubits, stored as qubit -> symbol.
/// The map is ordered so equality, hashing and ordering only depend on the
/// set of (qubit, symbol) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PauliTerm(BTreeMap<QubitId, Pauli>);

impl PauliTerm {
    pub fn identity() -> Self {
        PauliTerm(BTreeMap::new())
    }

    /// Panics if a qubit appears twice, that is a caller bug.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (QubitId, Pauli)>) -> Self {
        let mut ops = BTreeMap::new();
        for (qubit, pauli) in pairs {
            let previous = ops.insert(qubit, pauli);
            assert!(
                previous.is_none(),
                "[PauliTerm] qubit {qubit} assigned more than one operator."
            );
        }
        PauliTerm(ops)
    }

    /// The operator measured by a two qubit parity check of the given basis.
    pub fn two_qubit(a: QubitId, b: QubitId, basis: Pauli) -> Self {
        PauliTerm::from_pairs([(a, basis), (b, basis)])
    }

    pub fn support(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QubitId, Pauli)> + '_ {
        self.0.iter().map(|(q, p)| (*q, *p))
    }

    pub fn get(&self, qubit: QubitId) -> Option<Pauli> {
        self.0.get(&qubit).copied()
    }

    pub fn weight(&self) -> usize {
        self.0.len()
    }

    pub fn is_trivial(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the symbol shared by every qubit in the support, `None` for
    /// mixed terms and the identity.
    pub fn uniform_symbol(&self) -> Option<Pauli> {
        let mut symbols = self.0.values();
        let first = *symbols.next()?;
        symbols.all(|p| *p == first).then_some(first)
    }

    pub fn kind(&self) -> TermKind {
        if self.is_trivial() {
            return TermKind::Identity;
        }
        match self.uniform_symbol() {
            Some(Pauli::X) => TermKind::PureX,
            Some(Pauli::Z) => TermKind::PureZ,
            _ => TermKind::Mixed,
        }
    }

    /// Parity test against a single-basis operator acting as `basis` on each
    /// of `qubits`. Counts the qubits where this term is non-identity and
    /// differs from `basis`; an even count commutes.
    pub fn commutes_with(&self, qubits: &[QubitId], basis: Pauli) -> bool {
        let conflicts = qubits
            .iter()
            .filter(|q| matches!(self.0.get(*q), Some(p) if *p != basis))
            .count();
        conflicts % 2 == 0
    }

    /// Every (qubit, symbol) pair of `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &PauliTerm) -> bool {
        self.0.len() <= other.0.len()
            && self
                .0
                .iter()
                .all(|(q, p)| other.0.get(q).is_some_and(|op| op == p))
    }

    /// Qubit-wise [`Pauli::mul`], dropping qubits that cancel. On the X/Z
    /// chains built from measurements a collision always yields `Y`.
    pub fn multiply(&self, other: &PauliTerm) -> PauliTerm {
        let mut ops = self.0.clone();
        for (qubit, pauli) in other.0.iter() {
            match ops.get(qubit).copied() {
                None => {
                    ops.insert(*qubit, *pauli);
                }
                Some(existing) => match existing.mul(pauli) {
                    Some(product) => {
                        ops.insert(*qubit, product);
                    }
                    None => {
                        ops.remove(qubit);
                    }
                },
            }
        }
        PauliTerm(ops)
    }
}

impl Mul<&PauliTerm> for &PauliTerm {
    type Output = PauliTerm;

    fn mul(self, rhs: &PauliTerm) -> Self::Output {
        self.multiply(rhs)
    }
}

impl Display for PauliTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_trivial() {
            return f.write_str("I");
        }
        let mut first = true;
        for (qubit, pauli) in self.0.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", pauli, qubit)?;
            first = false;
        }
        Ok(())
    }
}
