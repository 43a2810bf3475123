use std::collections::BTreeSet;

use indexmap::IndexSet;
use log::trace;

use crate::lattice::Lattice;
use crate::math::pauli::{Pauli, PauliTerm, QubitId};

/// A combined gauge operator of one type may not stretch across more than
/// this many lattice lines of that type.
const MAX_MERGE_SPAN: usize = 2;

/// Current generating set of the stabilizer group. Kept ordered so every
/// pass over it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilizerGroup {
    generators: BTreeSet<PauliTerm>,
}

impl StabilizerGroup {
    pub fn new() -> Self {
        StabilizerGroup {
            generators: BTreeSet::new(),
        }
    }

    pub fn generators(&self) -> impl Iterator<Item = &PauliTerm> + '_ {
        self.generators.iter()
    }

    pub fn contains(&self, term: &PauliTerm) -> bool {
        self.generators.contains(term)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// First time step: the measured operators become the generators.
    pub fn bootstrap(&mut self, measurements: &[PauliTerm]) {
        self.generators = measurements
            .iter()
            .filter(|m| !m.is_trivial())
            .cloned()
            .collect();
    }

    /// Adds a later batch of measurements. Generators that anti-commute with
    /// a measurement are merged pairwise where the merge stays a valid gauge
    /// product, and dropped otherwise. Finishes with [`Self::simplify`].
    pub fn incorporate(&mut self, lattice: &Lattice, measurements: &[PauliTerm]) {
        let measurements: IndexSet<&PauliTerm> =
            measurements.iter().filter(|m| !m.is_trivial()).collect();
        for m in measurements.iter() {
            self.generators.insert((*m).clone());
        }
        for m in measurements {
            self.resolve_anticommuting(lattice, m);
        }
        self.simplify();
    }

    fn resolve_anticommuting(&mut self, lattice: &Lattice, measurement: &PauliTerm) {
        let basis = measurement
            .uniform_symbol()
            .expect("[StabilizerGroup] measurements must act with a single basis.");
        let qubits: Vec<QubitId> = measurement.support().collect();

        let mut anticommuting: IndexSet<PauliTerm> = self
            .generators
            .iter()
            .filter(|g| *g != measurement && !g.commutes_with(&qubits, basis))
            .cloned()
            .collect();

        while let Some((ix, jx)) = find_mergeable_pair(lattice, &anticommuting) {
            // jx > ix, so removing jx first leaves ix in place.
            let s2 = anticommuting
                .shift_remove_index(jx)
                .expect("pair index in bounds");
            let s1 = anticommuting
                .shift_remove_index(ix)
                .expect("pair index in bounds");
            self.generators.remove(&s1);
            self.generators.remove(&s2);
            let combined = s1.multiply(&s2);
            trace!("merged {} and {} into {}", s1, s2, combined);
            if !combined.is_trivial() {
                self.generators.insert(combined.clone());
                if !combined.commutes_with(&qubits, basis) {
                    anticommuting.insert(combined);
                }
            }
        }

        for stale in anticommuting {
            trace!("measurement {} discards {}", measurement, stale);
            self.generators.remove(&stale);
        }
    }

    /// Factors lighter generators out of heavier ones that contain them,
    /// repeating the ascending-weight pass until nothing changes.
    pub fn simplify(&mut self) {
        loop {
            let reduced = reduce_once(&self.generators);
            if reduced == self.generators {
                break;
            }
            self.generators = reduced;
        }
    }
}

fn reduce_once(generators: &BTreeSet<PauliTerm>) -> BTreeSet<PauliTerm> {
    let mut sorted: Vec<&PauliTerm> = generators.iter().collect();
    sorted.sort_by_key(|g| g.weight());
    let mut reduced: IndexSet<PauliTerm> = IndexSet::new();
    for g in sorted {
        let mut g = g.clone();
        for r in reduced.iter() {
            if r.is_subset_of(&g) {
                g = g.multiply(r);
            }
        }
        if !g.is_trivial() {
            reduced.insert(g);
        }
    }
    reduced.into_iter().collect()
}

/// First pair in `candidates` of the same pure type whose combined support
/// stays within [`MAX_MERGE_SPAN`] columns (Z) or rows (X).
fn find_mergeable_pair(
    lattice: &Lattice,
    candidates: &IndexSet<PauliTerm>,
) -> Option<(usize, usize)> {
    for (ix, s1) in candidates.iter().enumerate() {
        let Some(basis) = s1.uniform_symbol() else {
            continue;
        };
        if basis == Pauli::Y {
            continue;
        }
        for (jx, s2) in candidates.iter().enumerate().skip(ix + 1) {
            if s2.uniform_symbol() != Some(basis) {
                continue;
            }
            let span = match basis {
                Pauli::Z => {
                    let mut cols = lattice.column_span(s1);
                    cols.extend(lattice.column_span(s2));
                    cols.len()
                }
                _ => {
                    let mut rows = lattice.row_span(s1);
                    rows.extend(lattice.row_span(s2));
                    rows.len()
                }
            };
            if span <= MAX_MERGE_SPAN {
                return Some((ix, jx));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::StabilizerGroup;
    use crate::lattice::Lattice;
    use crate::math::pauli::{Pauli, PauliTerm};

    fn z(a: u32, b: u32) -> PauliTerm {
        PauliTerm::two_qubit(a, b, Pauli::Z)
    }

    fn x(a: u32, b: u32) -> PauliTerm {
        PauliTerm::two_qubit(a, b, Pauli::X)
    }

    fn term(pairs: &[(u32, Pauli)]) -> PauliTerm {
        PauliTerm::from_pairs(pairs.iter().copied())
    }

    fn group_of(terms: &[PauliTerm]) -> StabilizerGroup {
        let mut group = StabilizerGroup::new();
        group.bootstrap(terms);
        group
    }

    #[test]
    fn bootstrap_takes_batch_as_is() {
        let batch = vec![z(1, 2), z(3, 4), z(6, 7), z(8, 9), z(1, 2)];
        let group = group_of(&batch);
        assert_eq!(group.len(), 4);
        for t in batch.iter() {
            assert!(group.contains(t));
        }
    }

    #[test]
    fn anticommuting_neighbours_merge_into_plaquette() {
        let lattice = Lattice::new(4, 4);
        let mut group = group_of(&[z(1, 2), z(6, 7)]);
        group.incorporate(&lattice, &[x(1, 6)]);
        let plaquette = term(&[(1, Pauli::Z), (2, Pauli::Z), (6, Pauli::Z), (7, Pauli::Z)]);
        let generators: Vec<PauliTerm> = group.generators().cloned().collect();
        assert_eq!(generators.len(), 2);
        assert!(group.contains(&plaquette));
        assert!(group.contains(&x(1, 6)));
    }

    #[test]
    fn wide_merge_is_refused_and_conflicts_are_dropped() {
        let lattice = Lattice::new(4, 4);
        // Z1Z2 and Z3Z4 both anti-commute with X1X3 but
        // together span four columns.
        let mut group = group_of(&[z(1, 2), z(3, 4), z(11, 12)]);
        let wide_x = term(&[(1, Pauli::X), (3, Pauli::X)]);
        group.incorporate(&lattice, &[wide_x.clone()]);
        assert!(!group.contains(&z(1, 2)));
        assert!(!group.contains(&z(3, 4)));
        assert!(group.contains(&z(11, 12)));
        assert!(group.contains(&wide_x));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn vertical_pairs_in_adjacent_rows_merge() {
        let lattice = Lattice::new(4, 4);
        let mut group = group_of(&[x(1, 6), x(2, 7)]);
        group.incorporate(&lattice, &[z(1, 2)]);
        let merged = term(&[(1, Pauli::X), (2, Pauli::X), (6, Pauli::X), (7, Pauli::X)]);
        assert_eq!(group.len(), 2);
        assert!(group.contains(&merged));
        assert!(group.contains(&z(1, 2)));
    }

    #[test]
    fn vertical_pairs_spanning_three_rows_do_not_merge() {
        let lattice = Lattice::new(4, 4);
        // X1X6 and X7X12 cover rows 0..=2 but only columns 0 and 1, so the
        // X merge has to look at rows.
        let mut group = group_of(&[x(1, 6), x(7, 12)]);
        group.incorporate(&lattice, &[z(6, 7)]);
        let generators: Vec<PauliTerm> = group.generators().cloned().collect();
        assert_eq!(generators, vec![z(6, 7)]);
    }

    #[test]
    fn lone_anticommuting_generator_is_discarded() {
        let lattice = Lattice::new(4, 4);
        let mut group = group_of(&[z(1, 2), z(3, 4)]);
        group.incorporate(&lattice, &[x(1, 6)]);
        assert!(!group.contains(&z(1, 2)));
        assert!(group.contains(&z(3, 4)));
        assert!(group.contains(&x(1, 6)));
    }

    #[test]
    fn remeasuring_the_same_edge_changes_nothing() {
        let lattice = Lattice::new(4, 4);
        let mut group = group_of(&[z(1, 2), x(3, 8)]);
        group.incorporate(&lattice, &[z(1, 2)]);
        assert_eq!(group.len(), 2);
        assert!(group.contains(&z(1, 2)));
        assert!(group.contains(&x(3, 8)));
    }

    #[test]
    fn simplify_factors_out_contained_generators() {
        let mut group = group_of(&[
            z(1, 2),
            term(&[(1, Pauli::Z), (2, Pauli::Z), (6, Pauli::Z), (7, Pauli::Z)]),
        ]);
        group.simplify();
        assert_eq!(group.len(), 2);
        assert!(group.contains(&z(1, 2)));
        assert!(group.contains(&z(6, 7)));
    }

    #[test]
    fn simplify_drops_generators_that_reduce_to_identity() {
        let mut group = group_of(&[
            z(1, 2),
            z(6, 7),
            term(&[(1, Pauli::Z), (2, Pauli::Z), (6, Pauli::Z), (7, Pauli::Z)]),
        ]);
        group.simplify();
        assert_eq!(group.len(), 2);
        assert!(group.contains(&z(1, 2)));
        assert!(group.contains(&z(6, 7)));
    }

    #[test]
    fn simplify_reaches_a_fixed_point() {
        // The weight-four term shrinks to Z1, which then reduces the
        // weight-three term on a second pass.
        let mut group = group_of(&[
            term(&[(1, Pauli::Z), (2, Pauli::Z), (3, Pauli::Z)]),
            term(&[(4, Pauli::Z), (5, Pauli::Z), (6, Pauli::Z)]),
            term(&[(1, Pauli::Z), (4, Pauli::Z), (5, Pauli::Z), (6, Pauli::Z)]),
        ]);
        group.simplify();
        let once = group.clone();
        group.simplify();
        assert_eq!(group, once);
        assert!(group.contains(&term(&[(1, Pauli::Z)])));
        assert!(group.contains(&z(2, 3)));
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn simplify_is_idempotent_on_random_groups() {
        let lattice = Lattice::new(4, 4);
        let mut rng = StdRng::seed_from_u64(3);
        let edges = lattice.edges();
        for _ in 0..50 {
            let mut group = StabilizerGroup::new();
            for step in 0..4 {
                let batch: Vec<PauliTerm> = edges
                    .choose_multiple(&mut rng, 6)
                    .map(|(a, b)| {
                        PauliTerm::two_qubit(*a, *b, lattice.edge_type(*a, *b).unwrap())
                    })
                    .collect();
                if step == 0 {
                    group.bootstrap(&batch);
                } else {
                    group.incorporate(&lattice, &batch);
                }
            }
            let once = group.clone();
            group.simplify();
            assert_eq!(group, once);
            for g in group.generators() {
                assert!(!g.is_trivial());
                for h in group.generators() {
                    if g != h {
                        assert!(!h.is_subset_of(g));
                    }
                }
            }
        }
    }
}
