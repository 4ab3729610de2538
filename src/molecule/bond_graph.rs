//! Dynamic covalent bond graph.
//!
//! A pair of atoms is either unbonded or bonded with an order in {1, 2, 3}.
//! Bonds form below `form_factor * (r_cov_i + r_cov_j)` when both atoms have
//! spare valence, and break above `break_factor * (r_cov_i + r_cov_j)`.
//! `break_factor > form_factor`, so a freshly formed bond cannot flicker.
//!
//! Membership is stored in a dense `n x n` order matrix so the O(n^2) force
//! loop can test a pair with a single index.

use log::debug;

use super::{Atom, Bond};
use crate::constants::{
    BOND_BREAK_FACTOR, BOND_FORM_FACTOR, BOND_SEED_FACTOR, DOUBLE_BOND_RATIO, TRIPLE_BOND_RATIO,
};
use crate::elements::covalent_radius_sum;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BondRules {
    pub seed_factor: f64,
    pub form_factor: f64,
    pub break_factor: f64,
}

impl Default for BondRules {
    fn default() -> Self {
        BondRules {
            seed_factor: BOND_SEED_FACTOR,
            form_factor: BOND_FORM_FACTOR,
            break_factor: BOND_BREAK_FACTOR,
        }
    }
}

/// Bond order inferred from how compressed the pair is relative to a single bond.
pub fn infer_bond_order(distance: f64, covalent_sum: f64) -> u8 {
    let ratio = distance / covalent_sum;
    if ratio < TRIPLE_BOND_RATIO {
        3
    } else if ratio < DOUBLE_BOND_RATIO {
        2
    } else {
        1
    }
}

#[derive(Clone, Debug)]
pub struct BondGraph {
    n: usize,
    orders: Vec<u8>,   // n * n, symmetric, 0 = unbonded
    lengths: Vec<f64>, // n * n, only meaningful where orders != 0
    valence_used: Vec<u8>,
    rules: BondRules,
}

impl BondGraph {
    pub fn new(n: usize) -> Self {
        Self::with_rules(n, BondRules::default())
    }

    pub fn with_rules(n: usize, rules: BondRules) -> Self {
        BondGraph {
            n,
            orders: vec![0; n * n],
            lengths: vec![0.0; n * n],
            valence_used: vec![0; n],
            rules,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.n
    }

    pub fn rules(&self) -> BondRules {
        self.rules
    }

    pub fn clear(&mut self) {
        self.orders.iter_mut().for_each(|o| *o = 0);
        self.lengths.iter_mut().for_each(|l| *l = 0.0);
        self.valence_used.iter_mut().for_each(|v| *v = 0);
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    #[inline]
    pub fn is_bonded(&self, i: usize, j: usize) -> bool {
        self.orders[self.idx(i, j)] != 0
    }

    pub fn order(&self, i: usize, j: usize) -> Option<u8> {
        match self.orders[self.idx(i, j)] {
            0 => None,
            order => Some(order),
        }
    }

    pub fn bond_count(&self, i: usize) -> u8 {
        self.valence_used[i]
    }

    pub fn len(&self) -> usize {
        self.valence_used.iter().map(|&v| v as usize).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bonds in index order (i ascending, then j ascending).
    pub fn bonds(&self) -> Vec<Bond> {
        let mut out = Vec::with_capacity(self.len());
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let k = self.idx(i, j);
                if self.orders[k] != 0 {
                    out.push(Bond {
                        i,
                        j,
                        order: self.orders[k],
                        length: self.lengths[k],
                    });
                }
            }
        }
        out
    }

    /// Neighbour lists, one per atom.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.n];
        for bond in self.bonds() {
            adj[bond.i].push(bond.j);
            adj[bond.j].push(bond.i);
        }
        adj
    }

    fn has_spare_valence(&self, atoms: &[Atom], i: usize) -> bool {
        self.valence_used[i] < atoms[i].element.max_valence()
    }

    fn set(&mut self, i: usize, j: usize, order: u8, length: f64) {
        let (a, b) = (self.idx(i, j), self.idx(j, i));
        self.orders[a] = order;
        self.orders[b] = order;
        self.lengths[a] = length;
        self.lengths[b] = length;
    }

    fn try_form(&mut self, atoms: &[Atom], i: usize, j: usize, factor: f64) -> bool {
        if i == j || self.is_bonded(i, j) {
            return false;
        }
        if !self.has_spare_valence(atoms, i) || !self.has_spare_valence(atoms, j) {
            return false;
        }
        let covalent_sum = covalent_radius_sum(atoms[i].element, atoms[j].element);
        let r = (atoms[j].position - atoms[i].position).norm();
        if r >= factor * covalent_sum {
            return false;
        }
        let order = infer_bond_order(r, covalent_sum);
        self.set(i, j, order, r);
        self.valence_used[i] += 1;
        self.valence_used[j] += 1;
        true
    }

    fn break_bond(&mut self, i: usize, j: usize) {
        if !self.is_bonded(i, j) {
            return;
        }
        self.set(i, j, 0, 0.0);
        self.valence_used[i] -= 1;
        self.valence_used[j] -= 1;
    }

    fn form_pass(&mut self, atoms: &[Atom], factor: f64) -> usize {
        let mut formed = 0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                // i may fill up partway through its row
                if !self.has_spare_valence(atoms, i) {
                    break;
                }
                if self.try_form(atoms, i, j, factor) {
                    debug!(
                        "bond formed {}{}-{}{} order {}",
                        atoms[i].element,
                        i,
                        atoms[j].element,
                        j,
                        self.orders[self.idx(i, j)]
                    );
                    formed += 1;
                }
            }
        }
        formed
    }

    /// Initial detection from raw geometry: formation only, with the looser seed factor.
    pub fn seed(&mut self, atoms: &[Atom]) -> usize {
        debug_assert_eq!(atoms.len(), self.n);
        self.form_pass(atoms, self.rules.seed_factor)
    }

    /// One rebonding pass: break stretched bonds first, then form new ones.
    /// Returns `(broken, formed)`.
    pub fn update(&mut self, atoms: &[Atom]) -> (usize, usize) {
        debug_assert_eq!(atoms.len(), self.n);
        let mut broken = 0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if !self.is_bonded(i, j) {
                    continue;
                }
                let r = (atoms[j].position - atoms[i].position).norm();
                let limit =
                    self.rules.break_factor * covalent_radius_sum(atoms[i].element, atoms[j].element);
                if r > limit {
                    debug!(
                        "bond broken {}{}-{}{} at {:.3} A",
                        atoms[i].element, i, atoms[j].element, j, r
                    );
                    self.break_bond(i, j);
                    broken += 1;
                } else {
                    let order = self.orders[self.idx(i, j)];
                    self.set(i, j, order, r);
                }
            }
        }
        let formed = self.form_pass(atoms, self.rules.form_factor);
        (broken, formed)
    }
}
