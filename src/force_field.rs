/*
Force evaluation over the whole atom arena.

Each unordered pair gets exactly one kernel, chosen by bond membership:
Morse when bonded, soft-core repulsion otherwise. The confinement wall adds a
one-body term per atom. The result is a pure function of positions, elements
and the bond graph; forces are overwritten, never accumulated across calls.
*/

pub mod confinement;
pub mod potentials;

use itertools::Itertools;

use crate::molecule::bond_graph::BondGraph;
use crate::molecule::Atom;
use crate::vec3::Vec3;
use confinement::SphericalWall;
use potentials::{bonded_pair, nonbonded_pair};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PotentialBreakdown {
    pub bonded: f64,
    pub nonbonded: f64,
    pub confinement: f64,
}

impl PotentialBreakdown {
    pub fn total(&self) -> f64 {
        self.bonded + self.nonbonded + self.confinement
    }
}

/// Recompute `atom.force` for every atom and return the potential energy terms.
pub fn compute_forces_detailed(
    atoms: &mut [Atom],
    bonds: &BondGraph,
    wall: &SphericalWall,
) -> PotentialBreakdown {
    let mut energy = PotentialBreakdown::default();
    for atom in atoms.iter_mut() {
        atom.force = Vec3::zeros();
    }

    for (i, j) in (0..atoms.len()).tuple_combinations() {
        let (a, b) = (&atoms[i], &atoms[j]);
        let interaction = if bonds.is_bonded(i, j) {
            let pair = bonded_pair(&a.position, &b.position, a.element, b.element);
            energy.bonded += pair.energy;
            pair
        } else {
            match nonbonded_pair(&a.position, &b.position, a.element, b.element) {
                Some(pair) => {
                    energy.nonbonded += pair.energy;
                    pair
                }
                None => continue,
            }
        };
        atoms[i].force += interaction.force;
        atoms[j].force -= interaction.force;
    }

    if wall.is_active() {
        for atom in atoms.iter_mut() {
            let conf = wall.evaluate(&atom.position);
            atom.force += conf.force;
            energy.confinement += conf.energy;
        }
    }

    energy
}

pub fn compute_forces(atoms: &mut [Atom], bonds: &BondGraph, wall: &SphericalWall) -> f64 {
    compute_forces_detailed(atoms, bonds, wall).total()
}

pub fn max_force(atoms: &[Atom]) -> f64 {
    atoms
        .iter()
        .map(|a| a.force.norm())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;

    fn water_and_hydrogen() -> Vec<Atom> {
        vec![
            Atom::new(0, Element::O, Vec3::new(0.0, 0.0, 0.0)),
            Atom::new(1, Element::H, Vec3::new(0.80, 0.55, 0.0)),
            Atom::new(2, Element::H, Vec3::new(-0.74, 0.62, 0.1)),
            Atom::new(3, Element::H, Vec3::new(2.5, -1.0, 0.4)),
            Atom::new(4, Element::H, Vec3::new(3.2, -1.1, 0.5)),
        ]
    }

    #[test]
    fn test_total_force_vanishes_without_wall() {
        let mut atoms = water_and_hydrogen();
        let mut graph = BondGraph::new(atoms.len());
        graph.seed(&atoms);
        assert_eq!(graph.len(), 3);

        let wall = SphericalWall::new(10.0, 0.0);
        let energy = compute_forces(&mut atoms, &graph, &wall);
        assert!(energy.is_finite());
        let net = atoms.iter().fold(Vec3::zeros(), |acc, a| acc + a.force);
        assert!(net.norm() < 1e-9);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let mut atoms = water_and_hydrogen();
        for atom in atoms.iter_mut() {
            atom.position.x += 8.5;
        }
        let mut graph = BondGraph::new(atoms.len());
        graph.seed(&atoms);
        let wall = SphericalWall::new(10.0, 2.0);
        let detailed = compute_forces_detailed(&mut atoms, &graph, &wall);
        assert!(detailed.confinement > 0.0);
        assert!(detailed.bonded < 0.0);
        assert!(detailed.nonbonded > 0.0);
        let total = compute_forces(&mut atoms, &graph, &wall);
        assert!((total - detailed.total()).abs() < 1e-12);
    }

    #[test]
    fn test_forces_match_energy_gradient() {
        let mut atoms = water_and_hydrogen();
        let mut graph = BondGraph::new(atoms.len());
        graph.seed(&atoms);
        let wall = SphericalWall::new(10.0, 0.0);
        compute_forces(&mut atoms, &graph, &wall);
        let analytic = atoms[1].force;

        let h = 1e-6;
        for dim in 0..3 {
            let mut probe = atoms.clone();
            probe[1].position[dim] += h;
            let e_plus = compute_forces(&mut probe, &graph, &wall);
            probe[1].position[dim] -= 2.0 * h;
            let e_minus = compute_forces(&mut probe, &graph, &wall);
            let numeric = -(e_plus - e_minus) / (2.0 * h);
            assert!((numeric - analytic[dim]).abs() < 1e-4, "dim {dim}");
        }
    }

    #[test]
    fn test_forces_are_overwritten() {
        let mut atoms = water_and_hydrogen();
        let graph = BondGraph::new(atoms.len());
        let wall = SphericalWall::new(10.0, 0.0);
        compute_forces(&mut atoms, &graph, &wall);
        let first = atoms[0].force;
        compute_forces(&mut atoms, &graph, &wall);
        assert!((atoms[0].force - first).norm() < 1e-12);
        assert!(max_force(&atoms) > 0.0);
    }
}
