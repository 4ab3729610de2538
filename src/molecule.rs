/*
Atoms, bonds and species.

The engine owns one contiguous `Vec<Atom>`; every kernel borrows it as a
slice for the duration of a call. Bonds live in the dense `BondGraph`, and
species are derived from it on demand.
*/

pub mod bond_graph;
pub mod species;

use serde::{Deserialize, Serialize};

use crate::elements::Element;
use crate::vec3::Vec3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: usize,
    pub element: Element,
    pub position: Vec3, // A
    pub velocity: Vec3, // A/fs
    pub force: Vec3,    // eV/A, recomputed every step
    pub mass: f64,      // amu
}

impl Atom {
    /// Atom at rest with the tabulated mass of its element.
    pub fn new(id: usize, element: Element, position: Vec3) -> Self {
        Atom {
            id,
            element,
            position,
            velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            mass: element.mass(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub i: usize, // always i < j
    pub j: usize,
    pub order: u8,   // 1, 2 or 3, fixed when the bond forms
    pub length: f64, // current distance in A
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub formula: String,
    pub count: usize,
}

pub fn bond_distance(a1: &Atom, a2: &Atom) -> f64 {
    (a1.position - a2.position).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_takes_element_mass() {
        let test_atom = Atom::new(1, Element::C, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(test_atom.id, 1);
        assert!((test_atom.mass - 12.011).abs() < 1e-12);
        assert_eq!(test_atom.velocity, Vec3::zeros());
    }

    #[test]
    fn test_bond_distance_happy() {
        let atom1 = Atom::new(0, Element::H, Vec3::new(0.0, 0.0, 0.0));
        let atom2 = Atom {
            id: 1,
            position: Vec3::new(3.0, 0.0, 0.0),
            ..atom1.clone()
        };

        let dist = bond_distance(&atom1, &atom2);
        assert!((dist - 3.0).abs() < 1e-6) // happy path
    }

    #[test]
    fn test_atom_json_shape() {
        let atom = Atom::new(4, Element::O, Vec3::new(0.5, 0.0, -1.0));
        let json = serde_json::to_value(&atom).unwrap();
        assert_eq!(json["element"], "O");
        assert_eq!(json["position"], serde_json::json!([0.5, 0.0, -1.0]));
    }
}
