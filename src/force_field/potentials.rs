// -- pair kernels
//
// Every kernel returns (V(r), dV/dr). The force on atom i from atom j is
// dV/dr * r_hat_ij with r_hat_ij pointing from i to j, and atom j receives
// the exact negation.

use crate::constants::{
    HARD_CORE_RADIUS, HARD_CORE_STIFFNESS, PAIR_EPSILON, REPULSION_CUTOFF, REPULSION_EPSILON,
    REPULSION_SIGMA_SCALE,
};
use crate::elements::{morse_parameters, Element, MorseParameters};
use crate::vec3::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PairInteraction {
    pub force: Vec3, // on atom i, eV/A
    pub energy: f64, // eV
}

/// V(r) = De (1 - e^(-alpha (r - re)))^2 - De
pub fn morse_potential(r: f64, p: &MorseParameters) -> (f64, f64) {
    let e = (-p.width * (r - p.equilibrium_distance)).exp();
    let one_minus = 1.0 - e;
    let energy = p.dissociation_energy * one_minus * one_minus - p.dissociation_energy;
    let derivative = 2.0 * p.dissociation_energy * p.width * one_minus * e;
    (energy, derivative)
}

/// V(r) = eps (sigma / r)^8, purely repulsive.
pub fn soft_core_repulsion(r: f64, sigma: f64) -> (f64, f64) {
    let sr2 = (sigma / r) * (sigma / r);
    let sr4 = sr2 * sr2;
    let energy = REPULSION_EPSILON * sr4 * sr4;
    (energy, -8.0 * energy / r)
}

pub fn repulsion_sigma(a: Element, b: Element) -> f64 {
    REPULSION_SIGMA_SCALE * (a.vdw_radius() + b.vdw_radius())
}

/// Below the hard-core radius the kernel is continued linearly from its
/// boundary value and slope, with a stiff quadratic `k (r_min - r)^2` on top.
/// V and dV/dr are continuous at `r_min`.
pub fn with_hard_core<F>(r: f64, kernel: F) -> (f64, f64)
where
    F: Fn(f64) -> (f64, f64),
{
    if r >= HARD_CORE_RADIUS {
        return kernel(r);
    }
    let (v0, dv0) = kernel(HARD_CORE_RADIUS);
    let overlap = HARD_CORE_RADIUS - r;
    (
        v0 - dv0 * overlap + HARD_CORE_STIFFNESS * overlap * overlap,
        dv0 - 2.0 * HARD_CORE_STIFFNESS * overlap,
    )
}

fn along_pair(r_ij: &Vec3, r: f64, derivative: f64) -> Vec3 {
    if r < PAIR_EPSILON {
        return Vec3::zeros();
    }
    r_ij * (derivative / r)
}

/// Morse interaction for a bonded pair.
pub fn bonded_pair(pos_i: &Vec3, pos_j: &Vec3, elem_i: Element, elem_j: Element) -> PairInteraction {
    let r_ij = pos_j - pos_i;
    let r = r_ij.norm();
    let params = morse_parameters(elem_i, elem_j);
    let (energy, derivative) = with_hard_core(r, |x| morse_potential(x, &params));
    PairInteraction {
        force: along_pair(&r_ij, r, derivative),
        energy,
    }
}

/// Soft-core repulsion for a non-bonded pair, `None` beyond the cutoff.
pub fn nonbonded_pair(
    pos_i: &Vec3,
    pos_j: &Vec3,
    elem_i: Element,
    elem_j: Element,
) -> Option<PairInteraction> {
    let r_ij = pos_j - pos_i;
    let r = r_ij.norm();
    if r > REPULSION_CUTOFF {
        return None;
    }
    let sigma = repulsion_sigma(elem_i, elem_j);
    let (energy, derivative) = with_hard_core(r, |x| soft_core_repulsion(x, sigma));
    Some(PairInteraction {
        force: along_pair(&r_ij, r, derivative),
        energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;

    fn numeric_derivative<F: Fn(f64) -> (f64, f64)>(f: F, r: f64) -> f64 {
        let h = 1e-6;
        (f(r + h).0 - f(r - h).0) / (2.0 * h)
    }

    #[test]
    fn test_morse_minimum_at_equilibrium() {
        let p = morse_parameters(Element::H, Element::H);
        let (v, dv) = morse_potential(p.equilibrium_distance, &p);
        assert!((v + p.dissociation_energy).abs() < 1e-12);
        assert!(dv.abs() < 1e-12);
    }

    #[test]
    fn test_morse_derivative_matches_energy() {
        let p = morse_parameters(Element::C, Element::O);
        for &r in &[0.9, 1.2, 1.43, 1.8, 2.5] {
            let (_, dv) = morse_potential(r, &p);
            let numeric = numeric_derivative(|x| morse_potential(x, &p), r);
            assert!((dv - numeric).abs() < 1e-5, "r = {r}");
        }
    }

    #[test]
    fn test_morse_force_direction() {
        let pi = Vec3::zeros();
        // stretched: i is pulled toward j (+x)
        let stretched = bonded_pair(&pi, &Vec3::new(1.0, 0.0, 0.0), Element::H, Element::H);
        assert!(stretched.force.x > 0.0);
        // compressed: i is pushed away from j (-x)
        let compressed = bonded_pair(&pi, &Vec3::new(0.5, 0.0, 0.0), Element::H, Element::H);
        assert!(compressed.force.x < 0.0);
    }

    #[test]
    fn test_repulsion_is_repulsive_and_cut_off() {
        let pi = Vec3::zeros();
        let near = nonbonded_pair(&pi, &Vec3::new(0.0, 2.0, 0.0), Element::O, Element::H).unwrap();
        assert!(near.energy > 0.0);
        assert!(near.force.y < 0.0);
        assert!(nonbonded_pair(&pi, &Vec3::new(0.0, 5.01, 0.0), Element::O, Element::H).is_none());
    }

    #[test]
    fn test_repulsion_derivative_matches_energy() {
        let sigma = repulsion_sigma(Element::C, Element::N);
        for &r in &[1.0, 2.0, 3.5] {
            let (_, dv) = soft_core_repulsion(r, sigma);
            let numeric = numeric_derivative(|x| soft_core_repulsion(x, sigma), r);
            assert!((dv - numeric).abs() < 1e-4 * dv.abs().max(1.0), "r = {r}");
        }
    }

    #[test]
    fn test_hard_core_continuous_and_finite() {
        let p = morse_parameters(Element::H, Element::H);
        let kernel = |x| morse_potential(x, &p);
        let inside = with_hard_core(HARD_CORE_RADIUS - 1e-9, kernel);
        let outside = with_hard_core(HARD_CORE_RADIUS + 1e-9, kernel);
        assert!((inside.0 - outside.0).abs() < 1e-6);
        assert!((inside.1 - outside.1).abs() < 1e-4);

        let pair = bonded_pair(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 0.05), Element::H, Element::H);
        assert!(pair.energy.is_finite());
        assert!(pair.force.z < 0.0);

        for &r in &[0.05, 0.15, 0.29] {
            let (_, dv) = with_hard_core(r, kernel);
            assert!((dv - numeric_derivative(|x| with_hard_core(x, kernel), r)).abs() < 1e-4);
        }

        let coincident = bonded_pair(&Vec3::zeros(), &Vec3::zeros(), Element::O, Element::O);
        assert!(coincident.energy.is_finite());
        assert_eq!(coincident.force, Vec3::zeros());
    }

    #[test]
    fn test_pair_kernels_obey_newtons_third_law() {
        let a = Vec3::new(0.3, -0.2, 0.1);
        for &r in &[0.1, 0.25, 0.74, 1.2, 2.0, 4.9] {
            let b = a + Vec3::new(r, 0.4 * r, -0.2 * r);
            let ij = bonded_pair(&a, &b, Element::C, Element::H);
            let ji = bonded_pair(&b, &a, Element::H, Element::C);
            assert!((ij.force + ji.force).norm() < 1e-9);
            assert!((ij.energy - ji.energy).abs() < 1e-12);

            if let (Some(ij), Some(ji)) = (
                nonbonded_pair(&a, &b, Element::N, Element::O),
                nonbonded_pair(&b, &a, Element::O, Element::N),
            ) {
                assert!((ij.force + ji.force).norm() < 1e-6 * ij.force.norm().max(1.0));
            }
        }
    }
}
