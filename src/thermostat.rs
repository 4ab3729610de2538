/*
Temperature bookkeeping and velocity control.

    KE = sum 0.5 m_internal |v|^2            (eV)
    T  = 2 KE / (3 N kB)                     (K)

The Maxwell-Boltzmann sampler here is the only place velocities are drawn;
initialization and the relaxation paths both go through it.
*/

pub mod berendsen;

use rand::Rng;

use crate::constants::{BOLTZMANN_EV_K, MASS_EPSILON};
use crate::integrator::internal_mass;
use crate::molecule::Atom;
use crate::vec3::Vec3;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Thermo {
    pub temperature: f64,    // K
    pub kinetic_energy: f64, // eV
}

pub fn kinetic_energy(atoms: &[Atom]) -> f64 {
    atoms
        .iter()
        .map(|a| 0.5 * internal_mass(a.mass) * a.velocity.norm_squared())
        .sum()
}

pub fn compute_temperature(atoms: &[Atom]) -> Thermo {
    if atoms.is_empty() {
        return Thermo::default();
    }
    let kinetic_energy = kinetic_energy(atoms);
    let degrees_of_freedom = 3.0 * atoms.len() as f64;
    Thermo {
        temperature: 2.0 * kinetic_energy / (degrees_of_freedom * BOLTZMANN_EV_K),
        kinetic_energy,
    }
}

/// Sum of m v in amu A/fs.
pub fn total_momentum(atoms: &[Atom]) -> Vec3 {
    atoms
        .iter()
        .fold(Vec3::zeros(), |acc, a| acc + a.velocity * a.mass)
}

/// Subtract the mass-weighted mean velocity from every atom.
pub fn remove_com_velocity(atoms: &mut [Atom]) {
    let total_mass: f64 = atoms.iter().map(|a| a.mass).sum();
    if total_mass < MASS_EPSILON {
        return;
    }
    let com_velocity = total_momentum(atoms) / total_mass;
    for atom in atoms.iter_mut() {
        atom.velocity -= com_velocity;
    }
}

/// One velocity drawn from the Maxwell-Boltzmann distribution, Box-Muller per component.
///
/// Each component is normal with standard deviation sqrt(kB T / m_internal).
/// Non-positive temperature or mass gives a particle at rest.
pub fn maxwell_boltzmann_velocity<R: Rng + ?Sized>(
    rng: &mut R,
    temperature: f64,
    mass_amu: f64,
) -> Vec3 {
    if temperature <= 0.0 || mass_amu <= MASS_EPSILON {
        return Vec3::zeros();
    }
    let sigma = (BOLTZMANN_EV_K * temperature / internal_mass(mass_amu)).sqrt();
    let mut component = || {
        // 1 - u keeps the log argument in (0, 1]
        let u1: f64 = 1.0 - rng.random::<f64>();
        let u2: f64 = rng.random::<f64>();
        sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    };
    let x = component();
    let y = component();
    let z = component();
    Vec3::new(x, y, z)
}

pub fn assign_maxwell_boltzmann_velocities<R: Rng + ?Sized>(
    atoms: &mut [Atom],
    rng: &mut R,
    temperature: f64,
) {
    for atom in atoms.iter_mut() {
        atom.velocity = maxwell_boltzmann_velocity(rng, temperature, atom.mass);
    }
}
