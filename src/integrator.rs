/*
Velocity-Verlet, split in the two halves the engine interleaves with
rebonding and force evaluation:

    x(t+dt) = x(t) + v(t) dt + 0.5 a(t) dt^2
    v(t+dt) = v(t) + 0.5 (a(t) + a(t+dt)) dt

a = F / (m_amu * AMU_TO_INTERNAL), so F in eV/A gives a in A/fs^2.
*/

use crate::constants::AMU_TO_INTERNAL;
use crate::molecule::Atom;
use crate::vec3::Vec3;

#[inline]
pub fn internal_mass(mass_amu: f64) -> f64 {
    mass_amu * AMU_TO_INTERNAL
}

#[inline]
pub fn acceleration(force: &Vec3, mass_amu: f64) -> Vec3 {
    force / internal_mass(mass_amu)
}

/// Position half, using the forces currently stored on the atoms.
pub fn integrate_positions(atoms: &mut [Atom], dt: f64) {
    for atom in atoms.iter_mut() {
        let a = acceleration(&atom.force, atom.mass);
        atom.position += atom.velocity * dt + a * (0.5 * dt * dt);
    }
}

/// Velocity half, after the forces have been recomputed at the new positions.
pub fn integrate_velocities(atoms: &mut [Atom], old_forces: &[Vec3], dt: f64) {
    debug_assert_eq!(atoms.len(), old_forces.len());
    for (atom, old_force) in atoms.iter_mut().zip(old_forces) {
        let a_old = acceleration(old_force, atom.mass);
        let a_new = acceleration(&atom.force, atom.mass);
        atom.velocity += (a_old + a_new) * (0.5 * dt);
    }
}

/// Component cap such that no atom moves more than `max_displacement` in one step.
pub fn velocity_cap(max_displacement: f64, dt: f64) -> f64 {
    max_displacement / dt
}

/// Clamp every velocity component to `[-cap, cap]`. Returns how many components were clipped.
pub fn cap_velocities(atoms: &mut [Atom], cap: f64) -> usize {
    let mut clipped = 0;
    for atom in atoms.iter_mut() {
        for d in 0..3 {
            let v = atom.velocity[d];
            if v.abs() > cap {
                atom.velocity[d] = v.clamp(-cap, cap);
                clipped += 1;
            }
        }
    }
    clipped
}
