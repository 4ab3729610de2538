/*
Energy minimization in molecular dynamics is a preprocessing step
used to find nearby local minimum of potential energy surface

The idea is to remove steric clashes, highly strained geometries,
or unrealistic bond lengths before running time-evolution simulations.

Two ways of getting there:
  - steepest descent: move every atom along its force with a step bounded so
    that the most-loaded atom travels at most 0.2 A per iteration
  - dynamical relaxation: short-timestep dynamics with a very tight thermostat
*/

use log::{debug, info, warn};
use rand::Rng;

use crate::constants::{
    MINIMIZATION_FORCE_TOLERANCE, MINIMIZATION_MAX_DISPLACEMENT, MINIMIZATION_MAX_ITERATIONS,
    MINIMIZATION_MAX_STEP, RELAXATION_DT, RELAXATION_STEPS, RELAXATION_TAU,
};
use crate::force_field::confinement::SphericalWall;
use crate::force_field::{compute_forces, max_force};
use crate::integrator::{cap_velocities, integrate_positions, integrate_velocities, velocity_cap};
use crate::molecule::bond_graph::BondGraph;
use crate::molecule::Atom;
use crate::thermostat::berendsen::apply_thermostat_berendsen;
use crate::thermostat::{assign_maxwell_boltzmann_velocities, compute_temperature};
use crate::vec3::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MinimizationReport {
    pub iterations: usize,
    pub max_force: f64, // eV/A after the last iteration
    pub converged: bool,
}

pub fn steepest_descent(
    atoms: &mut [Atom],
    bonds: &BondGraph,
    wall: &SphericalWall,
) -> MinimizationReport {
    let mut report = MinimizationReport {
        iterations: 0,
        max_force: 0.0,
        converged: false,
    };
    for iteration in 0..MINIMIZATION_MAX_ITERATIONS {
        compute_forces(atoms, bonds, wall);
        let f_max = max_force(atoms);
        report.iterations = iteration;
        report.max_force = f_max;
        if f_max < MINIMIZATION_FORCE_TOLERANCE {
            report.converged = true;
            break;
        }
        let step = MINIMIZATION_MAX_STEP.min(MINIMIZATION_MAX_DISPLACEMENT / f_max);
        for atom in atoms.iter_mut() {
            atom.position += atom.force * step;
        }
    }
    if report.converged {
        info!(
            "steepest descent converged after {} iterations (max |F| = {:.3} eV/A)",
            report.iterations, report.max_force
        );
    } else {
        compute_forces(atoms, bonds, wall);
        report.iterations = MINIMIZATION_MAX_ITERATIONS;
        report.max_force = max_force(atoms);
        warn!(
            "steepest descent stopped at the iteration cap, max |F| = {:.3} eV/A",
            report.max_force
        );
    }
    report
}

/// Short, heavily thermostatted dynamics. Bonds are updated every step so
/// clashing fragments can rearrange.
pub fn dynamical_relaxation<R: Rng + ?Sized>(
    atoms: &mut [Atom],
    bonds: &mut BondGraph,
    wall: &SphericalWall,
    rng: &mut R,
    target_temperature: f64,
    max_step_displacement: f64,
) -> MinimizationReport {
    assign_maxwell_boltzmann_velocities(atoms, rng, target_temperature);
    compute_forces(atoms, bonds, wall);
    let cap = velocity_cap(max_step_displacement, RELAXATION_DT);

    for step in 0..RELAXATION_STEPS {
        let old_forces: Vec<Vec3> = atoms.iter().map(|a| a.force).collect();
        integrate_positions(atoms, RELAXATION_DT);
        bonds.update(atoms);
        compute_forces(atoms, bonds, wall);
        integrate_velocities(atoms, &old_forces, RELAXATION_DT);
        cap_velocities(atoms, cap);
        let thermo = compute_temperature(atoms);
        apply_thermostat_berendsen(
            atoms,
            target_temperature,
            thermo.temperature,
            RELAXATION_DT,
            RELAXATION_TAU,
        );
        if step % 50 == 0 {
            debug!(
                "relaxation step {step}: T = {:.1} K, max |F| = {:.3} eV/A",
                thermo.temperature,
                max_force(atoms)
            );
        }
    }

    let f_max = max_force(atoms);
    info!(
        "dynamical relaxation finished after {} steps (max |F| = {:.3} eV/A)",
        RELAXATION_STEPS, f_max
    );
    MinimizationReport {
        iterations: RELAXATION_STEPS,
        max_force: f_max,
        converged: f_max < MINIMIZATION_FORCE_TOLERANCE,
    }
}
