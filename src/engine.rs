/*
The simulation engine.

Owns the atom buffer, the bond graph and the live configuration. Everything
else in the crate is a free function over slices; this is the only place
that sequences them.

Initialization:
    seed bonds -> remove COM drift -> relax (steepest descent or dynamics)
    -> re-seed bonds -> Maxwell-Boltzmann velocities -> remove COM drift
    -> initial forces

One step:
    positions (old forces) -> bond update -> forces -> velocities
    -> velocity cap -> thermostat -> species -> step/time counters

Stepping cannot fail. An engine only exists once `init` has succeeded, so
"stepping before init" is a host concern.
*/

use std::io::Write;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{RelaxationMethod, SimConfig, SimConfigUpdate};
use crate::error::{Result, SimError};
use crate::force_field::compute_forces;
use crate::force_field::confinement::SphericalWall;
use crate::integrator::{cap_velocities, integrate_positions, integrate_velocities, velocity_cap};
use crate::minimization::{dynamical_relaxation, steepest_descent};
use crate::molecule::bond_graph::BondGraph;
use crate::molecule::species::detect_species;
use crate::molecule::{Atom, Bond, Species};
use crate::thermostat::berendsen::apply_thermostat_berendsen;
use crate::thermostat::{assign_maxwell_boltzmann_velocities, compute_temperature, remove_com_velocity};
use crate::vec3::Vec3;

/// Everything a consumer needs after a step, by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub species: Vec<Species>,
    pub temperature: f64,      // K
    pub kinetic_energy: f64,   // eV
    pub potential_energy: f64, // eV
    pub total_energy: f64,     // eV
    pub step: u64,
    pub time: f64, // fs
}

/// One row of the energy history.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub step: u64,
    pub time: f64,
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
    pub temperature: f64,
}

impl From<&StepSnapshot> for EnergyRecord {
    fn from(snapshot: &StepSnapshot) -> Self {
        EnergyRecord {
            step: snapshot.step,
            time: snapshot.time,
            kinetic: snapshot.kinetic_energy,
            potential: snapshot.potential_energy,
            total: snapshot.total_energy,
            temperature: snapshot.temperature,
        }
    }
}

/// Write energy rows as CSV with a header line.
pub fn write_energy_csv<W: Write>(writer: W, records: &[EnergyRecord]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}

pub struct SimulationEngine {
    atoms: Vec<Atom>,
    bonds: BondGraph,
    config: SimConfig,
    rng: SmallRng,
    step: u64,
    time: f64,
    potential_energy: f64,
}

fn validate_atoms(atoms: &[Atom]) -> Result<()> {
    if atoms.is_empty() {
        return Err(SimError::EmptySystem);
    }
    let finite = |v: &Vec3| v.iter().all(|c| c.is_finite());
    for (index, atom) in atoms.iter().enumerate() {
        if !(atom.mass.is_finite() && atom.mass > 0.0) {
            return Err(SimError::InvalidAtom {
                index,
                reason: format!("mass must be positive, got {}", atom.mass),
            });
        }
        if !finite(&atom.position) {
            return Err(SimError::InvalidAtom {
                index,
                reason: "position is not finite".to_string(),
            });
        }
        if !finite(&atom.velocity) {
            return Err(SimError::InvalidAtom {
                index,
                reason: "velocity is not finite".to_string(),
            });
        }
    }
    Ok(())
}

impl SimulationEngine {
    /// Validate the inputs and run the full initialization sequence.
    pub fn init(mut atoms: Vec<Atom>, config: SimConfig) -> Result<Self> {
        config.validate()?;
        validate_atoms(&atoms)?;

        for (index, atom) in atoms.iter_mut().enumerate() {
            atom.id = index;
            atom.force = Vec3::zeros();
        }
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut engine = SimulationEngine {
            bonds: BondGraph::new(atoms.len()),
            atoms,
            config,
            rng,
            step: 0,
            time: 0.0,
            potential_energy: 0.0,
        };
        engine.initialize();
        Ok(engine)
    }

    fn wall(&self) -> SphericalWall {
        SphericalWall::new(self.config.confinement_radius, self.config.confinement_force)
    }

    fn initialize(&mut self) {
        let wall = self.wall();
        let seeded = self.bonds.seed(&self.atoms);
        debug!("seeded {seeded} bonds from the initial geometry");
        remove_com_velocity(&mut self.atoms);

        let report = match self.config.relaxation {
            RelaxationMethod::SteepestDescent => steepest_descent(&mut self.atoms, &self.bonds, &wall),
            RelaxationMethod::Dynamical => dynamical_relaxation(
                &mut self.atoms,
                &mut self.bonds,
                &wall,
                &mut self.rng,
                self.config.target_temperature,
                self.config.max_step_displacement,
            ),
        };
        debug!("relaxation: {report:?}");

        self.bonds.clear();
        self.bonds.seed(&self.atoms);
        assign_maxwell_boltzmann_velocities(&mut self.atoms, &mut self.rng, self.config.target_temperature);
        remove_com_velocity(&mut self.atoms);
        self.potential_energy = compute_forces(&mut self.atoms, &self.bonds, &wall);

        info!(
            "engine initialized: {} atoms, {} bonds, {} species",
            self.atoms.len(),
            self.bonds.len(),
            detect_species(&self.atoms, &self.bonds.bonds()).len()
        );
    }

    /// Advance the system by one timestep.
    pub fn step(&mut self) -> StepSnapshot {
        let dt = self.config.dt;
        let wall = self.wall();

        let old_forces: Vec<Vec3> = self.atoms.iter().map(|a| a.force).collect();
        integrate_positions(&mut self.atoms, dt);

        let (broken, formed) = self.bonds.update(&self.atoms);
        if broken + formed > 0 {
            debug!("step {}: {broken} bonds broken, {formed} formed", self.step + 1);
        }

        self.potential_energy = compute_forces(&mut self.atoms, &self.bonds, &wall);
        integrate_velocities(&mut self.atoms, &old_forces, dt);

        let clipped = cap_velocities(&mut self.atoms, velocity_cap(self.config.max_step_displacement, dt));
        if clipped > 0 {
            debug!("step {}: clipped {clipped} velocity components", self.step + 1);
        }

        if self.config.thermostat_enabled() {
            let thermo = compute_temperature(&self.atoms);
            apply_thermostat_berendsen(
                &mut self.atoms,
                self.config.target_temperature,
                thermo.temperature,
                dt,
                self.config.thermostat_tau,
            );
        }

        self.step += 1;
        self.time += dt;
        self.snapshot()
    }

    /// Current state without advancing.
    pub fn snapshot(&self) -> StepSnapshot {
        let thermo = compute_temperature(&self.atoms);
        let bonds = self.bonds.bonds();
        let species = detect_species(&self.atoms, &bonds);
        StepSnapshot {
            atoms: self.atoms.clone(),
            bonds,
            species,
            temperature: thermo.temperature,
            kinetic_energy: thermo.kinetic_energy,
            potential_energy: self.potential_energy,
            total_energy: thermo.kinetic_energy + self.potential_energy,
            step: self.step,
            time: self.time,
        }
    }

    /// Merge a partial update. Invalid updates are rejected whole. Forces are
    /// refreshed so the next position half sees the new wall.
    pub fn update_config(&mut self, update: &SimConfigUpdate) -> Result<()> {
        self.config.apply(update)?;
        let wall = self.wall();
        self.potential_energy = compute_forces(&mut self.atoms, &self.bonds, &wall);
        debug!("config updated: {:?}", self.config);
        Ok(())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bond_graph(&self) -> &BondGraph {
        &self.bonds
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;
    use crate::thermostat::total_momentum;

    fn hydrogen_molecule() -> Vec<Atom> {
        vec![
            Atom::new(0, Element::H, Vec3::new(-0.37, 0.0, 0.0)),
            Atom::new(1, Element::H, Vec3::new(0.37, 0.0, 0.0)),
        ]
    }

    fn seeded(seed: u64) -> SimConfig {
        SimConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn water_and_methane() -> Vec<Atom> {
        vec![
            Atom::new(0, Element::O, Vec3::new(0.0, 0.0, 0.0)),
            Atom::new(1, Element::H, Vec3::new(0.76, 0.59, 0.0)),
            Atom::new(2, Element::H, Vec3::new(-0.76, 0.59, 0.0)),
            Atom::new(3, Element::C, Vec3::new(4.0, 0.0, 0.0)),
            Atom::new(4, Element::H, Vec3::new(4.63, 0.63, 0.63)),
            Atom::new(5, Element::H, Vec3::new(3.37, -0.63, 0.63)),
            Atom::new(6, Element::H, Vec3::new(3.37, 0.63, -0.63)),
            Atom::new(7, Element::H, Vec3::new(4.63, -0.63, -0.63)),
        ]
    }

    #[test]
    fn test_init_rejects_bad_input() {
        assert!(matches!(
            SimulationEngine::init(Vec::new(), SimConfig::default()),
            Err(SimError::EmptySystem)
        ));

        let mut atoms = hydrogen_molecule();
        atoms[1].mass = 0.0;
        assert!(matches!(
            SimulationEngine::init(atoms, SimConfig::default()),
            Err(SimError::InvalidAtom { index: 1, .. })
        ));

        let mut atoms = hydrogen_molecule();
        atoms[0].position.y = f64::NAN;
        assert!(matches!(
            SimulationEngine::init(atoms, SimConfig::default()),
            Err(SimError::InvalidAtom { index: 0, .. })
        ));

        let config = SimConfig { dt: 0.0, ..Default::default() };
        assert!(matches!(
            SimulationEngine::init(hydrogen_molecule(), config),
            Err(SimError::InvalidConfig { field: "dt", .. })
        ));
    }

    #[test]
    fn test_init_removes_net_momentum() {
        let engine = SimulationEngine::init(water_and_methane(), seeded(21)).unwrap();
        assert!(total_momentum(engine.atoms()).norm() < 1e-10);
        assert!(engine.snapshot().temperature > 0.0);
    }

    #[test]
    fn test_init_bonds_hydrogen_molecule() {
        let engine = SimulationEngine::init(hydrogen_molecule(), seeded(7)).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.step, 0);
        assert_eq!(snapshot.bonds.len(), 1);
        assert_eq!((snapshot.bonds[0].i, snapshot.bonds[0].j), (0, 1));
        assert_eq!(snapshot.bonds[0].order, 1);
        assert_eq!(
            snapshot.species,
            vec![Species { formula: "H2".to_string(), count: 1 }]
        );
    }

    #[test]
    fn test_step_advances_counters() {
        let mut engine = SimulationEngine::init(hydrogen_molecule(), seeded(7)).unwrap();
        let mut last = engine.snapshot();
        for n in 1..=5u64 {
            last = engine.step();
            assert_eq!(last.step, n);
        }
        assert!((last.time - 2.5).abs() < 1e-12);
        assert!((last.total_energy - last.kinetic_energy - last.potential_energy).abs() < 1e-12);
        assert_eq!(engine.step_count(), 5);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = SimulationEngine::init(water_and_methane(), seeded(3)).unwrap();
        let mut b = SimulationEngine::init(water_and_methane(), seeded(3)).unwrap();
        for _ in 0..20 {
            assert_eq!(a.step(), b.step());
        }
    }

    #[test]
    fn test_update_config_is_validated() {
        let mut engine = SimulationEngine::init(hydrogen_molecule(), seeded(1)).unwrap();
        let bad = SimConfigUpdate {
            thermostat_tau: Some(-1.0),
            ..Default::default()
        };
        assert!(engine.update_config(&bad).is_err());
        assert_eq!(engine.config().thermostat_tau, 20.0);

        let good = SimConfigUpdate {
            target_temperature: Some(1500.0),
            steps_per_update: Some(3),
            ..Default::default()
        };
        engine.update_config(&good).unwrap();
        assert_eq!(engine.config().target_temperature, 1500.0);
        assert_eq!(engine.config().steps_per_update, 3);
    }

    #[test]
    fn test_valence_respected_while_stepping() {
        let config = SimConfig {
            target_temperature: 2000.0,
            confinement_radius: 5.0,
            ..seeded(9)
        };
        let mut engine = SimulationEngine::init(water_and_methane(), config).unwrap();
        for _ in 0..300 {
            engine.step();
            let graph = engine.bond_graph();
            for (i, atom) in engine.atoms().iter().enumerate() {
                assert!(graph.bond_count(i) <= atom.element.max_valence());
            }
        }
    }

    #[test]
    fn test_energy_record_from_snapshot() {
        let mut engine = SimulationEngine::init(hydrogen_molecule(), seeded(2)).unwrap();
        let snapshot = engine.step();
        let record = EnergyRecord::from(&snapshot);
        assert_eq!(record.step, 1);
        assert_eq!(record.total, snapshot.total_energy);
        assert_eq!(record.temperature, snapshot.temperature);
    }

    #[test]
    fn test_energy_csv_has_header_and_rows() {
        let mut engine = SimulationEngine::init(hydrogen_molecule(), seeded(2)).unwrap();
        let records: Vec<EnergyRecord> = (0..3).map(|_| EnergyRecord::from(&engine.step())).collect();
        let mut buffer = Vec::new();
        write_energy_csv(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "step,time,kinetic,potential,total,temperature");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("3,1.5,"));
    }
}
