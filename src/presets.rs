/*
Named starting mixtures.

Each preset is a list of (molecule, count). Molecules are placed as rigid
templates: centres are rejection-sampled inside 0.65 R so nothing starts in
the wall ramp, and each copy gets a random rotation. Atoms start at rest;
the engine draws velocities during init.
*/

use std::f64::consts::PI;

use log::warn;
use nalgebra::{Rotation3, Unit};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use serde::Serialize;

use crate::elements::Element;
use crate::error::{Result, SimError};
use crate::molecule::Atom;
use crate::vec3::{random_in_sphere, Vec3};

const PLACEMENT_RADIUS_FRACTION: f64 = 0.65;
const MIN_CENTRE_SEPARATION: f64 = 3.5; // A
const MAX_PLACEMENT_ATTEMPTS: usize = 200;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Molecule {
    H2,
    O2,
    N2,
    CH4,
    H2O,
    CO2,
    NH3,
}

impl Molecule {
    pub fn formula(self) -> &'static str {
        match self {
            Molecule::H2 => "H2",
            Molecule::O2 => "O2",
            Molecule::N2 => "N2",
            Molecule::CH4 => "CH4",
            Molecule::H2O => "H2O",
            Molecule::CO2 => "CO2",
            Molecule::NH3 => "H3N",
        }
    }

    /// Atoms with offsets (A) from the molecule centre.
    pub fn template(self) -> &'static [(Element, [f64; 3])] {
        use Element::*;
        match self {
            Molecule::H2 => &[(H, [-0.37, 0.0, 0.0]), (H, [0.37, 0.0, 0.0])],
            Molecule::O2 => &[(O, [-0.6, 0.0, 0.0]), (O, [0.6, 0.0, 0.0])],
            Molecule::N2 => &[(N, [-0.55, 0.0, 0.0]), (N, [0.55, 0.0, 0.0])],
            Molecule::CH4 => &[
                (C, [0.0, 0.0, 0.0]),
                (H, [0.63, 0.63, 0.63]),
                (H, [-0.63, -0.63, 0.63]),
                (H, [-0.63, 0.63, -0.63]),
                (H, [0.63, -0.63, -0.63]),
            ],
            Molecule::H2O => &[
                (O, [0.0, 0.0, 0.0]),
                (H, [0.76, 0.59, 0.0]),
                (H, [-0.76, 0.59, 0.0]),
            ],
            Molecule::CO2 => &[
                (C, [0.0, 0.0, 0.0]),
                (O, [-1.16, 0.0, 0.0]),
                (O, [1.16, 0.0, 0.0]),
            ],
            Molecule::NH3 => &[
                (N, [0.0, 0.0, 0.38]),
                (H, [0.94, 0.0, -0.13]),
                (H, [-0.47, 0.81, -0.13]),
                (H, [-0.47, -0.81, -0.13]),
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PresetInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub molecules: &'static [(Molecule, usize)],
}

pub const PRESETS: &[PresetInfo] = &[
    PresetInfo {
        id: "hydrogen-combustion",
        name: "Hydrogen Combustion",
        description: "10 H2 + 5 O2, hydrogen burning toward water",
        molecules: &[(Molecule::H2, 10), (Molecule::O2, 5)],
    },
    PresetInfo {
        id: "methane-combustion",
        name: "Methane Combustion",
        description: "5 CH4 + 10 O2, toward CO2 + H2O",
        molecules: &[(Molecule::CH4, 5), (Molecule::O2, 10)],
    },
    PresetInfo {
        id: "water-formation",
        name: "Water Formation",
        description: "8 H2 + 4 O2, stoichiometric water mixture",
        molecules: &[(Molecule::H2, 8), (Molecule::O2, 4)],
    },
    PresetInfo {
        id: "ammonia-synthesis",
        name: "Ammonia Synthesis",
        description: "5 N2 + 15 H2, toward NH3",
        molecules: &[(Molecule::N2, 5), (Molecule::H2, 15)],
    },
    PresetInfo {
        id: "organic-mix",
        name: "Organic Mix",
        description: "3 CH4 + 3 H2O + 2 CO2",
        molecules: &[(Molecule::CH4, 3), (Molecule::H2O, 3), (Molecule::CO2, 2)],
    },
];

pub fn find_preset(id: &str) -> Result<&'static PresetInfo> {
    PRESETS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| SimError::UnknownPreset(id.to_string()))
}

pub fn preset_ids() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.id)
}

fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Rotation3<f64> {
    let axis: [f64; 3] = UnitSphere.sample(rng);
    let angle = rng.random_range(0.0..2.0 * PI);
    Rotation3::from_axis_angle(&Unit::new_normalize(Vec3::from(axis)), angle)
}

fn place_centre<R: Rng + ?Sized>(rng: &mut R, radius: f64, placed: &[Vec3]) -> Vec3 {
    let mut candidate = random_in_sphere(rng, radius);
    for _ in 1..MAX_PLACEMENT_ATTEMPTS {
        if placed
            .iter()
            .all(|c| (c - candidate).norm() >= MIN_CENTRE_SEPARATION)
        {
            return candidate;
        }
        candidate = random_in_sphere(rng, radius);
    }
    warn!(
        "no free spot after {MAX_PLACEMENT_ATTEMPTS} attempts, placing a molecule anyway; \
         relaxation will push it apart"
    );
    candidate
}

/// Place `molecules` inside a confinement sphere of `radius`. Atom ids follow
/// placement order.
pub fn generate_molecules<R: Rng + ?Sized>(
    molecules: &[(Molecule, usize)],
    radius: f64,
    rng: &mut R,
) -> Vec<Atom> {
    let placement_radius = radius * PLACEMENT_RADIUS_FRACTION;
    let mut centres: Vec<Vec3> = Vec::new();
    let mut atoms = Vec::new();

    for &(molecule, count) in molecules {
        for _ in 0..count {
            let centre = place_centre(rng, placement_radius, &centres);
            centres.push(centre);
            let rotation = random_rotation(rng);
            for &(element, offset) in molecule.template() {
                let position = centre + rotation * Vec3::from(offset);
                atoms.push(Atom::new(atoms.len(), element, position));
            }
        }
    }
    atoms
}

pub fn generate_preset<R: Rng + ?Sized>(id: &str, radius: f64, rng: &mut R) -> Result<Vec<Atom>> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(SimError::config(
            "confinementRadius",
            format!("must be positive, got {radius}"),
        ));
    }
    let preset = find_preset(id)?;
    Ok(generate_molecules(preset.molecules, radius, rng))
}
