// Units used throughout the engine: energy in eV, length in Angstrom,
// time in femtoseconds, mass in amu (converted before any F/m).

pub const BOLTZMANN_EV_K: f64 = 8.617333262e-5; // Boltzmann constant in eV/K
pub const AMU_TO_INTERNAL: f64 = 103.6428; // 1 amu expressed in eV fs^2 / A^2

// -- pair kernels
pub const HARD_CORE_RADIUS: f64 = 0.3; // below this the quadratic core takes over (A)
pub const HARD_CORE_STIFFNESS: f64 = 25.0; // eV / A^2
pub const PAIR_EPSILON: f64 = 1e-8; // coincident atoms, no defined direction (A)
pub const REPULSION_EPSILON: f64 = 0.02; // soft-core strength (eV)
pub const REPULSION_SIGMA_SCALE: f64 = 0.85; // sigma = scale * (vdW_i + vdW_j)
pub const REPULSION_CUTOFF: f64 = 5.0; // A

// -- confinement wall
pub const WALL_ONSET_FRACTION: f64 = 0.9;

// -- bond graph hysteresis, multiples of the covalent radius sum
pub const BOND_SEED_FACTOR: f64 = 1.3;
pub const BOND_FORM_FACTOR: f64 = 1.2;
pub const BOND_BREAK_FACTOR: f64 = 2.0;
pub const TRIPLE_BOND_RATIO: f64 = 0.82;
pub const DOUBLE_BOND_RATIO: f64 = 0.92;

// -- thermostat
pub const BERENDSEN_MIN_SCALE: f64 = 0.9;
pub const BERENDSEN_MAX_SCALE: f64 = 1.1;
pub const TEMPERATURE_EPSILON: f64 = 1e-10; // K
pub const MASS_EPSILON: f64 = 1e-12; // amu

// -- steepest descent
pub const MINIMIZATION_MAX_ITERATIONS: usize = 300;
pub const MINIMIZATION_FORCE_TOLERANCE: f64 = 0.5; // eV/A
pub const MINIMIZATION_MAX_STEP: f64 = 0.01; // A per eV/A
pub const MINIMIZATION_MAX_DISPLACEMENT: f64 = 0.2; // A

// -- dynamical relaxation
pub const RELAXATION_STEPS: usize = 200;
pub const RELAXATION_DT: f64 = 0.1; // fs
pub const RELAXATION_TAU: f64 = 1.0; // fs
