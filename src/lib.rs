/*

=========================================================
 Reactive Molecular Dynamics (Rust)
 Small H/C/N/O systems in a soft spherical reactor,
 with bonds that form and break as the geometry changes.
=========================================================

🔧 Atom Model
-------------
Each `Atom` carries:
- Element:  H, C, N or O
- Position: Vector3<f64>   (A)
- Velocity: Vector3<f64>   (A/fs)
- Force:    Vector3<f64>   (eV/A)
- Mass:     f64            (amu)

Masses enter F/m through a single conversion,
    1 amu = 103.6428 eV fs^2 / A^2

💥 Force Field
--------------
- Bonded pairs: Morse
    V(r) = De (1 - exp(-a (r - re)))^2 - De
- Non-bonded pairs: soft-core repulsion, cut off at 5 A
    V(r) = 0.02 (sigma / r)^8,   sigma = 0.85 (vdW_i + vdW_j)
- Below 0.3 A both kernels switch to a quadratic hard core.
- Confinement: quintic-ramped harmonic wall between 0.9 R and R.

🔗 Bond Graph
-------------
- Dense order matrix, one entry per atom pair.
- A bond forms under 1.2 x the covalent radius sum and breaks
  beyond 2.0 x, so bonds do not flicker at the threshold.
- Valence limits: H 1, C 4, N 3, O 2.

🧪 Species
----------
- Connected components of the bond graph, written in Hill order
  (C, H, then alphabetical).

🌡️ Integration and Temperature
-------------------------------
- Velocity-Verlet with a component-wise velocity cap.
- T = 2 KE / (3 N kB)
- Berendsen rescaling, lambda clamped to [0.9, 1.1].
- Center-of-mass drift removed at initialization.

=========================================================

*/

pub mod config;
pub mod constants;
pub mod elements;
pub mod engine;
pub mod error;
pub mod force_field;
pub mod host;
pub mod integrator;
pub mod minimization;
pub mod molecule;
pub mod presets;
pub mod thermostat;
pub mod vec3;

pub use config::{RelaxationMethod, SimConfig, SimConfigUpdate};
pub use elements::Element;
pub use engine::{write_energy_csv, EnergyRecord, SimulationEngine, StepSnapshot};
pub use error::{Result, SimError};
pub use molecule::{Atom, Bond, Species};
pub use vec3::Vec3;
