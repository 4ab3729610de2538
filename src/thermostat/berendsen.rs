// Berendsen weak coupling: lambda = sqrt(1 + dt/tau (T0/T - 1)),
// clamped so a single application never changes velocities by more than 10%.

use crate::constants::{BERENDSEN_MAX_SCALE, BERENDSEN_MIN_SCALE, TEMPERATURE_EPSILON};
use crate::molecule::Atom;

pub fn berendsen_scale(target_temperature: f64, current_temperature: f64, dt: f64, tau: f64) -> f64 {
    if current_temperature < TEMPERATURE_EPSILON || tau <= 0.0 || dt <= 0.0 {
        return 1.0;
    }
    let ratio = target_temperature / current_temperature;
    let lambda_sq = (1.0 + (dt / tau) * (ratio - 1.0)).max(0.0);
    lambda_sq
        .sqrt()
        .clamp(BERENDSEN_MIN_SCALE, BERENDSEN_MAX_SCALE)
}

/// Rescale every velocity toward `target_temperature`. Returns the factor applied.
pub fn apply_thermostat_berendsen(
    atoms: &mut [Atom],
    target_temperature: f64,
    current_temperature: f64,
    dt: f64,
    tau: f64,
) -> f64 {
    if atoms.is_empty() {
        return 1.0;
    }
    let lambda = berendsen_scale(target_temperature, current_temperature, dt, tau);
    for atom in atoms.iter_mut() {
        atom.velocity *= lambda;
    }
    lambda
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;
    use crate::thermostat::compute_temperature;
    use crate::vec3::Vec3;

    #[test]
    fn test_scale_direction() {
        assert!(berendsen_scale(300.0, 200.0, 0.5, 20.0) > 1.0);
        assert!(berendsen_scale(300.0, 400.0, 0.5, 20.0) < 1.0);
        assert_eq!(berendsen_scale(300.0, 300.0, 0.5, 20.0), 1.0);
    }

    #[test]
    fn test_scale_clamped() {
        assert_eq!(berendsen_scale(3000.0, 10.0, 0.5, 1.0), BERENDSEN_MAX_SCALE);
        assert_eq!(berendsen_scale(0.0, 1000.0, 2.0, 1.0), BERENDSEN_MIN_SCALE);
    }

    #[test]
    fn test_cold_system_is_left_alone() {
        assert_eq!(berendsen_scale(300.0, 0.0, 0.5, 20.0), 1.0);
        assert_eq!(berendsen_scale(300.0, 1e-12, 0.5, 20.0), 1.0);
        assert_eq!(berendsen_scale(300.0, 200.0, 0.5, 0.0), 1.0);
    }

    #[test]
    fn test_repeated_coupling_relaxes_toward_target() {
        let mut atoms: Vec<Atom> = (0..4)
            .map(|i| {
                Atom::new(i, Element::N, Vec3::new(i as f64, 0.0, 0.0))
                    .with_velocity(Vec3::new(0.002, -0.001, 0.003) * (i as f64 + 1.0))
            })
            .collect();
        for _ in 0..400 {
            let t = compute_temperature(&atoms).temperature;
            apply_thermostat_berendsen(&mut atoms, 300.0, t, 0.5, 20.0);
        }
        let t = compute_temperature(&atoms).temperature;
        assert!((t - 300.0).abs() < 1.0, "T = {t}");
    }
}
