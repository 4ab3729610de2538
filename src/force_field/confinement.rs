// Soft spherical wall standing in for the reactor vessel.
//
// Zero inside 0.9 R, quintic smoothstep ramp of the spring constant between
// 0.9 R and R, full harmonic spring beyond R. The spring is always measured
// from the onset radius and always points at the origin.

use crate::constants::WALL_ONSET_FRACTION;
use crate::force_field::potentials::PairInteraction;
use crate::vec3::{normalize_or_zero, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphericalWall {
    pub radius: f64,         // A
    pub force_constant: f64, // eV/A^2
}

/// 0 at t = 0, 1 at t = 1, with vanishing first and second derivatives at both ends.
pub fn quintic_smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (10.0 - 15.0 * t + 6.0 * t * t)
}

impl SphericalWall {
    pub fn new(radius: f64, force_constant: f64) -> Self {
        SphericalWall {
            radius,
            force_constant,
        }
    }

    pub fn onset(&self) -> f64 {
        WALL_ONSET_FRACTION * self.radius
    }

    pub fn is_active(&self) -> bool {
        self.radius > 0.0 && self.force_constant > 0.0
    }

    /// Effective spring constant at distance `r` from the centre.
    pub fn stiffness_at(&self, r: f64) -> f64 {
        let onset = self.onset();
        if r <= onset {
            0.0
        } else if r <= self.radius {
            self.force_constant * quintic_smoothstep((r - onset) / (self.radius - onset))
        } else {
            self.force_constant
        }
    }

    pub fn evaluate(&self, position: &Vec3) -> PairInteraction {
        let none = PairInteraction {
            force: Vec3::zeros(),
            energy: 0.0,
        };
        if !self.is_active() {
            return none;
        }
        let r = position.norm();
        let k = self.stiffness_at(r);
        if k == 0.0 {
            return none;
        }
        let displacement = r - self.onset();
        PairInteraction {
            force: normalize_or_zero(position) * (-k * displacement),
            energy: 0.5 * k * displacement * displacement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_force_inside_onset() {
        let wall = SphericalWall::new(10.0, 2.0);
        let result = wall.evaluate(&Vec3::new(0.0, 8.9, 0.0));
        assert_eq!(result.force, Vec3::zeros());
        assert_eq!(result.energy, 0.0);
    }

    #[test]
    fn test_ramp_is_partial_and_inward() {
        let wall = SphericalWall::new(10.0, 2.0);
        let result = wall.evaluate(&Vec3::new(9.5, 0.0, 0.0));
        // halfway through the ramp the smoothstep is exactly 0.5
        let k = 1.0;
        assert!((wall.stiffness_at(9.5) - k).abs() < 1e-12);
        assert!((result.force.x + k * 0.5).abs() < 1e-12);
        assert!((result.energy - 0.5 * k * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_full_spring_beyond_radius() {
        let wall = SphericalWall::new(10.0, 2.0);
        let p = Vec3::new(0.0, -0.6, 0.8) * 11.0;
        let result = wall.evaluate(&p);
        // displacement is measured from the onset (9 A)
        assert!((result.force.norm() - 2.0 * 2.0).abs() < 1e-9);
        assert!(result.force.dot(&p) < 0.0);
        assert!((result.energy - 0.5 * 2.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_wall() {
        let wall = SphericalWall::new(10.0, 0.0);
        assert_eq!(wall.evaluate(&Vec3::new(50.0, 0.0, 0.0)).energy, 0.0);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(quintic_smoothstep(0.0), 0.0);
        assert_eq!(quintic_smoothstep(1.0), 1.0);
        assert!((quintic_smoothstep(0.5) - 0.5).abs() < 1e-12);
    }
}
