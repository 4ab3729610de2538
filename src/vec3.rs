// Vector helpers on top of nalgebra. Positions are in A, velocities in A/fs.

use nalgebra::Vector3;
use rand::Rng;

pub type Vec3 = Vector3<f64>;

const NORMALIZE_EPSILON: f64 = 1e-10;

/// Unit vector along `v`, or the zero vector when `v` is too short to have a direction.
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    let len = v.norm();
    if len < NORMALIZE_EPSILON {
        return Vec3::zeros();
    }
    v / len
}

pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    (a - b).norm()
}

/// Uniform random point strictly inside a sphere of `radius` centred on the origin.
pub fn random_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::zeros();
    }
    loop {
        let p = Vec3::new(
            rng.random_range(-radius..radius),
            rng.random_range(-radius..radius),
            rng.random_range(-radius..radius),
        );
        if p.norm_squared() < radius * radius {
            return p;
        }
    }
}

pub fn to_array(v: &Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
