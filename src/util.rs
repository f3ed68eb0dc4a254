use std::f64::consts::PI;

use rand::distributions::Uniform;
use rand::Rng;

use crate::geom::Vec3;

/// Sampling helpers for any random source.
///
/// Nothing in the tracer reaches for a global generator; callers thread their own
/// `Rng` through so that a fixed seed reproduces a render exactly.
pub trait RandUtil: Rng {
    fn gen_vec_range(&mut self, min: f64, max: f64) -> Vec3;
    fn gen_in_unit_sphere(&mut self) -> Vec3;
    fn gen_in_unit_disk(&mut self) -> Vec3;
    fn gen_unit_vector(&mut self) -> Vec3;
}

impl<R> RandUtil for R
where
    R: Rng,
{
    fn gen_vec_range(&mut self, min: f64, max: f64) -> Vec3 {
        Vec3::rand_within(self, Uniform::new(min, max))
    }

    fn gen_in_unit_sphere(&mut self) -> Vec3 {
        let dist = Uniform::new(-1.0, 1.0);
        loop {
            let v = Vec3::rand_within(self, dist);
            let square_len = v.square_length();
            if square_len < 1.0 {
                return v;
            }
        }
    }

    fn gen_in_unit_disk(&mut self) -> Vec3 {
        loop {
            let x = self.gen_range(-1.0..1.0);
            let y = self.gen_range(-1.0..1.0);
            let v = Vec3::new(x, y, 0.0);
            if v.square_length() < 1.0 {
                return v;
            }
        }
    }

    fn gen_unit_vector(&mut self) -> Vec3 {
        // Uniform azimuth plus uniform cos(polar) is uniform on the sphere.
        let theta = 2.0 * PI * self.gen::<f64>();
        let z: f64 = self.gen_range(-1.0..1.0);
        let r = (1.0 - z * z).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn unit_sphere_samples_are_inside() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10_000 {
            assert!(rng.gen_in_unit_sphere().square_length() < 1.0);
        }
    }

    #[test]
    fn unit_disk_samples_are_flat_and_inside() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..10_000 {
            let v = rng.gen_in_unit_disk();
            assert_eq!(v.z(), 0.0);
            assert!(v.square_length() < 1.0);
        }
    }

    #[test]
    fn unit_vectors_have_unit_length() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sum = Vec3::default();
        let n = 20_000;
        for _ in 0..n {
            let v = rng.gen_unit_vector();
            assert!((v.length() - 1.0).abs() < 1e-9);
            sum += v;
        }
        // Roughly centered on the origin.
        assert!((sum / n as f64).length() < 0.05);
    }

    #[test]
    fn vec_range_respects_bounds() {
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..1000 {
            let v = rng.gen_vec_range(0.5, 1.0);
            for c in [v.x(), v.y(), v.z()] {
                assert!((0.5..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        for _ in 0..100 {
            assert_eq!(a.gen_in_unit_sphere(), b.gen_in_unit_sphere());
        }
    }
}
