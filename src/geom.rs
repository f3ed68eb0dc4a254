use std::fmt::Display;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Div;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Sub;

use rand::distributions::Distribution;
use rand::distributions::Standard;
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vec3(f64, f64, f64);

// TODO: Split Point3 into its own type so that Point + Point doesn't typecheck.
pub type Point3 = Vec3;

/// Linear RGB, nominally in [0, 1] per channel.
pub type Color = Vec3;

impl Display for Vec3 {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3(x, y, z)
    }

    #[inline]
    pub const fn splat(v: f64) -> Self {
        Vec3(v, v, v)
    }

    #[cfg(test)]
    #[inline]
    pub fn ihat() -> Self {
        Vec3::new(1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn jhat() -> Self {
        Vec3::new(0.0, 1.0, 0.0)
    }

    #[cfg(test)]
    #[inline]
    pub fn khat() -> Self {
        Vec3::new(0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.0
    }
    #[inline]
    pub fn y(&self) -> f64 {
        self.1
    }
    #[inline]
    pub fn z(&self) -> f64 {
        self.2
    }

    #[inline]
    pub fn negate(&self) -> Self {
        Vec3(-self.0, -self.1, -self.2)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.square_length().sqrt()
    }

    #[inline]
    pub fn square_length(&self) -> f64 {
        self.0 * self.0 + self.1 * self.1 + self.2 * self.2
    }

    #[inline]
    pub fn mul_pointwise(&self, other: &Self) -> Vec3 {
        Vec3(self.0 * other.0, self.1 * other.1, self.2 * other.2)
    }

    #[inline]
    pub fn div_pointwise(&self, other: &Self) -> Vec3 {
        Vec3(self.0 / other.0, self.1 / other.1, self.2 / other.2)
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0 * other.0 + self.1 * other.1 + self.2 * other.2
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Vec3(
            self.1 * other.2 - self.2 * other.1,
            self.2 * other.0 - self.0 * other.2,
            self.0 * other.1 - self.1 * other.0,
        )
    }

    /// Returns this vector scaled to unit length.
    ///
    /// The zero vector has no direction, so every component of the result is NaN.
    /// NaN then propagates through any arithmetic it takes part in rather than
    /// panicking. Use [`Vec3::try_unit`] where a zero vector is a real possibility.
    #[inline]
    pub fn unit(&self) -> Self {
        self.try_unit().unwrap_or(Vec3::splat(f64::NAN))
    }

    /// Returns this vector scaled to unit length, or `None` for the zero vector.
    #[inline]
    pub fn try_unit(&self) -> Option<Self> {
        let length = self.length();
        if length == 0.0 {
            None
        } else {
            Some(*self / length)
        }
    }

    #[inline]
    pub fn rand_within<R: Rng, D: Distribution<f64>>(rng: &mut R, dist: D) -> Self {
        Vec3(dist.sample(rng), dist.sample(rng), dist.sample(rng))
    }

    pub fn near_zero(&self) -> bool {
        let s = 1e-8;
        self.0.abs() < s && self.1.abs() < s && self.2.abs() < s
    }

    /// Reflect this vector across a surface with normal `n`.
    #[inline]
    pub fn reflect(&self, n: &Vec3) -> Vec3 {
        *self - (2.0 * self.dot(n)) * *n
    }

    /// Refract this (unit) vector through a surface with normal `n`.
    ///
    /// `etai_over_etat` is the ratio of the refractive index of the medium the
    /// ray leaves to the one it enters. The outgoing ray is built from its
    /// components perpendicular and parallel to the normal (Snell's law).
    pub fn refract(&self, n: &Vec3, etai_over_etat: f64) -> Vec3 {
        let cos_theta = self.negate().dot(n).min(1.0);
        let r_out_perp = etai_over_etat * (*self + cos_theta * *n);
        let r_out_parallel = -(1.0 - r_out_perp.square_length()).abs().sqrt() * *n;

        r_out_perp + r_out_parallel
    }

    pub fn lerp(&self, to: Vec3, t: f64) -> Vec3 {
        Vec3::new(
            (1.0 - t) * self.0 + t * to.0,
            (1.0 - t) * self.1 + t * to.1,
            (1.0 - t) * self.2 + t * to.2,
        )
    }

    #[cfg(test)]
    #[inline]
    pub fn rel_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.0 - other.0).abs() < epsilon
            && (self.1 - other.1).abs() < epsilon
            && (self.2 - other.2).abs() < epsilon
    }
}

impl Distribution<Vec3> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3(rng.gen(), rng.gen(), rng.gen())
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3(0.0, 0.0, 0.0)
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Vec3(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
        self.1 += other.1;
        self.2 += other.2;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Vec3(self.0 - other.0, self.1 - other.1, self.2 - other.2)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        Vec3(v.0 * self, v.1 * self, v.2 * self)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, c: f64) -> Self {
        Vec3(self.0 * c, self.1 * c, self.2 * c)
    }
}

impl Mul for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, other: Vec3) -> Self {
        self.mul_pointwise(&other)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, c: f64) -> Self {
        Vec3(self.0 / c, self.1 / c, self.2 / c)
    }
}

impl Div for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, other: Vec3) -> Self {
        self.div_pointwise(&other)
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    const EPS: f64 = 1E-8;

    #[test]
    fn unit_has_length_one() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = Vec3::rand_within(&mut rng, rand::distributions::Uniform::new(-50.0, 50.0));
            if v.near_zero() {
                continue;
            }
            assert!((v.unit().length() - 1.0).abs() < EPS, "|unit({})| != 1", v);
        }
        assert!((Vec3::new(1e-5, 0.0, 0.0).unit().length() - 1.0).abs() < EPS);
    }

    #[test]
    fn unit_of_zero_is_nan() {
        let zero = Vec3::default();
        let unit = zero.unit();
        assert!(unit.x().is_nan() && unit.y().is_nan() && unit.z().is_nan());
        assert_eq!(zero.try_unit(), None);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let mut rng = SmallRng::seed_from_u64(11);
        let dist = rand::distributions::Uniform::new(-1.0, 1.0);
        for _ in 0..1000 {
            let v = Vec3::rand_within(&mut rng, dist);
            let n = match Vec3::rand_within(&mut rng, dist).try_unit() {
                Some(n) => n,
                None => continue,
            };
            let reflected = v.reflect(&n);
            assert!((reflected.dot(&n) + v.dot(&n)).abs() < EPS);
            assert!((reflected.length() - v.length()).abs() < EPS);
        }
    }

    #[test]
    fn refract_with_unit_ratio_is_identity() {
        let n = Vec3::khat();
        let uv = Vec3::new(0.3, -0.2, -1.0).unit();
        let refracted = uv.refract(&n, 1.0);
        assert!(refracted.rel_eq(&uv, EPS), "refracted = {}", refracted);
    }

    #[test]
    fn refract_bends_towards_normal_entering_denser_medium() {
        let n = Vec3::jhat();
        let uv = Vec3::new(1.0, -1.0, 0.0).unit();
        let refracted = uv.refract(&n, 1.0 / 1.5);

        // sin(theta') = sin(theta) / 1.5
        let sin_in = uv.x();
        let sin_out = refracted.x() / refracted.length();
        assert!((sin_out - sin_in / 1.5).abs() < EPS);
        assert!(refracted.y() < 0.0);
    }

    #[test]
    fn cross_product_is_right_handed() {
        assert!(Vec3::ihat().cross(&Vec3::jhat()).rel_eq(&Vec3::khat(), EPS));
        assert!(Vec3::jhat().cross(&Vec3::khat()).rel_eq(&Vec3::ihat(), EPS));
        assert!(Vec3::khat().cross(&Vec3::ihat()).rel_eq(&Vec3::jhat(), EPS));
    }

    #[test]
    fn pointwise_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(2.0, 4.0, 6.0);
        assert_eq!(a * b, Vec3::new(2.0, 8.0, 18.0));
        assert_eq!(b / a, Vec3::splat(2.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(a.lerp(b, 0.5), Vec3::new(1.5, 3.0, 4.5));
    }

    #[test]
    fn near_zero() {
        assert!(Vec3::new(1e-9, -1e-9, 0.0).near_zero());
        assert!(!Vec3::new(1e-9, -1e-9, 1e-3).near_zero());
    }
}
