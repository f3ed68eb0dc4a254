use rand::Rng;

use crate::geom::{
    Color,
    Vec3,
};
use crate::trace::{
    Hit,
    Ray,
};
use crate::util::RandUtil;

/// How a surface responds to an incoming ray.
pub trait Scatter {
    /// Returns the attenuation and the scattered ray, or `None` if the ray was absorbed.
    fn scatter<R: Rng>(&self, ray: &Ray, hit: &Hit<'_>, rng: &mut R) -> Option<(Color, Ray)>;
}

#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian(Lambertian { albedo })
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal(Metal::new(albedo, fuzz))
    }

    /// Clear glass.
    pub fn dielectric(refractive_index: f64) -> Self {
        Material::tinted_dielectric(Vec3::splat(1.0), refractive_index)
    }

    pub fn tinted_dielectric(albedo: Color, refractive_index: f64) -> Self {
        Material::Dielectric(Dielectric {
            albedo,
            refractive_index,
        })
    }
}

impl Scatter for Material {
    #[inline(always)]
    fn scatter<R: Rng>(&self, ray: &Ray, hit: &Hit<'_>, rng: &mut R) -> Option<(Color, Ray)> {
        match *self {
            Self::Lambertian(ref m) => m.scatter(ray, hit, rng),
            Self::Metal(ref m) => m.scatter(ray, hit, rng),
            Self::Dielectric(ref m) => m.scatter(ray, hit, rng),
        }
    }
}

/// An ideal diffuse surface.
#[derive(Debug, Clone)]
pub struct Lambertian {
    pub albedo: Color,
}

impl Scatter for Lambertian {
    #[inline(always)]
    fn scatter<R: Rng>(&self, _: &Ray, hit: &Hit<'_>, rng: &mut R) -> Option<(Color, Ray)> {
        // Offsetting the normal by a point inside the unit sphere approximates
        // a cosine-weighted lobe. Sampling on the sphere instead would be the
        // true lambertian distribution and renders slightly darker.
        let mut scatter_direction = hit.normal + rng.gen_in_unit_sphere();

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = hit.normal;
        }

        Some((self.albedo, Ray::new(hit.point, scatter_direction)))
    }
}

#[derive(Debug, Clone)]
pub struct Metal {
    pub albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// `fuzz` is clamped to [0, 1].
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        if !(0.0..=1.0).contains(&fuzz) {
            log::warn!("metal fuzz {} out of range, clamping to [0, 1]", fuzz);
        }
        Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    #[cfg(test)]
    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}

impl Scatter for Metal {
    #[inline(always)]
    fn scatter<R: Rng>(&self, ray: &Ray, hit: &Hit<'_>, rng: &mut R) -> Option<(Color, Ray)> {
        let reflected = ray.dir().reflect(&hit.normal).unit();
        let direction = if self.fuzz > 0.0 {
            reflected + self.fuzz * rng.gen_in_unit_sphere()
        } else {
            reflected
        };
        // Fuzz can push the ray below the surface, in which case it's absorbed.
        if direction.dot(&hit.normal) > 0.0 {
            Some((self.albedo, Ray::new(hit.point, direction)))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dielectric {
    pub albedo: Color,
    pub refractive_index: f64,
}

impl Scatter for Dielectric {
    #[inline(always)]
    fn scatter<R: Rng>(&self, ray: &Ray, hit: &Hit<'_>, rng: &mut R) -> Option<(Color, Ray)> {
        let refraction_ratio = if hit.front_face {
            1.0 / self.refractive_index
        } else {
            self.refractive_index
        };
        let unit_dir = ray.dir().unit();
        let cos_theta = unit_dir.negate().dot(&hit.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let scatter_dir =
            if cannot_refract || reflectance(cos_theta, refraction_ratio) > rng.gen::<f64>() {
                // Refraction impossible, must reflect.
                unit_dir.reflect(&hit.normal)
            } else {
                unit_dir.refract(&hit.normal, refraction_ratio)
            };
        Some((self.albedo, Ray::new(hit.point, scatter_dir)))
    }
}

fn reflectance(cosine: f64, refraction_ratio: f64) -> f64 {
    // Use Schlick's approximation for reflectance.
    //
    // https://en.wikipedia.org/wiki/Schlick%27s_approximation
    let mut r0 = (1.0 - refraction_ratio) / (1.0 + refraction_ratio);
    r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geom::Point3;

    const EPS: f64 = 1E-9;

    fn hit_at_origin<'m>(material: &'m Material, ray: &Ray, outward: Vec3) -> Hit<'m> {
        Hit::new(ray, 1.0, outward, material)
    }

    #[test]
    fn lambertian_always_scatters() {
        let material = Material::lambertian(Vec3::new(0.1, 0.2, 0.3));
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = hit_at_origin(&material, &ray, Vec3::khat());
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..10_000 {
            let (attenuation, scattered) = material
                .scatter(&ray, &hit, &mut rng)
                .expect("lambertian must scatter");
            assert_eq!(attenuation, Vec3::new(0.1, 0.2, 0.3));
            assert!(!scattered.dir().near_zero());
            assert!(scattered.dir().dot(&hit.normal) >= 0.0);
        }
    }

    #[test]
    fn perfect_mirror() {
        let material = Material::metal(Vec3::splat(0.8), 0.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = hit_at_origin(&material, &ray, Vec3::khat());
        let mut rng = SmallRng::seed_from_u64(6);

        let (attenuation, scattered) = material
            .scatter(&ray, &hit, &mut rng)
            .expect("mirror must reflect");
        assert_eq!(attenuation, Vec3::splat(0.8));
        assert_eq!(scattered.dir(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(scattered.origin(), hit.point);
    }

    #[test]
    fn metal_absorbs_rays_pushed_below_the_surface() {
        // A grazing ray with full fuzz ends up below the surface some of the time.
        let material = Material::metal(Vec3::splat(0.8), 1.0);
        let ray = Ray::new(Point3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0));
        let hit = hit_at_origin(&material, &ray, Vec3::jhat());
        let mut rng = SmallRng::seed_from_u64(7);

        let mut absorbed = 0;
        for _ in 0..1000 {
            match material.scatter(&ray, &hit, &mut rng) {
                Some((_, scattered)) => assert!(scattered.dir().dot(&hit.normal) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn metal_fuzz_is_clamped() {
        match Material::metal(Vec3::splat(0.5), 3.0) {
            Material::Metal(m) => assert_eq!(m.fuzz(), 1.0),
            other => panic!("unexpected material {:?}", other),
        }
        match Material::metal(Vec3::splat(0.5), -1.0) {
            Material::Metal(m) => assert_eq!(m.fuzz(), 0.0),
            other => panic!("unexpected material {:?}", other),
        }
    }

    #[test]
    fn unit_index_glass_does_not_bend() {
        let material = Material::dielectric(1.0);
        let mut rng = SmallRng::seed_from_u64(8);
        let dir = Vec3::new(0.4, -0.3, -1.0).unit();
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), dir);
        let hit = hit_at_origin(&material, &ray, Vec3::khat());

        // Schlick reflectance at ratio 1 is (1 - cos)^5; only count refractions.
        let mut refracted = 0;
        for _ in 0..100 {
            let (attenuation, scattered) = material
                .scatter(&ray, &hit, &mut rng)
                .expect("glass always scatters");
            assert_eq!(attenuation, Vec3::splat(1.0));
            if scattered.dir().dot(&hit.normal) < 0.0 {
                assert!(scattered.dir().rel_eq(&dir, EPS), "dir = {}", scattered.dir());
                refracted += 1;
            }
        }
        assert!(refracted > 90);
    }

    #[test]
    fn total_internal_reflection() {
        // Leaving glass at a steep angle cannot refract.
        let material = Material::dielectric(1.5);
        let mut rng = SmallRng::seed_from_u64(9);
        let dir = Vec3::new(1.0, 0.2, 0.0).unit();
        let ray = Ray::new(Point3::new(-1.0, -0.2, 0.0), dir);
        // Outward normal along +y, ray travels with it: exiting the surface.
        let hit = hit_at_origin(&material, &ray, Vec3::jhat());
        assert!(!hit.front_face);

        for _ in 0..100 {
            let (_, scattered) = material.scatter(&ray, &hit, &mut rng).unwrap();
            let expected = dir.reflect(&hit.normal);
            assert!(scattered.dir().rel_eq(&expected, EPS));
        }
    }

    #[test]
    fn schlick_endpoints() {
        assert!((reflectance(1.0, 1.0 / 1.5) - 0.04).abs() < 1e-12);
        assert!((reflectance(0.0, 1.0 / 1.5) - 1.0).abs() < 1e-12);
        assert_eq!(reflectance(1.0, 1.0), 0.0);
    }
}
