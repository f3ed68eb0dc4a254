/// Example scenes as shown in Ray Tracing in One Weekend.
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;

use super::Scene;
use crate::camera::Camera;
use crate::geom::{
    Color,
    Point3,
};
use crate::material::Material;
use crate::util::RandUtil;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Example {
    RandomSpheres,
    Materials,
    TwoSpheres,
}

#[derive(Debug, Clone)]
pub struct InvalidExample(String);

impl ::std::error::Error for InvalidExample {}

impl ::std::fmt::Display for InvalidExample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid example '{}', expected one of: random-spheres, materials, two-spheres",
            self.0
        )
    }
}

impl FromStr for Example {
    type Err = InvalidExample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random-spheres" | "one-weekend" => Ok(Example::RandomSpheres),
            "materials" => Ok(Example::Materials),
            "two-spheres" => Ok(Example::TwoSpheres),
            _ => Err(InvalidExample(s.to_string())),
        }
    }
}

impl Example {
    pub fn scene<R: Rng>(&self, aspect_ratio: f64, rng: &mut R) -> (Scene, Camera) {
        match self {
            Example::RandomSpheres => random_spheres(aspect_ratio, rng),
            Example::Materials => materials(aspect_ratio),
            Example::TwoSpheres => two_spheres(aspect_ratio),
        }
    }
}

/// Where the three large spheres of the random scene touch the ground plane.
const FEATURE_FOOTPRINTS: [Point3; 3] = [
    Point3::new(-4.0, 0.2, 0.0),
    Point3::new(0.0, 0.2, 0.0),
    Point3::new(4.0, 0.2, 0.0),
];

/// Create a random scene as shown in the final section of Ray Tracing in One Weekend.
pub fn random_spheres<R: Rng>(aspect_ratio: f64, rng: &mut R) -> (Scene, Camera) {
    let camera = Camera::builder(20.0, aspect_ratio)
        .from(Point3::new(13., 2., 3.))
        .towards(Point3::new(0., 0., 0.))
        .focus_dist(10.)
        .aperture(0.1)
        .build();

    let mut scene = Scene::builder();

    let ground_material = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    scene.add_sphere(Point3::new(0., -1000., 0.), 1000., &ground_material);

    // Glass carries no per-sphere state, so every small glass sphere shares one.
    let glass = Arc::new(Material::dielectric(1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_material = rng.gen::<f64>();
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if FEATURE_FOOTPRINTS
                .iter()
                .any(|&footprint| (center - footprint).length() <= 0.9)
            {
                continue;
            }
            let material = if choose_material < 0.7 {
                // diffuse
                let albedo = rng.gen::<Color>() * rng.gen::<Color>();
                Arc::new(Material::lambertian(albedo))
            } else if choose_material < 0.9 {
                // metal
                let albedo = rng.gen_vec_range(0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                Arc::new(Material::metal(albedo, fuzz))
            } else {
                glass.clone()
            };
            scene.add_sphere(center, 0.2, &material);
        }
    }

    scene.add_sphere(Point3::new(0., 1., 0.), 1.0, &glass);
    let diffuse = Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    scene.add_sphere(Point3::new(-4., 1., 0.), 1.0, &diffuse);
    let metal = Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    scene.add_sphere(Point3::new(4., 1., 0.), 1.0, &metal);

    (scene.build(), camera)
}

/// Diffuse, hollow glass and fuzzy metal side by side on a green ground.
fn materials(aspect_ratio: f64) -> (Scene, Camera) {
    let camera = Camera::builder(20.0, aspect_ratio)
        .from(Point3::new(-2., 2., 1.))
        .towards(Point3::new(0., 0., -1.))
        .focus_dist(3.4)
        .aperture(0.1)
        .build();

    let ground = Arc::new(Material::lambertian(Color::new(0.8, 0.8, 0.0)));
    let center = Arc::new(Material::lambertian(Color::new(0.1, 0.2, 0.5)));
    let left = Arc::new(Material::dielectric(1.5));
    let right = Arc::new(Material::metal(Color::new(0.8, 0.6, 0.2), 0.0));

    let mut scene = Scene::builder();
    scene.add_sphere(Point3::new(0., -100.5, -1.), 100., &ground);
    scene.add_sphere(Point3::new(0., 0., -1.), 0.5, &center);
    // A negative radius inside the glass sphere makes it a hollow shell.
    scene.add_sphere(Point3::new(-1., 0., -1.), 0.5, &left);
    scene.add_sphere(Point3::new(-1., 0., -1.), -0.45, &left);
    scene.add_sphere(Point3::new(1., 0., -1.), 0.5, &right);

    (scene.build(), camera)
}

/// A single diffuse sphere resting on a diffuse ground, seen through a pinhole.
fn two_spheres(aspect_ratio: f64) -> (Scene, Camera) {
    let camera = Camera::builder(90.0, aspect_ratio).build();

    let ground = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    let center = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));

    let mut scene = Scene::builder();
    scene.add_sphere(Point3::new(0., -100.5, -1.), 100., &ground);
    scene.add_sphere(Point3::new(0., 0., -1.), 0.5, &center);

    (scene.build(), camera)
}
