use std::sync::Arc;

use rand::Rng;

use crate::geom::{
    Color,
    Point3,
};
use crate::material::{
    Material,
    Scatter,
};
use crate::surfaces::{
    HittableList,
    Sphere,
};
use crate::trace::Hittable;
use crate::trace::Ray;

pub mod example;
mod load;

pub use load::load_scene;

/// Rays starting closer than this to a surface ignore it, which keeps
/// floating point error from re-hitting the surface a ray just left.
const SELF_INTERSECTION_EPSILON: f64 = 0.001;

/// Vertical gradient seen by rays that escape the scene.
#[derive(Debug, Clone)]
pub struct Sky {
    pub horizon: Color,
    pub zenith: Color,
}

impl Default for Sky {
    fn default() -> Self {
        Sky {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

impl Sky {
    pub fn color(&self, ray: &Ray) -> Color {
        let t = 0.5 * (ray.dir().unit().y() + 1.0);
        self.horizon.lerp(self.zenith, t)
    }
}

#[derive(Clone)]
pub struct Scene {
    world: HittableList,
    sky: Sky,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder {
            world: HittableList::new(),
            sky: Sky::default(),
        }
    }

    pub fn world(&self) -> &HittableList {
        &self.world
    }
}

pub struct SceneBuilder {
    world: HittableList,
    sky: Sky,
}

impl SceneBuilder {
    pub fn add<H>(&mut self, surface: H)
    where
        H: Hittable + 'static,
    {
        self.world.add(surface);
    }

    pub fn add_sphere(&mut self, center: Point3, radius: f64, material: &Arc<Material>) {
        self.add(Sphere::new(center, radius, material.clone()));
    }

    pub fn set_sky(&mut self, sky: Sky) {
        self.sky = sky;
    }

    pub fn len(&self) -> usize {
        self.world.len()
    }

    pub fn build(self) -> Scene {
        if self.world.is_empty() {
            log::warn!("scene has no objects, every ray will see the sky");
        }
        log::debug!("built scene with {} objects", self.world.len());
        Scene {
            world: self.world,
            sky: self.sky,
        }
    }
}

impl Scene {
    /// Estimate the light arriving back along `ray`.
    ///
    /// Every bounce multiplies the path's throughput by the surface attenuation.
    /// The path ends black when it's absorbed or runs out of bounces, and takes
    /// the sky color when it escapes.
    pub fn ray_color<R: Rng>(&self, mut ray: Ray, rng: &mut R, max_depth: usize) -> Color {
        // In the book this is done recursively, but without emissive surfaces
        // the recursion collapses into a running product of attenuations.
        let mut throughput = Color::new(1.0, 1.0, 1.0);
        for _ in 0..max_depth {
            let hit = match self
                .world
                .hit(&ray, SELF_INTERSECTION_EPSILON, ::std::f64::INFINITY)
            {
                Some(hit) => hit,
                // The ray escaped after bouncing.
                None => return throughput * self.sky.color(&ray),
            };
            match hit.material.scatter(&ray, &hit, rng) {
                Some((attenuation, scattered)) => {
                    throughput = throughput * attenuation;
                    ray = scattered;
                }
                // Absorbed.
                None => return Color::default(),
            }
        }
        // Out of bounces.
        Color::default()
    }
}
