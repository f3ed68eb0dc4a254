use crate::geom::{
    Point3,
    Vec3,
};
use crate::material::Material;

#[derive(Debug, Clone)]
pub struct Ray {
    origin: Point3,
    dir: Vec3,
}

impl Ray {
    pub fn new(origin: Point3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Clone)]
pub struct Hit<'m> {
    pub point: Point3,
    /// Always points against the incoming ray.
    pub normal: Vec3,
    pub t: f64,
    /// Whether the ray approached from the outside of the surface.
    pub front_face: bool,
    pub material: &'m Material,
}

impl<'m> Hit<'m> {
    pub fn new(ray: &Ray, t: f64, outward_normal: Vec3, material: &'m Material) -> Self {
        let point = ray.at(t);
        // A ray exactly tangent to the surface (dot == 0) counts as a back face hit.
        let front_face = ray.dir().dot(&outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            outward_normal.negate()
        };
        Hit {
            point,
            normal,
            t,
            front_face,
            material,
        }
    }
}

/// An object within the scene that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Attempt to hit object with `ray`, returning the hit that occurred, if any.
    ///
    /// The hit must not be returned if it occured at time t outside [t_min, t_max].
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>>;
}
