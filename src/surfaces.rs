use std::sync::Arc;

use crate::geom::Point3;
use crate::material::Material;
use crate::trace::{
    Hit,
    Hittable,
    Ray,
};

/// A sphere.
///
/// A negative radius is allowed: the geometry is the same but the outward normal
/// points inwards, which is how hollow glass shells are modelled.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Arc<Material>,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64, material: Arc<Material>) -> Self {
        Sphere {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    #[inline(always)]
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.dir().square_length();
        let half_b = oc.dot(&ray.dir());
        let c = oc.square_length() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;

        if discriminant < 0.0 {
            // Does not hit the sphere.
            return None;
        }
        let root = discriminant.sqrt();
        let mut t = (-half_b - root) / a;
        if t < t_min || t > t_max {
            t = (-half_b + root) / a;
            if t < t_min || t > t_max {
                return None;
            }
        }
        // Divide by the signed radius so negative spheres get inverted normals.
        let outward_normal = (ray.at(t) - self.center) / self.radius;
        Some(Hit::new(ray, t, outward_normal, &self.material))
    }
}

/// An ordered collection of objects, searched linearly for the nearest hit.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<H>(&mut self, object: H)
    where
        H: Hittable + 'static,
    {
        self.objects.push(Arc::new(object));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    /// Returns the nearest hit with `t > 0` inside the window.
    ///
    /// Hits at non-positive t are never reported, even if the caller's window
    /// admits them.
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>> {
        let t_min = t_min.max(f64::MIN_POSITIVE);
        let mut closest = t_max;
        let mut nearest = None;
        for object in &self.objects {
            if let Some(hit) = object.hit(ray, t_min, closest) {
                closest = hit.t;
                nearest = Some(hit);
            }
        }
        nearest
    }
}
