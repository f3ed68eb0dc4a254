use rand::Rng;

use crate::geom::{
    Point3,
    Vec3,
};
use crate::trace::Ray;
use crate::util::RandUtil;

/// A thin-lens camera.
///
/// With a zero aperture every ray leaves from the same point and the camera
/// behaves as a pinhole. Otherwise ray origins are spread over a disk of
/// diameter `aperture` and only the plane at `focus_dist` is in perfect focus.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Point3,
    lower_left: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
}

#[derive(Debug, Clone)]
pub struct CameraBuilder {
    from: Point3,
    towards: Point3,
    vup: Vec3,
    aspect_ratio: f64,
    vfov_radians: f64,
    aperture: f64,
    focus_dist: f64,
}

impl Camera {
    /// `vfov` is the vertical field of view in degrees.
    pub fn builder(vfov: f64, aspect_ratio: f64) -> CameraBuilder {
        CameraBuilder {
            aspect_ratio,
            vfov_radians: vfov.to_radians(),
            from: Point3::new(0., 0., 0.),
            towards: Point3::new(0., 0., -1.),
            vup: Vec3::jhat(),
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }

    fn new(builder: CameraBuilder) -> Camera {
        let h = (builder.vfov_radians / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = builder.aspect_ratio * viewport_height;

        // Form an orthonormal basis for our camera system.
        //
        // w points back towards the viewer.
        let w: Vec3 = (builder.from - builder.towards).unit();
        let u = builder.vup.cross(&w).unit();
        let v = w.cross(&u);

        let origin = builder.from;
        let horizontal = builder.focus_dist * viewport_width * u;
        let vertical = builder.focus_dist * viewport_height * v;
        let lower_left = origin - horizontal / 2.0 - vertical / 2.0 - builder.focus_dist * w;
        Camera {
            origin,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: builder.aperture / 2.0,
        }
    }

    /// Cast a ray through the viewport, where `(s, t)` in [0, 1]² spans it from the lower left.
    pub fn get_ray<R: Rng>(&self, rng: &mut R, s: f64, t: f64) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * rng.gen_in_unit_disk();
            self.u * rd.x() + self.v * rd.y()
        } else {
            Vec3::default()
        };
        let dir = self.lower_left + s * self.horizontal + t * self.vertical - self.origin - offset;
        Ray::new(self.origin + offset, dir)
    }
}

impl CameraBuilder {
    pub fn from(self, from: Point3) -> Self {
        CameraBuilder { from, ..self }
    }

    pub fn towards(self, towards: Point3) -> Self {
        CameraBuilder { towards, ..self }
    }

    pub fn up(self, vup: Vec3) -> Self {
        CameraBuilder { vup, ..self }
    }

    pub fn aperture(self, aperture: f64) -> Self {
        CameraBuilder { aperture, ..self }
    }

    pub fn focus_dist(self, focus_dist: f64) -> Self {
        CameraBuilder { focus_dist, ..self }
    }

    /// Whether the view direction and up vector span a plane.
    ///
    /// Building a camera from a degenerate configuration yields NaN rays.
    pub fn is_degenerate(&self) -> bool {
        let view = self.from - self.towards;
        view.near_zero() || self.vup.cross(&view).near_zero()
    }

    pub fn build(self) -> Camera {
        Camera::new(self)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    const EPS: f64 = 1E-9;

    #[test]
    fn pinhole_center_ray_looks_at_target() {
        let camera = Camera::builder(90.0, 2.0)
            .from(Point3::new(1.0, 2.0, 3.0))
            .towards(Point3::new(1.0, 2.0, -7.0))
            .build();
        let mut rng = SmallRng::seed_from_u64(0);

        let ray = camera.get_ray(&mut rng, 0.5, 0.5);
        assert_eq!(ray.origin(), Point3::new(1.0, 2.0, 3.0));
        assert!(ray.dir().unit().rel_eq(&Vec3::new(0.0, 0.0, -1.0), EPS));
        // u x v points back towards the viewer.
        assert!(camera.u.cross(&camera.v).rel_eq(&Vec3::khat(), EPS));
    }

    #[test]
    fn viewport_corners() {
        // 90 degree fov: viewport is 2 high, 4 wide at unit focus distance.
        let camera = Camera::builder(90.0, 2.0).build();
        let mut rng = SmallRng::seed_from_u64(0);

        let lower_left = camera.get_ray(&mut rng, 0.0, 0.0);
        assert!(lower_left.dir().rel_eq(&Vec3::new(-2.0, -1.0, -1.0), EPS));
        let upper_right = camera.get_ray(&mut rng, 1.0, 1.0);
        assert!(upper_right.dir().rel_eq(&Vec3::new(2.0, 1.0, -1.0), EPS));
    }

    #[test]
    fn basis_is_orthonormal() {
        let camera = Camera::builder(20.0, 1.5)
            .from(Point3::new(13.0, 2.0, 3.0))
            .towards(Point3::new(0.0, 0.0, 0.0))
            .build();
        let w = camera.u.cross(&camera.v);
        for a in [camera.u, camera.v, w] {
            assert!((a.length() - 1.0).abs() < EPS);
        }
        assert!(camera.u.dot(&camera.v).abs() < EPS);
        // w is the unit view direction, reversed.
        assert!(w.rel_eq(&Point3::new(13.0, 2.0, 3.0).unit(), EPS));
    }

    #[test]
    fn lens_rays_converge_on_focus_plane() {
        let focus_dist = 4.0;
        let camera = Camera::builder(40.0, 1.0)
            .aperture(0.5)
            .focus_dist(focus_dist)
            .build();
        let mut rng = SmallRng::seed_from_u64(21);

        for _ in 0..100 {
            let ray = camera.get_ray(&mut rng, 0.5, 0.5);
            // Origins spread over the lens disk.
            assert!(ray.origin().length() <= 0.25 + EPS);
            assert_eq!(ray.origin().z(), 0.0);
            // Direction reaches the focus plane at its center.
            let focus = ray.at(1.0);
            assert!(focus.rel_eq(&Point3::new(0.0, 0.0, -focus_dist), EPS));
        }
    }

    #[test]
    fn degenerate_configuration() {
        assert!(Camera::builder(40.0, 1.0)
            .from(Point3::new(1.0, 1.0, 1.0))
            .towards(Point3::new(1.0, 1.0, 1.0))
            .is_degenerate());
        assert!(Camera::builder(40.0, 1.0)
            .towards(Point3::new(0.0, -3.0, 0.0))
            .is_degenerate());
        assert!(!Camera::builder(40.0, 1.0).is_degenerate());
    }
}
