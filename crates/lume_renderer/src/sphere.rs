//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use lume_math::{Bounds3, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::sampling::uniform_sphere;
use crate::{Hittable, Intersection, Material};

/// A sphere primitive.
#[derive(Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    /// Uniform point on the surface; pdf with respect to area is `1 / area`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        let dir = uniform_sphere(rng);
        let sample = Intersection {
            happened: true,
            distance: 0.0,
            point: self.center + self.radius * dir,
            normal: dir,
            front_face: true,
            uv: Self::get_sphere_uv(dir),
            material: Some(self.material.as_ref()),
            primitive: None,
        };
        (sample, 1.0 / self.area())
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn bounds(&self) -> Bounds3 {
        let rvec = Vec3::splat(self.radius);
        Bounds3::new(self.center - rvec, self.center + rvec)
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        // direction is unit length, so the quadratic's `a` is 1
        let oc = self.center - ray.origin;
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return Intersection::none();
        }
        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let valid = Interval::new(0.0, ray.t_max);
        let mut root = h - sqrtd;
        if !valid.surrounds(root) {
            root = h + sqrtd;
            if !valid.surrounds(root) {
                return Intersection::none();
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Intersection::hit(
            ray,
            root,
            outward_normal,
            Self::get_sphere_uv(outward_normal),
            self.material.as_ref(),
        )
    }
}
