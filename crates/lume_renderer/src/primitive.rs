//! Geometry that can be stored in the BVH.

use lume_math::{Bounds3, Ray};
use rand::RngCore;

use crate::{Intersection, Material, Sphere, Triangle};

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Get the axis-aligned bounding box of this object.
    fn bounds(&self) -> Bounds3;

    /// Nearest intersection with `ray` in `(0, ray.t_max)`, or
    /// [`Intersection::none`].
    fn intersect(&self, ray: &Ray) -> Intersection<'_>;
}

/// A scene primitive.
///
/// The set of shapes is closed, so dispatch is a `match` rather than a
/// trait object. The scene owns a `Vec<Primitive>`; the BVH and the light
/// list refer to entries by index.
#[derive(Clone)]
pub enum Primitive {
    Triangle(Triangle),
    Sphere(Sphere),
}

impl Primitive {
    /// Surface area, used to weight light selection.
    pub fn area(&self) -> f32 {
        match self {
            Primitive::Triangle(t) => t.area(),
            Primitive::Sphere(s) => s.area(),
        }
    }

    pub fn material(&self) -> &dyn Material {
        match self {
            Primitive::Triangle(t) => t.material(),
            Primitive::Sphere(s) => s.material(),
        }
    }

    /// True if the primitive is a light source.
    pub fn has_emit(&self) -> bool {
        self.material().has_emission()
    }

    /// Uniform point on the surface and its area pdf.
    ///
    /// The returned record carries the geometric (outward) normal and the
    /// primitive's material.
    pub fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        match self {
            Primitive::Triangle(t) => t.sample(rng),
            Primitive::Sphere(s) => s.sample(rng),
        }
    }
}

impl Hittable for Primitive {
    fn bounds(&self) -> Bounds3 {
        match self {
            Primitive::Triangle(t) => t.bounds(),
            Primitive::Sphere(s) => s.bounds(),
        }
    }

    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        match self {
            Primitive::Triangle(t) => t.intersect(ray),
            Primitive::Sphere(s) => s.intersect(ray),
        }
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}
