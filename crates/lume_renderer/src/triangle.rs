//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use lume_math::{Bounds3, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::sampling::uniform_triangle;
use crate::{Hittable, Intersection, Material, Primitive};

/// A triangle primitive.
///
/// Triangles are two-sided for visibility. The geometric normal (from the
/// winding of `v0, v1, v2`) decides which side an emissive triangle lights.
#[derive(Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed edges from v0
    e1: Vec3,
    e2: Vec3,
    /// Unit geometric normal, `e1 × e2` direction
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
        }
    }

    /// Two triangles covering the planar quad `a, b, c, d` (in winding order).
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: Arc<dyn Material>) -> [Triangle; 2] {
        [
            Triangle::new(a, b, c, material.clone()),
            Triangle::new(a, c, d, material),
        ]
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    /// Uniform point on the triangle; pdf with respect to area is `1 / area`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> (Intersection<'_>, f32) {
        let (w0, w1, w2) = uniform_triangle(rng);
        let point = self.v0 * w0 + self.v1 * w1 + self.v2 * w2;
        let sample = Intersection {
            happened: true,
            distance: 0.0,
            point,
            normal: self.normal,
            front_face: true,
            uv: Vec2::new(w1, w2),
            material: Some(self.material.as_ref()),
            primitive: None,
        };
        (sample, 1.0 / self.area)
    }
}

impl Hittable for Triangle {
    fn bounds(&self) -> Bounds3 {
        Bounds3::union_point(&Bounds3::new(self.v0, self.v1), self.v2)
    }

    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        let h = ray.direction.cross(self.e2);
        let a = self.e1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-10 {
            return Intersection::none();
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return Intersection::none();
        }

        let q = s.cross(self.e1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return Intersection::none();
        }

        let t = f * self.e2.dot(q);
        if !(t > 0.0 && t < ray.t_max) {
            return Intersection::none();
        }

        Intersection::hit(ray, t, self.normal, Vec2::new(u, v), self.material.as_ref())
    }
}

/// Build triangles from an indexed vertex buffer sharing one material.
///
/// Degenerate (zero-area) triangles are skipped; they can never be hit and
/// would give light sampling an infinite pdf.
pub fn triangles_from_indexed(
    positions: &[Vec3],
    indices: &[[u32; 3]],
    material: Arc<dyn Material>,
) -> Vec<Primitive> {
    let triangles: Vec<Primitive> = indices
        .iter()
        .map(|&[a, b, c]| {
            Triangle::new(
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
                material.clone(),
            )
        })
        .filter(|tri| tri.area() > 0.0)
        .map(Primitive::from)
        .collect();

    let skipped = indices.len() - triangles.len();
    if skipped > 0 {
        log::debug!("Skipped {} degenerate triangles", skipped);
    }
    triangles
}
