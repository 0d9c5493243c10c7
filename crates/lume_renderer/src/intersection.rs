//! Intersection record returned by primitives and the BVH.

use crate::Material;
use lume_math::{Ray, Vec2, Vec3};

/// Record of a ray-primitive intersection.
///
/// Doubles as the traversal accumulator: [`Intersection::none`] is the
/// "no hit" value, and its infinite distance makes it lose against every
/// real hit in [`Intersection::closer`].
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    pub happened: bool,
    /// Ray parameter of the hit, `f32::INFINITY` when nothing was hit
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Shading normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the front face (geometric normal side)
    pub front_face: bool,
    /// Texture/barycentric coordinates
    pub uv: Vec2,
    /// Material of the hit primitive
    pub material: Option<&'a dyn Material>,
    /// Handle of the hit primitive in the slice the BVH was built from
    pub primitive: Option<usize>,
}

impl<'a> Intersection<'a> {
    /// The no-hit sentinel.
    pub fn none() -> Self {
        Self {
            happened: false,
            distance: f32::INFINITY,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            front_face: false,
            uv: Vec2::ZERO,
            material: None,
            primitive: None,
        }
    }

    /// A hit at `distance` along `ray` with the given outward normal.
    pub fn hit(
        ray: &Ray,
        distance: f32,
        outward_normal: Vec3,
        uv: Vec2,
        material: &'a dyn Material,
    ) -> Self {
        let mut isect = Self {
            happened: true,
            distance,
            point: ray.at(distance),
            normal: outward_normal,
            front_face: true,
            uv,
            material: Some(material),
            primitive: None,
        };
        isect.set_face_normal(ray, outward_normal);
        isect
    }

    /// Set the shading normal from the ray direction and outward normal.
    ///
    /// The normal is stored pointing against the ray; `front_face` records
    /// which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Whichever of the two records is nearer; `self` wins ties.
    #[inline]
    pub fn closer(self, other: Self) -> Self {
        if other.distance < self.distance {
            other
        } else {
            self
        }
    }

    /// Emitted radiance at the hit, zero for misses and non-emitters.
    pub fn emission(&self) -> Vec3 {
        match self.material {
            Some(m) if m.has_emission() => m.emission(),
            _ => Vec3::ZERO,
        }
    }
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intersection")
            .field("happened", &self.happened)
            .field("distance", &self.distance)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("front_face", &self.front_face)
            .field("primitive", &self.primitive)
            .finish()
    }
}
