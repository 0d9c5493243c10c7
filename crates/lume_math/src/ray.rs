use crate::Vec3;

/// A ray in 3D space.
///
/// The direction is normalized on construction and its component-wise
/// inverse is cached so box traversal never divides. `t_max` bounds the
/// valid segment: `f32::INFINITY` for camera and bounce rays, the distance
/// to the light sample for shadow rays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_direction: Vec3,
    pub t_max: f32,
}

impl Ray {
    /// Create a new unbounded ray. `direction` does not need to be unit length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            t_max: f32::INFINITY,
        }
    }

    /// Create a ray from `origin` towards `target` that stops `epsilon`
    /// short of it.
    pub fn between(origin: Vec3, target: Vec3, epsilon: f32) -> Self {
        let to_target = target - origin;
        Self::new(origin, to_target).with_t_max(to_target.length() - epsilon)
    }

    /// Return a copy of this ray restricted to `[0, t_max]`.
    #[inline]
    pub fn with_t_max(mut self, t_max: f32) -> Self {
        self.t_max = t_max;
        self
    }

    /// Sign mask of the inverse direction: bit `i` is set when axis `i`
    /// points towards negative infinity.
    ///
    /// Uses the inverse rather than the direction so that a `-0.0` component
    /// (inverse `-inf`) is classified consistently with its slab distances.
    #[inline]
    pub fn dir_is_neg(&self) -> u8 {
        (self.inv_direction.x < 0.0) as u8
            | ((self.inv_direction.y < 0.0) as u8) << 1
            | ((self.inv_direction.z < 0.0) as u8) << 2
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 3.0, 4.0));

        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.direction - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
        assert_eq!(ray.t_max, f32::INFINITY);
    }

    #[test]
    fn test_ray_caches_inverse_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));

        assert_eq!(ray.inv_direction.x, f32::INFINITY);
        assert_eq!(ray.inv_direction.y, -1.0);
        assert_eq!(ray.inv_direction.z, f32::INFINITY);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_dir_is_neg_mask() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(ray.dir_is_neg(), 0b101);

        // -0.0 has an inverse of -inf and must be flagged negative
        let ray = Ray::new(Vec3::ZERO, Vec3::new(-0.0, 1.0, 0.0));
        assert_eq!(ray.dir_is_neg() & 1, 1);
    }

    #[test]
    fn test_ray_between() {
        let ray = Ray::between(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), 0.01);

        assert_eq!(ray.direction, Vec3::Z);
        assert!((ray.t_max - 9.99).abs() < 1e-5);
    }
}
