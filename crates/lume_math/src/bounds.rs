use crate::{Axis, Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for the BVH.
///
/// Stored as two corners. `Bounds3::EMPTY` (min at +inf, max at -inf) is the
/// identity of [`Bounds3::union`], so bounds can be folded from nothing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub p_min: Vec3,
    pub p_max: Vec3,
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds3 {
    /// Bounds containing nothing.
    pub const EMPTY: Bounds3 = Bounds3 {
        p_min: Vec3::splat(f32::INFINITY),
        p_max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create bounds from two arbitrary corner points.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            p_min: a.min(b),
            p_max: a.max(b),
        }
    }

    /// Degenerate bounds around a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Smallest bounds covering both `a` and `b`.
    #[inline]
    pub fn union(a: &Bounds3, b: &Bounds3) -> Bounds3 {
        Bounds3 {
            p_min: a.p_min.min(b.p_min),
            p_max: a.p_max.max(b.p_max),
        }
    }

    /// Smallest bounds covering `b` and the point `p`.
    #[inline]
    pub fn union_point(b: &Bounds3, p: Vec3) -> Bounds3 {
        Bounds3 {
            p_min: b.p_min.min(p),
            p_max: b.p_max.max(p),
        }
    }

    /// True until a point has been unioned in.
    pub fn is_empty(&self) -> bool {
        self.p_min.cmpgt(self.p_max).any()
    }

    pub fn diagonal(&self) -> Vec3 {
        self.p_max - self.p_min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    /// `2·(dx·dy + dy·dz + dz·dx)`, zero for empty or collapsed boxes.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Axis with the largest extent. Ties go to the earlier axis (x, then y).
    pub fn max_extent(&self) -> Axis {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// True if `other` lies entirely inside these bounds.
    pub fn contains(&self, other: &Bounds3) -> bool {
        other.is_empty() || (self.p_min.cmple(other.p_min).all() && self.p_max.cmpge(other.p_max).all())
    }

    /// Parametric interval where `ray` is inside all three slabs.
    ///
    /// `inv_dir` and `dir_is_neg` are computed once per ray (see
    /// [`Ray::dir_is_neg`]); the sign bit picks which plane is entered first
    /// so no per-axis swap is needed.
    #[inline]
    pub fn slab_interval(&self, ray: &Ray, inv_dir: Vec3, dir_is_neg: u8) -> Interval {
        let corners = [self.p_min, self.p_max];
        let mut t = Interval::UNIVERSE;
        for axis in 0..3 {
            let neg = ((dir_is_neg >> axis) & 1) as usize;
            let t_near = (corners[neg][axis] - ray.origin[axis]) * inv_dir[axis];
            let t_far = (corners[1 - neg][axis] - ray.origin[axis]) * inv_dir[axis];
            t = t.clip(t_near, t_far);
        }
        t
    }

    /// Slab test: true if the ray enters the box somewhere in `[0, ray.t_max]`.
    #[inline]
    pub fn intersect_p(&self, ray: &Ray, inv_dir: Vec3, dir_is_neg: u8) -> bool {
        let t = self.slab_interval(ray, inv_dir, dir_is_neg);
        !t.is_empty() && t.max >= 0.0 && t.min <= ray.t_max
    }
}
