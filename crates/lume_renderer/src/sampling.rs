//! Random sampling helpers shared by materials, primitives and the camera.

use std::f32::consts::PI;

use lume_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Rotate a direction given in a local frame (+Z = `n`) into world space.
pub fn to_world(local: Vec3, n: Vec3) -> Vec3 {
    let c = if n.x.abs() > n.y.abs() {
        let inv_len = 1.0 / (n.x * n.x + n.z * n.z).sqrt();
        Vec3::new(n.z * inv_len, 0.0, -n.x * inv_len)
    } else {
        let inv_len = 1.0 / (n.y * n.y + n.z * n.z).sqrt();
        Vec3::new(0.0, n.z * inv_len, -n.y * inv_len)
    };
    let b = c.cross(n);
    local.x * b + local.y * c + local.z * n
}

/// Direction on the hemisphere around `n`, uniform in solid angle.
///
/// pdf = 1 / 2π
pub fn uniform_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let z = gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    to_world(Vec3::new(r * phi.cos(), r * phi.sin(), z), n)
}

/// Direction on the hemisphere around `n`, distributed by cos θ.
///
/// pdf = cos θ / π
pub fn cosine_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let phi = 2.0 * PI * gen_f32(rng);
    let r = u1.sqrt();
    let z = (1.0 - u1).max(0.0).sqrt();
    to_world(Vec3::new(r * phi.cos(), r * phi.sin(), z), n)
}

/// Point on the unit sphere, uniform in area.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Barycentric weights `(w0, w1, w2)` uniform over a triangle's area.
pub fn uniform_triangle(rng: &mut dyn RngCore) -> (f32, f32, f32) {
    let x = gen_f32(rng).sqrt();
    let y = gen_f32(rng);
    (1.0 - x, x * (1.0 - y), x * y)
}
