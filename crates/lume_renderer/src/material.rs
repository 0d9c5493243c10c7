//! Material trait and the shipped BRDFs.
//!
//! Direction conventions for every method: `wi` is the direction the
//! incoming ray travels (pointing *towards* the surface), `wo` is the
//! scattered direction (pointing *away* from it), `n` is the shading normal
//! on the side the ray arrived from. All three are unit vectors.

use std::f32::consts::PI;

use lume_math::Vec3;
use rand::RngCore;

use crate::sampling::{cosine_hemisphere, uniform_hemisphere};

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Emission below this norm counts as "not a light".
const EMISSION_EPSILON: f32 = 1e-5;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// True if the surface emits light.
    fn has_emission(&self) -> bool {
        self.emission().length() > EMISSION_EPSILON
    }

    /// Emitted radiance. Most materials return black.
    fn emission(&self) -> Color {
        Color::ZERO
    }

    /// Importance-sample an outgoing direction.
    fn sample(&self, wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Density of [`Material::sample`] producing `wo`; zero below the surface.
    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32;

    /// BRDF value for the pair of directions; zero below the surface.
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color;
}

/// Lambertian (diffuse) material, optionally emissive.
#[derive(Debug, Clone)]
pub struct Lambertian {
    kd: Color,
    emission: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(kd: Color) -> Self {
        Self {
            kd,
            emission: Color::ZERO,
        }
    }

    /// A diffuse area light.
    pub fn emissive(kd: Color, emission: Color) -> Self {
        Self { kd, emission }
    }

    pub fn albedo(&self) -> Color {
        self.kd
    }
}

impl Material for Lambertian {
    fn emission(&self) -> Color {
        self.emission
    }

    fn sample(&self, _wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        cosine_hemisphere(n, rng)
    }

    fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        let cos_theta = wo.dot(n);
        if cos_theta > 0.0 {
            cos_theta / PI
        } else {
            0.0
        }
    }

    fn eval(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        if wo.dot(n) > 0.0 {
            self.kd / PI
        } else {
            Color::ZERO
        }
    }
}

/// Rough dielectric: GGX specular lobe over a diffuse base.
///
/// The diffuse and specular parts are weighted by the Fresnel term so the
/// material never reflects more than it receives. Directions are sampled
/// uniformly over the hemisphere.
#[derive(Debug, Clone)]
pub struct Microfacet {
    kd: Color,
    ks: Color,
    roughness: f32,
    ior: f32,
}

impl Microfacet {
    /// - `kd`: diffuse color
    /// - `ks`: specular color
    /// - `roughness`: 0.0 = mirror-like, 1.0 = very rough
    /// - `ior`: index of refraction of the coating
    pub fn new(kd: Color, ks: Color, roughness: f32, ior: f32) -> Self {
        Self {
            kd,
            ks,
            roughness: roughness.clamp(0.02, 1.0),
            ior,
        }
    }

    /// GGX / Trowbridge-Reitz normal distribution.
    fn distribution(&self, n_dot_h: f32) -> f32 {
        let a = self.roughness * self.roughness;
        let a2 = a * a;
        let m = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
        a2 / (PI * m * m).max(1e-6)
    }

    /// Smith masking term for one direction (Disney remapping of roughness).
    fn smith_g1(&self, n_dot_v: f32) -> f32 {
        let r = 0.5 + self.roughness / 2.0;
        let r2 = r * r;
        let m = r2 + (1.0 - r2) * n_dot_v * n_dot_v;
        2.0 * n_dot_v / (n_dot_v + m.sqrt()).max(1e-6)
    }
}

impl Material for Microfacet {
    fn sample(&self, _wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(n, rng)
    }

    fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        if wo.dot(n) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }

    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let n_dot_o = wo.dot(n);
        let n_dot_i = (-wi).dot(n);
        if n_dot_o <= 0.0 || n_dot_i <= 0.0 {
            return Color::ZERO;
        }

        let h = (wo - wi).normalize();
        let d = self.distribution(h.dot(n).max(0.0));
        let g = self.smith_g1(n_dot_i) * self.smith_g1(n_dot_o);
        let f = fresnel(wi, n, self.ior);

        let specular = d * g * f / (4.0 * n_dot_i * n_dot_o).max(1e-5);
        self.kd / PI * (1.0 - f) + self.ks * specular
    }
}

/// Unpolarized Fresnel reflectance for a ray travelling along `i` hitting a
/// surface with normal `n` and relative index of refraction `ior`.
pub fn fresnel(i: Vec3, n: Vec3, ior: f32) -> f32 {
    let mut cos_i = i.dot(n).clamp(-1.0, 1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (ior, 1.0) } else { (1.0, ior) };

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        // Total internal reflection
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    cos_i = cos_i.abs();
    let rs = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let rp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    (rs * rs + rp * rp) / 2.0
}
