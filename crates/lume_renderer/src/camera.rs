//! Pinhole camera for primary ray generation.

use lume_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::gen_f32;
use crate::RenderConfig;

/// Fixed pinhole camera at `eye`, looking down +Z with +Y up.
///
/// Screen x grows to the right of the image, which maps to world -X.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    eye: Vec3,
    vfov: f32,
    jitter: bool,

    // Cached from the settings above
    scale: f32,
    aspect: f32,
}

impl Camera {
    /// Create a camera with a vertical field of view in degrees.
    pub fn new(image_width: u32, image_height: u32, vfov: f32, eye: Vec3) -> Self {
        Self {
            image_width,
            image_height,
            eye,
            vfov,
            jitter: false,
            scale: (vfov.to_radians() / 2.0).tan(),
            aspect: image_width as f32 / image_height as f32,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.width, config.height, config.fov, config.eye).with_jitter(config.jitter)
    }

    /// Sample a random position inside the pixel instead of its center.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    /// Unit direction through the image-plane position `(sx, sy)`, measured
    /// in pixels from the top-left corner.
    pub fn direction(&self, sx: f32, sy: f32) -> Vec3 {
        let x = (2.0 * sx / self.image_width as f32 - 1.0) * self.aspect * self.scale;
        let y = (1.0 - 2.0 * sy / self.image_height as f32) * self.scale;
        Vec3::new(-x, y, 1.0).normalize()
    }

    /// Primary ray for pixel `(px, py)`.
    ///
    /// Goes through the pixel center, or through a uniform random point of
    /// the pixel when jitter is on. Without jitter `rng` is not touched.
    pub fn primary_ray(&self, px: u32, py: u32, rng: &mut dyn RngCore) -> Ray {
        let (dx, dy) = if self.jitter {
            (gen_f32(rng), gen_f32(rng))
        } else {
            (0.5, 0.5)
        };
        Ray::new(self.eye, self.direction(px as f32 + dx, py as f32 + dy))
    }
}
