//! Render and BVH configuration.
//!
//! Every tunable constant of the renderer lives here instead of being
//! baked into the algorithms. Both structs deserialize from JSON with
//! per-field defaults, so a config file only needs the fields it changes.

use std::path::Path;

use lume_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hard ceiling on primitives stored in one BVH leaf.
pub const MAX_PRIMS_IN_NODE_LIMIT: usize = 255;

/// How the BVH builder partitions primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Sort by centroid on the widest axis and split in half.
    Median,
    /// Pick the cheapest of a fixed set of candidate planes.
    Sah,
}

/// BVH build parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    pub split_method: SplitMethod,
    /// Clamped to `1..=MAX_PRIMS_IN_NODE_LIMIT` by the builder.
    pub max_prims_in_node: usize,
    /// SAH cost of visiting one interior node
    pub traversal_cost: f32,
    /// SAH cost of one primitive intersection test
    pub intersection_cost: f32,
    /// Number of evenly spaced SAH split planes tried per node
    pub sah_candidates: usize,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            split_method: SplitMethod::Sah,
            max_prims_in_node: 1,
            traversal_cost: 0.125,
            intersection_cost: 1.0,
            sah_candidates: 7,
        }
    }
}

impl BvhConfig {
    /// Median-split configuration with otherwise default values.
    pub fn median() -> Self {
        Self {
            split_method: SplitMethod::Median,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sah_candidates == 0 {
            return Err(Error::InvalidConfig("sah_candidates must be at least 1".into()));
        }
        if !(self.traversal_cost >= 0.0 && self.intersection_cost >= 0.0) {
            return Err(Error::InvalidConfig("SAH costs must be non-negative".into()));
        }
        Ok(())
    }
}

/// Render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Camera position; the camera looks down +Z
    pub eye: Vec3,
    /// Samples per pixel
    pub spp: u32,
    /// Number of render worker threads
    pub threads: usize,
    /// Base seed; each worker derives its own stream from it
    pub seed: u64,
    /// Survival probability for Russian roulette
    pub russian_roulette: f32,
    /// Offset applied to secondary ray origins and shadow ray ends
    pub ray_epsilon: f32,
    /// Jitter primary rays inside the pixel instead of using its center
    pub jitter: bool,
    pub bvh: BvhConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            fov: 40.0,
            eye: Vec3::new(278.0, 273.0, -800.0),
            spp: 16,
            threads: 8,
            seed: 0x5eed,
            russian_roulette: 0.8,
            ray_epsilon: 1e-4,
            jitter: false,
            bvh: BvhConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.spp == 0 {
            return Err(Error::InvalidConfig("spp must be at least 1".into()));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig("threads must be at least 1".into()));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::InvalidConfig(format!(
                "fov must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        if !(self.russian_roulette > 0.0 && self.russian_roulette < 1.0) {
            // at 1.0 paths only end by escaping, so closed scenes never return
            return Err(Error::InvalidConfig(format!(
                "russian_roulette must be in (0, 1), got {}",
                self.russian_roulette
            )));
        }
        if !(self.ray_epsilon > 0.0) {
            return Err(Error::InvalidConfig("ray_epsilon must be positive".into()));
        }
        self.bvh.validate()
    }
}
