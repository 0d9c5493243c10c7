//! Lume - CPU path tracer
//!
//! A Monte Carlo path tracer built around a surface area heuristic BVH.
//! Scenes are flat lists of triangles and spheres; rendering is spread over
//! a fixed pool of worker threads pulling pixels from a lock-free queue.

mod error;
mod config;
pub mod sampling;
mod intersection;
mod material;
mod primitive;
mod triangle;
mod sphere;
mod bvh;
mod scene;
mod task_queue;
mod camera;
mod framebuffer;
mod renderer;

pub use error::{Error, Result};
pub use config::{BvhConfig, RenderConfig, SplitMethod, MAX_PRIMS_IN_NODE_LIMIT};
pub use intersection::Intersection;
pub use material::{fresnel, Color, Lambertian, Material, Microfacet};
pub use primitive::{Hittable, Primitive};
pub use triangle::{triangles_from_indexed, Triangle};
pub use sphere::Sphere;
pub use bvh::{BvhAccel, BvhNode, BvhStats};
pub use scene::Scene;
pub use task_queue::{PixelTask, TaskQueue, TaskQueueIter};
pub use camera::Camera;
pub use framebuffer::{color_to_rgb, tonemap_channel, Framebuffer};
pub use renderer::{worker_seed, Renderer};

/// Re-export common math types from lume_math
pub use lume_math::{Bounds3, Interval, Ray, Vec2, Vec3};
