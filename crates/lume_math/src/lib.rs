// Re-export glam for convenience
pub use glam::*;

// Lume math types
mod interval;
mod bounds;
mod ray;

pub use interval::Interval;
pub use bounds::Bounds3;
pub use ray::Ray;

/// Index of a component of a `Vec3` (0=X, 1=Y, 2=Z).
pub type Axis = usize;
