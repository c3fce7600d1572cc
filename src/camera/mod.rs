//! Perspective camera and pointer rays for hit-testing.

/// Core camera struct and ray generation.
pub mod core;

pub use self::core::{pointer_to_ndc, Camera, Ray};
