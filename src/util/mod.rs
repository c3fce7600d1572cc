//! Shared utilities: point-sequence hashing and load-stage timing.

/// Hashing of `Vec3` sequences for geometry fingerprints.
pub mod hash;
/// Per-stage wall-clock timing.
pub mod timing;
