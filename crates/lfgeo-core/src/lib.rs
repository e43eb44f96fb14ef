//! Core types and numeric primitives for `lfgeo`.
//!
//! This crate contains:
//! - the scalar alias [`Real`] and the small linear solver used to intersect
//!   paraxial rays ([`LinearSystemSolver`]),
//! - the camera description of a standard plenoptic camera
//!   ([`CameraParameters`]),
//! - plain data records for traced rays, diagnostics and computation results.
//!
//! The algorithms that consume these types live in `lfgeo-engine`.
//!
//! All lengths share one unit (millimetres). Positive infinity is a valid
//! distance value and stands for a plane at optical infinity.

/// Scalar aliases, rounding helpers and the linear system solver.
pub mod math;
/// Camera parameters, traced rays and result records.
pub mod models;
/// Reference cameras shared by the workspace test suites.
pub mod test_utils;

pub use math::*;
pub use models::*;
