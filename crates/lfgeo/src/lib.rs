//! High-level entry crate for the `lfgeo` toolbox.
//!
//! `lfgeo` estimates the light-field geometry of a standard plenoptic camera
//! (SPC): a main lens in front of a micro lens array in front of a sensor.
//! Two questions are answered from the optical and sensor parameters alone:
//!
//! - **Refocusing**: where does a computationally refocused image plane lie in
//!   object space, and how deep is its depth of field?
//! - **Triangulation**: which baseline and tilt does the virtual stereo camera
//!   formed by two viewpoints have, and at what depth does a given disparity
//!   place an object?
//!
//! ```
//! use lfgeo::prelude::*;
//!
//! # fn main() -> Result<(), lfgeo::engine::GeometryError> {
//! let params = CameraParameters {
//!     refocus: 1.0,
//!     ..CameraParameters::default()
//! };
//!
//! let r = refo(&params)?;
//! assert_eq!(r.branch, RefocusBranch::InRange);
//! println!("d = {:.4} mm, DoF = {:.4} mm", r.distance, r.depth_of_field);
//!
//! let t = tria(&params)?;
//! println!("B = {:.4} mm, Z = {:.4} mm", t.baseline, t.distance);
//! # Ok(())
//! # }
//! ```
//!
//! Distances are in millimetres; `f64::INFINITY` is a regular value and
//! marks a plane at optical infinity. Conditions that do not abort a
//! computation are reported as [`Diagnostic`](crate::core::Diagnostic)s on the
//! result.

/// Camera parameters, result records, the linear system solver and
/// rounding helpers.
pub mod core {
    pub use lfgeo_core::*;
}

/// Image distance solver, ray model, refocusing and triangulation engines,
/// depth-plane sweeps.
pub mod engine {
    pub use lfgeo_engine::*;
}

pub use lfgeo_engine::{refo, tria};

/// Convenient re-exports for common use cases.
///
/// Import with `use lfgeo::prelude::*;` to get started quickly.
pub mod prelude {
    // Parameters and results
    pub use crate::core::{
        CameraParameters, Diagnostic, Real, RefocusBranch, RefocusResult, TriangulationResult,
    };

    // Entry points
    pub use crate::engine::{
        refo, refocus, refocus_sweep, tria, triangulate, triangulation_sweep, DepthPlane,
        EngineOptions, GeometryError, SensorSize,
    };
}
