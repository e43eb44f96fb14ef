//! Light-field geometry algorithms for standard plenoptic cameras.
//!
//! This crate provides:
//! - [`ImageDistanceSolver`]: main lens image distance from the focus distance,
//! - [`RayGeometryModel`]: paraxial rays through micro lens and main lens,
//! - [`RefocusingEngine`]: refocusing distance and depth of field ([`refo`]),
//! - [`TriangulationEngine`]: virtual camera baseline, tilt and depth ([`tria`]),
//! - depth-plane sweeps over the refocus shift or the disparity.
//!
//! Every entry point is a pure function of a [`CameraParameters`] snapshot;
//! results are built fresh on each call. Fatal conditions are returned as
//! [`GeometryError`], non-fatal ones as [`Diagnostic`]s on the result.
//!
//! [`CameraParameters`]: lfgeo_core::CameraParameters
//! [`Diagnostic`]: lfgeo_core::Diagnostic

mod error;
mod options;

pub mod image_distance;
pub mod rays;
pub mod refocus;
pub mod sweep;
pub mod triangulation;

pub use error::GeometryError;
pub use image_distance::{image_distance, thin_lens_conjugate, ImageDistance, ImageDistanceSolver};
pub use options::EngineOptions;
pub use rays::{image_side_crossing, object_side_crossing, RayGeometryModel};
pub use refocus::{refo, refocus, RefocusingEngine};
pub use sweep::{max_finite_distance, refocus_sweep, triangulation_sweep, DepthPlane, SensorSize};
pub use triangulation::{tria, triangulate, TriangulationEngine};
