//! Plenoptic camera description and the records produced from it.
//!
//! The camera is modelled paraxially along one lateral axis:
//!
//! `sensor (u) → micro lens (s) → main lens (U) → object space`
//!
//! [`CameraParameters`] is an immutable snapshot consumed by the engines,
//! [`ParaxialRay`] is one traced ray, and [`RefocusResult`] /
//! [`TriangulationResult`] are produced fresh by every computation.

mod params;
mod rays;
mod result;
pub mod serde_real;

pub use params::*;
pub use rays::*;
pub use result::*;
pub use serde_real::parse_real;
