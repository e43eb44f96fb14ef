//! Depth-plane sweeps over the refocus shift or the disparity.
//!
//! Each plane carries the object-side field of view at its distance, so a
//! sweep describes the stack of refocused or triangulated planes in front of
//! the camera.

use std::ops::Range;

use lfgeo_core::{CameraParameters, Real};
use serde::{Deserialize, Serialize};

use crate::refocus::refocus;
use crate::triangulation::triangulate;
use crate::{EngineOptions, GeometryError};

/// Sensor dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSize {
    pub height: Real,
    pub width: Real,
}

impl Default for SensorSize {
    fn default() -> Self {
        Self {
            height: 24.048,
            width: 36.072,
        }
    }
}

/// One object plane of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthPlane {
    /// Shift `a` or disparity `dx` that produced the plane.
    pub index: i32,
    #[serde(with = "lfgeo_core::serde_real")]
    pub distance: Real,
    /// Horizontal field of view at `distance`.
    #[serde(with = "lfgeo_core::serde_real")]
    pub extent_x: Real,
    /// Vertical field of view at `distance`.
    #[serde(with = "lfgeo_core::serde_real")]
    pub extent_y: Real,
}

impl DepthPlane {
    fn new(index: i32, distance: Real, image_distance: Real, sensor: &SensorSize) -> Self {
        Self {
            index,
            distance,
            extent_x: sensor.width / image_distance * distance,
            extent_y: sensor.height / image_distance * distance,
        }
    }
}

/// Refocused planes for every integer shift `a` in `shifts`.
///
/// Planes out of range or at infinity are kept with an infinite distance.
pub fn refocus_sweep(
    params: &CameraParameters,
    shifts: Range<i32>,
    sensor: &SensorSize,
    opts: &EngineOptions,
) -> Result<Vec<DepthPlane>, GeometryError> {
    shifts
        .map(|a| {
            let p = CameraParameters {
                refocus: Real::from(a),
                ..*params
            };
            let r = refocus(&p, opts)?;
            Ok(DepthPlane::new(a, r.distance, r.image_distance, sensor))
        })
        .collect()
}

/// Triangulated planes for every integer disparity `dx` in `disparities`.
pub fn triangulation_sweep(
    params: &CameraParameters,
    disparities: Range<i32>,
    sensor: &SensorSize,
    opts: &EngineOptions,
) -> Result<Vec<DepthPlane>, GeometryError> {
    disparities
        .map(|dx| {
            let p = CameraParameters {
                disparity: Real::from(dx),
                ..*params
            };
            let r = triangulate(&p, opts)?;
            Ok(DepthPlane::new(dx, r.distance, r.image_distance, sensor))
        })
        .collect()
}

/// Largest finite distance of a sweep, if any.
pub fn max_finite_distance(planes: &[DepthPlane]) -> Option<Real> {
    planes
        .iter()
        .map(|p| p.distance)
        .filter(|d| d.is_finite())
        .reduce(Real::max)
}
