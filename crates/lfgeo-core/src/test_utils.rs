//! Reference cameras for tests.
//!
//! This module is public so that every workspace test suite uses the same
//! fixtures, but it is not intended for production use.

use crate::{CameraParameters, Real};

/// Fractional digits used when comparing against published reference values.
pub const REFERENCE_DECIMALS: u32 = 4;

/// Plenoptic camera with a 193.29 mm main lens at f/2.68, focused at
/// infinity, 13 px micro images behind 125 µm micro lenses.
pub fn reference_camera() -> CameraParameters {
    CameraParameters {
        pixel_pitch: 0.009,
        micro_focal_length: 2.75,
        micro_principal_spacing: 0.396,
        micro_pitch: 0.125,
        exit_pupil_distance: 111.0324,
        main_focal_length: 193.2935,
        main_principal_spacing: -65.5563,
        focus_distance: Real::INFINITY,
        f_number: 2.6846,
        refocus: 1.0,
        micro_image_resolution: 13.0,
        viewpoint_gap: -6,
        disparity: 1.0,
    }
}

/// [`reference_camera`] focused at `focus_distance`.
pub fn reference_camera_focused_at(focus_distance: Real) -> CameraParameters {
    CameraParameters {
        focus_distance,
        ..reference_camera()
    }
}

/// Assert that `actual` matches `expected` to `decimals` fractional digits.
///
/// Infinities must match exactly.
#[track_caller]
pub fn assert_close(actual: Real, expected: Real, decimals: u32) {
    if expected.is_infinite() {
        assert_eq!(actual, expected, "expected {expected}, got {actual}");
        return;
    }
    let tol = 0.5 * 10f64.powi(-(decimals as i32)) + 1e-9;
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} to {decimals} decimals, got {actual}"
    );
}
