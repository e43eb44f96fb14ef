use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Real;

/// Camera parameters rejected by [`CameraParameters::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: Real },
    #[error("{name} must be finite")]
    NonFinite { name: &'static str },
    #[error("{name} must be non-zero")]
    Zero { name: &'static str },
    #[error("focus distance must be positive or infinite, got {0}")]
    InvalidFocusDistance(Real),
}

/// Optical and sensor description of a standard plenoptic camera.
///
/// All lengths are in millimetres. Field names follow the optics; the short
/// notation used in the literature (`pp`, `fs`, `fU`, ...) is accepted as an
/// alias when deserializing, and every missing field takes its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParameters {
    /// Pixel pitch `pp`.
    #[serde(alias = "pp")]
    pub pixel_pitch: Real,
    /// Micro lens focal length `fs`.
    #[serde(alias = "fs")]
    pub micro_focal_length: Real,
    /// Principal plane spacing of the micro lens `hh`.
    #[serde(alias = "hh")]
    pub micro_principal_spacing: Real,
    /// Micro lens pitch `pm`.
    #[serde(alias = "pm")]
    pub micro_pitch: Real,
    /// Exit pupil distance of the main lens `dA`.
    #[serde(alias = "dA")]
    pub exit_pupil_distance: Real,
    /// Main lens focal length `fU`.
    #[serde(alias = "fU")]
    pub main_focal_length: Real,
    /// Principal plane spacing of the main lens `HH`.
    #[serde(alias = "HH")]
    pub main_principal_spacing: Real,
    /// Main lens focus distance `df`; `+inf` focuses at infinity.
    #[serde(alias = "df", with = "crate::models::serde_real")]
    pub focus_distance: Real,
    /// Main lens f-number; the entrance pupil is `D = fU / f_number`.
    #[serde(alias = "f_num")]
    pub f_number: Real,
    /// Refocusing shift parameter `a`.
    #[serde(alias = "a")]
    pub refocus: Real,
    /// Micro image resolution `M` in pixels (odd for a symmetric viewpoint grid).
    #[serde(alias = "M")]
    pub micro_image_resolution: Real,
    /// Viewpoint gap `G` of the virtual camera pair.
    #[serde(alias = "G")]
    pub viewpoint_gap: i32,
    /// Disparity `dx` in pixels.
    #[serde(alias = "dx")]
    pub disparity: Real,
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
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
}

impl CameraParameters {
    /// Entrance pupil diameter `D` of the main lens.
    pub fn entrance_pupil_diameter(&self) -> Real {
        self.main_focal_length / self.f_number
    }

    /// Set the f-number from an entrance pupil diameter `D`.
    pub fn with_entrance_pupil(mut self, diameter: Real) -> Self {
        self.f_number = self.main_focal_length / diameter;
        self
    }

    /// `true` if the main lens is focused at optical infinity.
    pub fn focused_at_infinity(&self) -> bool {
        self.focus_distance == Real::INFINITY
    }

    /// Half of the micro image resolution, `(M - 1) / 2`.
    pub fn half_resolution(&self) -> Real {
        (self.micro_image_resolution - 1.0) / 2.0
    }

    /// Micro image size in pixels estimated from the optics,
    /// `M = D·fs / (fU·pp)`.
    pub fn micro_image_size(&self) -> Real {
        self.entrance_pupil_diameter() * self.micro_focal_length
            / (self.main_focal_length * self.pixel_pitch)
    }

    /// Check the invariants the geometry engines rely on.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let finite = [
            ("pixel_pitch", self.pixel_pitch),
            ("micro_focal_length", self.micro_focal_length),
            ("micro_principal_spacing", self.micro_principal_spacing),
            ("micro_pitch", self.micro_pitch),
            ("exit_pupil_distance", self.exit_pupil_distance),
            ("main_focal_length", self.main_focal_length),
            ("main_principal_spacing", self.main_principal_spacing),
            ("f_number", self.f_number),
            ("refocus", self.refocus),
            ("micro_image_resolution", self.micro_image_resolution),
            ("disparity", self.disparity),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { name });
            }
        }

        let positive = [
            ("pixel_pitch", self.pixel_pitch),
            ("micro_focal_length", self.micro_focal_length),
            ("micro_pitch", self.micro_pitch),
            ("main_focal_length", self.main_focal_length),
            ("f_number", self.f_number),
            ("micro_image_resolution", self.micro_image_resolution),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ParameterError::NonPositive { name, value });
            }
        }

        if self.exit_pupil_distance == 0.0 {
            return Err(ParameterError::Zero {
                name: "exit_pupil_distance",
            });
        }

        let df = self.focus_distance;
        if df.is_nan() || df <= 0.0 {
            return Err(ParameterError::InvalidFocusDistance(df));
        }

        Ok(())
    }
}
