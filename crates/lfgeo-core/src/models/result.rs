use std::fmt;

use serde::{Deserialize, Serialize};

use super::{RefocusGeometry, TriangulationGeometry};
use crate::Real;

/// Non-fatal condition met during a computation.
///
/// Diagnostics never abort a computation; they are collected in the result
/// so callers can surface them next to the numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostic {
    /// The image distance iteration hit a negative object distance.
    ObjectCloserThanImage,
    /// The main lens image distance is shorter than its focal length.
    ImageDistanceBelowFocalLength,
    /// The refocus parameter exceeds the sampled micro lens range.
    RefocusSliceOutOfRange,
    /// The refocused object plane lies at optical infinity.
    RefocusedPlaneAtInfinity,
    /// No real refocused object plane exists.
    RefocusedPlaneOutOfRange,
    /// Disparity and tilt carry no depth information.
    TriangulationAtInfinity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::ObjectCloserThanImage => "Object distance smaller than image distance.",
            Self::ImageDistanceBelowFocalLength => {
                "Image distance is smaller than focal length (fU>bU)."
            }
            Self::RefocusSliceOutOfRange => "Refocusing slice is out of range.",
            Self::RefocusedPlaneAtInfinity => "Refocused object plane at infinity.",
            Self::RefocusedPlaneOutOfRange => "Refocused object plane out of range.",
            Self::TriangulationAtInfinity => "Triangulation distance at infinity.",
        };
        f.write_str(msg)
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position of the refocused object plane relative to the main lens range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefocusBranch {
    /// Finite refocusing distance in front of the camera.
    InRange,
    /// The refocused plane lies exactly at optical infinity.
    AtInfinity,
    /// The refocused rays never cross in object space.
    OutOfRange,
}

/// Refocusing distance and depth of field of one refocused plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefocusResult {
    /// Refocusing distance `d`.
    #[serde(with = "crate::models::serde_real")]
    pub distance: Real,
    /// Far depth-of-field border `d+`.
    ///
    /// The border pairs are fixed by lens index, not by distance. For a
    /// negative shift with a finite focus distance the two ray pairs trade
    /// places, so `d+` can come out nearer than `d-`.
    #[serde(with = "crate::models::serde_real")]
    pub far_border: Real,
    /// Near depth-of-field border `d-`.
    #[serde(with = "crate::models::serde_real")]
    pub near_border: Real,
    /// Depth of field `d+ - d-`; `+inf` if either border is infinite and
    /// negative when the borders are swapped (see [`Self::far_border`]).
    #[serde(with = "crate::models::serde_real")]
    pub depth_of_field: Real,
    /// Main lens image distance `bU`.
    #[serde(with = "crate::models::serde_real")]
    pub image_distance: Real,
    pub branch: RefocusBranch,
    pub diagnostics: Vec<Diagnostic>,
    pub geometry: RefocusGeometry,
}

impl RefocusResult {
    /// All diagnostics joined into one line; empty when there are none.
    pub fn message(&self) -> String {
        join_diagnostics(&self.diagnostics)
    }
}

/// Virtual camera baseline, tilt and triangulated depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangulationResult {
    /// Baseline `B` at the entrance pupil.
    pub baseline: Real,
    /// Tilt angle `Φ` of the virtual camera in degrees.
    pub tilt_deg: Real,
    /// Triangulation distance `Z`.
    #[serde(with = "crate::models::serde_real")]
    pub distance: Real,
    /// Main lens image distance `bU`.
    #[serde(with = "crate::models::serde_real")]
    pub image_distance: Real,
    /// Longitudinal offset of the virtual camera crossing from the main lens.
    pub intersect: Real,
    /// Longitudinal entrance pupil position, `bU + HH + intersect`.
    pub entrance_pupil_position: Real,
    /// Pixel pitch projected to the image plane.
    pub projected_pixel_pitch: Real,
    pub diagnostics: Vec<Diagnostic>,
    pub geometry: TriangulationGeometry,
}

impl TriangulationResult {
    /// All diagnostics joined into one line; empty when there are none.
    pub fn message(&self) -> String {
        join_diagnostics(&self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_joins_diagnostics() {
        let mut result = RefocusResult {
            distance: Real::INFINITY,
            far_border: Real::INFINITY,
            near_border: Real::INFINITY,
            depth_of_field: Real::INFINITY,
            image_distance: 193.2935,
            branch: RefocusBranch::OutOfRange,
            diagnostics: vec![],
            geometry: RefocusGeometry::default(),
        };
        assert_eq!(result.message(), "");

        result.diagnostics = vec![
            Diagnostic::RefocusSliceOutOfRange,
            Diagnostic::RefocusedPlaneOutOfRange,
        ];
        assert_eq!(
            result.message(),
            "Refocusing slice is out of range. Refocused object plane out of range."
        );
    }

    #[test]
    fn infinite_distances_survive_json() {
        let result = TriangulationResult {
            baseline: -0.6326,
            tilt_deg: 0.0,
            distance: Real::INFINITY,
            image_distance: 193.2935,
            intersect: -143.2,
            entrance_pupil_position: -15.5,
            projected_pixel_pitch: 0.125,
            diagnostics: vec![Diagnostic::TriangulationAtInfinity],
            geometry: TriangulationGeometry::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["distance"], "inf");
        assert_eq!(json["diagnostics"][0], "triangulation_at_infinity");
        let back: TriangulationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.distance, Real::INFINITY);
    }
}
