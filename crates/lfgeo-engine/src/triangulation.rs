//! Virtual camera baseline, tilt and triangulation distance.
//!
//! Two viewpoints `G` pixels off their micro image centres, taken from
//! neighbouring micro lenses, behave like a stereo pair whose optical centres
//! lie on the entrance pupil. Their object-side rays cross at the virtual
//! camera position; the crossing height is the baseline `B`.

use lfgeo_core::{
    agree_to, CameraParameters, Diagnostic, LinearSystemSolver, Real, TriangulationResult,
};
use log::{debug, warn};

use crate::image_distance::image_distance;
use crate::rays::RayGeometryModel;
use crate::{EngineOptions, GeometryError};

/// Triangulation with default [`EngineOptions`].
pub fn tria(params: &CameraParameters) -> Result<TriangulationResult, GeometryError> {
    triangulate(params, &EngineOptions::default())
}

/// Baseline, tilt and triangulation distance for `params`.
pub fn triangulate(
    params: &CameraParameters,
    opts: &EngineOptions,
) -> Result<TriangulationResult, GeometryError> {
    TriangulationEngine::estimate(params, opts)
}

/// Triangulation engine; see [`TriangulationEngine::estimate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangulationEngine;

impl TriangulationEngine {
    /// Estimate the baseline `B`, the tilt `Φ` (degrees) and the
    /// triangulation distance `Z` for viewpoint gap `G` and disparity `dx`.
    ///
    /// `Z` is `+inf` when the camera is focused at or beyond infinity and the
    /// disparity is not positive, and when both disparity and tilt are zero.
    /// The latter is `0/0` and kept at infinity by convention.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::InvalidParameters`] if `params` fail validation.
    /// - [`GeometryError::SingularSystem`] if the object-side rays are
    ///   parallel or non-finite.
    /// - [`GeometryError::BaselineMismatch`] if the solved and closed-form
    ///   baselines disagree at `opts.decimals`.
    pub fn estimate(
        params: &CameraParameters,
        opts: &EngineOptions,
    ) -> Result<TriangulationResult, GeometryError> {
        params.validate()?;

        let image = image_distance(params, opts)?;
        let b_u = image.distance;
        let mut diagnostics: Vec<Diagnostic> = image.diagnostic.into_iter().collect();

        let geometry = RayGeometryModel::new(params, b_u).triangulation();
        let [r0, r1] = geometry.rays;

        let crossing = LinearSystemSolver::intersect(
            [r1.object_slope, r0.object_slope],
            [r1.main_lens, r0.main_lens],
        )?;
        let intersect = crossing.x;
        let solved = crossing.y;

        let closed_form = r0.object_slope * intersect + r0.main_lens;
        let baseline = check_baseline(solved, closed_form, opts.decimals)?;

        let tilt = r0.object_slope.atan();
        let tilt_deg = tilt.to_degrees();

        let projected_pixel_pitch =
            (-r1.object_slope * b_u + baseline) - (-r0.object_slope * b_u + baseline);
        let disparity = params.disparity * projected_pixel_pitch;

        let no_depth = (b_u <= params.main_focal_length && params.disparity <= 0.0)
            || (params.disparity == 0.0 && tilt_deg == 0.0);
        let distance = if no_depth {
            diagnostics.push(Diagnostic::TriangulationAtInfinity);
            Real::INFINITY
        } else {
            baseline * b_u / (disparity - b_u * tilt.tan())
        };
        debug!("triangulation B={baseline} phi={tilt_deg} Z={distance}");

        for d in &diagnostics {
            warn!("{d}");
        }

        Ok(TriangulationResult {
            baseline,
            tilt_deg,
            distance,
            image_distance: b_u,
            intersect,
            entrance_pupil_position: b_u + params.main_principal_spacing + intersect,
            projected_pixel_pitch,
            diagnostics,
            geometry,
        })
    }
}

/// Closed-form baseline, if it agrees with the solved one at `decimals`.
fn check_baseline(solved: Real, closed_form: Real, decimals: u32) -> Result<Real, GeometryError> {
    if agree_to(solved, closed_form, decimals) {
        Ok(closed_form)
    } else {
        Err(GeometryError::BaselineMismatch {
            solved,
            closed_form,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfgeo_core::test_utils::{assert_close, reference_camera, reference_camera_focused_at};

    #[test]
    fn reference_camera_triangulates() {
        let r = tria(&CameraParameters {
            refocus: 0.0,
            ..reference_camera()
        })
        .unwrap();
        assert_close(r.baseline, 3.7956, 4);
        assert_eq!(r.tilt_deg, 0.0);
        assert_close(r.distance, 5869.2898, 4);
        assert!(r.diagnostics.is_empty());
        // two neighbouring lenses are one micro lens pitch apart
        assert_close(r.projected_pixel_pitch, 0.125, 9);
        assert_close(r.intersect, -143.2063, 4);
    }

    #[test]
    fn zero_disparity_is_at_infinity() {
        let r = tria(&CameraParameters {
            viewpoint_gap: 1,
            disparity: 0.0,
            ..reference_camera()
        })
        .unwrap();
        assert_close(r.baseline, -0.6326, 4);
        assert_eq!(r.tilt_deg, 0.0);
        assert_eq!(r.distance, Real::INFINITY);
        assert_eq!(r.message(), "Triangulation distance at infinity.");
    }

    #[test]
    fn finite_focus_tilts_virtual_camera() {
        let r = tria(&reference_camera_focused_at(4000.0)).unwrap();
        assert_close(r.baseline, 4.1789, 4);
        assert_close(r.tilt_deg, -0.0593, 4);
        assert_close(r.distance, 2576.4740, 4);
        assert!(r.image_distance > 193.2935);
    }

    #[test]
    fn baseline_grows_with_viewpoint_gap() {
        let b: Vec<Real> = [-2, -4, -6]
            .iter()
            .map(|&g| {
                tria(&CameraParameters {
                    viewpoint_gap: g,
                    ..reference_camera()
                })
                .unwrap()
                .baseline
            })
            .collect();
        assert!(b[0] < b[1] && b[1] < b[2]);
    }

    #[test]
    fn image_at_infinity_has_no_crossing() {
        let err = tria(&reference_camera_focused_at(150.0)).unwrap_err();
        assert!(matches!(err, GeometryError::SingularSystem(_)));
    }

    #[test]
    fn baseline_check_keeps_closed_form() {
        assert_eq!(check_baseline(3.79558, 3.79561, 4), Ok(3.79561));
        assert_eq!(
            check_baseline(3.7955, 3.7965, 4),
            Err(GeometryError::BaselineMismatch {
                solved: 3.7955,
                closed_form: 3.7965,
            })
        );
    }

    #[test]
    fn excessive_precision_still_triangulates() {
        let opts = EngineOptions {
            decimals: 400,
            ..EngineOptions::default()
        };
        let r = triangulate(&reference_camera(), &opts).unwrap();
        assert_close(r.baseline, 3.7956, 4);
    }

    #[test]
    fn object_closer_than_image_is_reported() {
        let r = tria(&CameraParameters {
            main_principal_spacing: 500.0,
            focus_distance: 300.0,
            ..reference_camera()
        })
        .unwrap();
        assert_eq!(r.diagnostics, vec![Diagnostic::ObjectCloserThanImage]);
        assert_close(r.image_distance, 129.599, 3);
        assert_close(r.baseline, 2.4119, 4);
        assert!(r.distance.is_finite());
    }
}
