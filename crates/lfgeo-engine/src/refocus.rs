//! Refocusing distance and depth of field of a standard plenoptic camera.
//!
//! A refocused image at shift `a` integrates rays from micro lenses `a·(M-1)`
//! apart. The plane where those rays cross in object space is the
//! refocusing distance `d`; the rays through pixel and micro lens borders
//! bound the depth of field `[d-, d+]`.
//!
//! Every distance is derived twice: once by intersecting the object-side rays
//! directly, and once by intersecting the image-side rays and mapping that
//! crossing through the main lens. [`refocus`] fails with
//! [`GeometryError::Inconsistent`] if the two derivations disagree.

use lfgeo_core::{
    agree_to, nearly_equal, CameraParameters, Diagnostic, ParaxialRay, Real, RefocusBranch,
    RefocusGeometry, RefocusResult,
};
use log::{debug, warn};

use crate::image_distance::{image_distance, thin_lens_conjugate};
use crate::rays::{image_side_crossing, object_side_crossing, RayGeometryModel};
use crate::{EngineOptions, GeometryError};

/// Refocusing distance with default [`EngineOptions`].
pub fn refo(params: &CameraParameters) -> Result<RefocusResult, GeometryError> {
    refocus(params, &EngineOptions::default())
}

/// Refocusing engine; see [`RefocusingEngine::estimate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RefocusingEngine;

/// Refocusing distance and depth of field for `params`.
pub fn refocus(
    params: &CameraParameters,
    opts: &EngineOptions,
) -> Result<RefocusResult, GeometryError> {
    RefocusingEngine::estimate(params, opts)
}

/// Image-side crossings of the central and bounding ray pairs, measured from
/// the main lens.
#[derive(Debug, Clone, Copy)]
struct ImageCrossings {
    central: Real,
    near: Real,
    far: Real,
}

/// Refocused distances along one derivation path.
#[derive(Debug, Clone, Copy)]
struct Borders {
    distance: Real,
    far: Real,
    near: Real,
}

impl Borders {
    fn as_array(&self) -> [Real; 3] {
        [self.distance, self.far, self.near]
    }
}

/// Classify the refocused plane from the central image-side crossing.
///
/// Checked in order: in range, at infinity, out of range. A crossing beyond
/// the focal plane always has a real object-side conjugate, so it is treated
/// as in range even when `bU < fU` unless the shift is non-positive.
fn classify(
    image_distance: Real,
    focal_length: Real,
    crossing: Real,
    shift: Real,
) -> RefocusBranch {
    let at_infinity = nearly_equal(crossing, focal_length);
    if image_distance >= focal_length && crossing > focal_length && !at_infinity {
        RefocusBranch::InRange
    } else if at_infinity {
        RefocusBranch::AtInfinity
    } else if crossing < focal_length || (image_distance <= focal_length && shift <= 0.0) {
        RefocusBranch::OutOfRange
    } else {
        RefocusBranch::InRange
    }
}

struct Solver<'a> {
    params: &'a CameraParameters,
    image_distance: Real,
}

impl Solver<'_> {
    /// Object distance of an image-side crossing, through the lens equation.
    fn image_side_distance(&self, crossing: Real) -> Real {
        let p = self.params;
        thin_lens_conjugate(p.main_focal_length, crossing)
            + self.image_distance
            + p.main_principal_spacing
    }

    /// Object distance at which an object-side ray pair crosses the axis.
    fn object_side_distance(&self, pair: &[ParaxialRay; 2]) -> Result<Real, GeometryError> {
        let (z, _) = object_side_crossing(pair)?;
        Ok(z + self.image_distance + self.params.main_principal_spacing)
    }

    /// One depth-of-field border; infinite if its image-side crossing does
    /// not lie beyond the focal plane.
    fn border(
        &self,
        crossing: Real,
        pair: &[ParaxialRay; 2],
    ) -> Result<(Real, Real), GeometryError> {
        if self.params.main_focal_length >= crossing {
            Ok((Real::INFINITY, Real::INFINITY))
        } else {
            Ok((
                self.image_side_distance(crossing),
                self.object_side_distance(pair)?,
            ))
        }
    }
}

impl RefocusingEngine {
    /// Estimate the refocusing distance `d`, the depth-of-field borders `d-`,
    /// `d+` and the depth of field for the shift parameter in `params`.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::InvalidParameters`] if `params` fail validation.
    /// - [`GeometryError::NoConvergence`] from the image distance solver.
    /// - [`GeometryError::SingularSystem`] for degenerate ray pairs, e.g. an
    ///   image distance at infinity.
    /// - [`GeometryError::Inconsistent`] if image-side and object-side
    ///   distances disagree at `opts.decimals`.
    pub fn estimate(
        params: &CameraParameters,
        opts: &EngineOptions,
    ) -> Result<RefocusResult, GeometryError> {
        params.validate()?;

        let image = image_distance(params, opts)?;
        let b_u = image.distance;
        let f_u = params.main_focal_length;
        let mut diagnostics: Vec<Diagnostic> = image.diagnostic.into_iter().collect();

        if f_u > b_u {
            diagnostics.push(Diagnostic::ImageDistanceBelowFocalLength);
        }
        if params.refocus >= params.micro_image_resolution {
            diagnostics.push(Diagnostic::RefocusSliceOutOfRange);
        }

        let geometry = RayGeometryModel::new(params, b_u).refocus();
        let crossings = ImageCrossings {
            central: b_u - image_side_crossing(&geometry.central)?,
            near: b_u - image_side_crossing(&geometry.near_pair())?,
            far: b_u - image_side_crossing(&geometry.far_pair())?,
        };

        let branch = classify(b_u, f_u, crossings.central, params.refocus);
        debug!(
            "refocus a={} bU={b_u} b_new={} branch={branch:?}",
            params.refocus, crossings.central
        );

        let solver = Solver {
            params,
            image_distance: b_u,
        };
        let (image_side, object_side) = match branch {
            RefocusBranch::InRange => solve_in_range(&solver, &geometry, &crossings)?,
            RefocusBranch::AtInfinity => {
                diagnostics.push(Diagnostic::RefocusedPlaneAtInfinity);
                solve_at_infinity(&solver, &geometry, &crossings)?
            }
            RefocusBranch::OutOfRange => {
                diagnostics.push(Diagnostic::RefocusedPlaneOutOfRange);
                solve_out_of_range(&solver, &geometry, &crossings)?
            }
        };

        check_consistency(&image_side, &object_side, opts.decimals)?;

        for d in &diagnostics {
            warn!("{d}");
        }

        let depth_of_field = if object_side.far.is_infinite() || object_side.near.is_infinite() {
            Real::INFINITY
        } else {
            object_side.far - object_side.near
        };

        Ok(RefocusResult {
            distance: object_side.distance,
            far_border: object_side.far,
            near_border: object_side.near,
            depth_of_field,
            image_distance: b_u,
            branch,
            diagnostics,
            geometry,
        })
    }
}

/// Accept the two derivations if any of distance, far or near border agree
/// at `decimals`.
fn check_consistency(
    image_side: &Borders,
    object_side: &Borders,
    decimals: u32,
) -> Result<(), GeometryError> {
    let consistent = image_side
        .as_array()
        .iter()
        .zip(object_side.as_array())
        .any(|(&i, o)| agree_to(i, o, decimals));
    if consistent {
        Ok(())
    } else {
        Err(GeometryError::Inconsistent {
            image_side: image_side.as_array(),
            object_side: object_side.as_array(),
        })
    }
}

fn solve_in_range(
    solver: &Solver<'_>,
    geometry: &RefocusGeometry,
    crossings: &ImageCrossings,
) -> Result<(Borders, Borders), GeometryError> {
    let image_side = Borders {
        distance: solver.image_side_distance(crossings.central),
        far: solver.image_side_distance(crossings.far),
        near: solver.image_side_distance(crossings.near),
    };
    let mut object_side = Borders {
        distance: solver.object_side_distance(&geometry.central)?,
        far: solver.object_side_distance(&geometry.far_pair())?,
        near: solver.object_side_distance(&geometry.near_pair())?,
    };

    if solver.params.main_focal_length >= crossings.far {
        object_side.far = Real::INFINITY;
    }

    Ok((image_side, object_side))
}

fn solve_at_infinity(
    solver: &Solver<'_>,
    geometry: &RefocusGeometry,
    crossings: &ImageCrossings,
) -> Result<(Borders, Borders), GeometryError> {
    let (image_near, object_near) = solver.border(crossings.near, &geometry.near_pair())?;
    Ok((
        Borders {
            distance: Real::INFINITY,
            far: Real::INFINITY,
            near: image_near,
        },
        Borders {
            distance: Real::INFINITY,
            far: Real::INFINITY,
            near: object_near,
        },
    ))
}

fn solve_out_of_range(
    solver: &Solver<'_>,
    geometry: &RefocusGeometry,
    crossings: &ImageCrossings,
) -> Result<(Borders, Borders), GeometryError> {
    let (image_near, object_near) = solver.border(crossings.near, &geometry.near_pair())?;
    let (image_far, object_far) = solver.border(crossings.far, &geometry.far_pair())?;
    Ok((
        Borders {
            distance: Real::INFINITY,
            far: image_far,
            near: image_near,
        },
        Borders {
            distance: Real::INFINITY,
            far: object_far,
            near: object_near,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfgeo_core::test_utils::{assert_close, reference_camera, reference_camera_focused_at};

    fn with_shift(a: Real) -> CameraParameters {
        CameraParameters {
            refocus: a,
            ..reference_camera()
        }
    }

    #[test]
    fn reference_camera_refocuses_in_range() {
        let r = refo(&reference_camera()).unwrap();
        assert_eq!(r.branch, RefocusBranch::InRange);
        assert!(r.diagnostics.is_empty());
        assert_eq!(r.image_distance, 193.2935);
        assert_close(r.distance, 962.7459, 4);
        assert_close(r.far_border, 1110.0123, 4);
        assert_close(r.near_border, 838.1359, 4);
        assert_close(r.depth_of_field, 271.8764, 4);
    }

    #[test]
    fn zero_shift_at_infinite_focus_is_at_infinity() {
        let r = refo(&with_shift(0.0)).unwrap();
        assert_eq!(r.branch, RefocusBranch::AtInfinity);
        assert_eq!(r.diagnostics, vec![Diagnostic::RefocusedPlaneAtInfinity]);
        assert_eq!(r.distance, Real::INFINITY);
        assert_eq!(r.far_border, Real::INFINITY);
        assert_eq!(r.depth_of_field, Real::INFINITY);
        assert!(r.near_border.is_finite());
        assert!(r.near_border > 10_000.0);
    }

    #[test]
    fn negative_shift_at_infinite_focus_is_out_of_range() {
        let r = refo(&with_shift(-1.0)).unwrap();
        assert_eq!(r.branch, RefocusBranch::OutOfRange);
        assert_eq!(r.diagnostics, vec![Diagnostic::RefocusedPlaneOutOfRange]);
        assert_eq!(r.distance, Real::INFINITY);
        assert_eq!(r.near_border, Real::INFINITY);
        assert_eq!(r.far_border, Real::INFINITY);
        assert_eq!(r.depth_of_field, Real::INFINITY);
    }

    #[test]
    fn shift_beyond_micro_image_is_flagged() {
        let r = refo(&with_shift(13.0)).unwrap();
        assert_eq!(r.branch, RefocusBranch::OutOfRange);
        assert!(r.diagnostics.contains(&Diagnostic::RefocusSliceOutOfRange));
        assert!(r.message().contains("Refocusing slice is out of range."));
    }

    #[test]
    fn zero_shift_refocuses_onto_focus_distance() {
        let r = refo(&CameraParameters {
            refocus: 0.0,
            ..reference_camera_focused_at(4000.0)
        })
        .unwrap();
        assert_eq!(r.branch, RefocusBranch::InRange);
        assert_close(r.distance, 4000.0, 6);
        assert!(r.near_border < r.distance && r.distance < r.far_border);
    }

    #[test]
    fn larger_shift_moves_plane_closer() {
        let d: Vec<Real> = [0.5, 1.0, 2.0]
            .iter()
            .map(|&a| refo(&with_shift(a)).unwrap().distance)
            .collect();
        assert!(d[0] > d[1] && d[1] > d[2]);
    }

    #[test]
    fn classification_order() {
        let f = 100.0;
        assert_eq!(classify(f, f, 120.0, 1.0), RefocusBranch::InRange);
        assert_eq!(classify(f, f, f, 0.0), RefocusBranch::AtInfinity);
        assert_eq!(classify(f, f, 80.0, 1.0), RefocusBranch::OutOfRange);
        assert_eq!(classify(90.0, f, 120.0, -1.0), RefocusBranch::OutOfRange);
        assert_eq!(classify(90.0, f, 120.0, 1.0), RefocusBranch::InRange);
    }

    #[test]
    fn object_inside_focal_length_cannot_refocus() {
        let err = refo(&reference_camera_focused_at(100.0)).unwrap_err();
        assert!(matches!(err, GeometryError::SingularSystem(_)));
    }

    #[test]
    fn one_agreeing_border_is_enough() {
        let image_side = Borders {
            distance: 962.74589,
            far: 1110.0,
            near: 838.0,
        };
        let object_side = Borders {
            distance: 962.74591,
            far: 1200.0,
            near: 800.0,
        };
        assert!(check_consistency(&image_side, &object_side, 4).is_ok());
        assert!(check_consistency(&image_side, &object_side, 6).is_err());
    }

    #[test]
    fn disagreeing_derivations_are_rejected() {
        let image_side = Borders {
            distance: 962.7459,
            far: 1110.0123,
            near: 838.1359,
        };
        let object_side = Borders {
            distance: 962.8,
            far: Real::INFINITY,
            near: 838.2,
        };
        let err = check_consistency(&image_side, &object_side, 4).unwrap_err();
        assert_eq!(
            err,
            GeometryError::Inconsistent {
                image_side: [962.7459, 1110.0123, 838.1359],
                object_side: [962.8, Real::INFINITY, 838.2],
            }
        );
    }

    #[test]
    fn out_of_range_keeps_finite_near_border() {
        let r = refo(&CameraParameters {
            main_principal_spacing: 500.0,
            focus_distance: 300.0,
            refocus: 1.0,
            ..reference_camera()
        })
        .unwrap();
        assert_eq!(r.branch, RefocusBranch::OutOfRange);
        assert_eq!(
            r.diagnostics,
            vec![
                Diagnostic::ObjectCloserThanImage,
                Diagnostic::ImageDistanceBelowFocalLength,
                Diagnostic::RefocusedPlaneOutOfRange,
            ]
        );
        assert_close(r.image_distance, 129.599, 3);
        assert_eq!(r.distance, Real::INFINITY);
        assert_eq!(r.far_border, Real::INFINITY);
        assert_close(r.near_border, 5188.4544, 4);
        assert_eq!(r.depth_of_field, Real::INFINITY);
    }

    #[test]
    fn negative_shift_in_range_swaps_borders() {
        let r = refo(&CameraParameters {
            refocus: -2.0,
            ..reference_camera_focused_at(1000.0)
        })
        .unwrap();
        assert_eq!(r.branch, RefocusBranch::InRange);
        assert_close(r.distance, 2848.0844, 4);
        assert_close(r.far_border, 2795.1563, 4);
        assert_close(r.near_border, 2909.2720, 4);
        assert!(r.far_border < r.near_border);
        assert!(r.depth_of_field < 0.0);
        assert_close(r.depth_of_field, r.far_border - r.near_border, 9);
    }

    #[test]
    fn excessive_precision_still_refocuses() {
        let opts = EngineOptions {
            decimals: 400,
            ..EngineOptions::default()
        };
        for a in [0.0, -1.0] {
            assert!(refocus(&with_shift(a), &opts).is_ok());
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let err = refo(&CameraParameters {
            main_focal_length: -1.0,
            ..reference_camera()
        })
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidParameters(_)));
    }
}
