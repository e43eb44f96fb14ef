//! Main lens image distance from its focus distance.
//!
//! The thin-lens equation is applied between the two principal planes of a
//! thick main lens. Since the object distance `aU = df - bU - HH` depends on
//! the unknown image distance `bU`, the pair is found by fixed-point
//! iteration starting at the focal plane.

use lfgeo_core::{CameraParameters, Diagnostic, Real};
use log::{debug, warn};

use crate::{EngineOptions, GeometryError};

/// Image distance of the main lens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDistance {
    /// Image distance `bU`; `+inf` if the object is inside the focal length.
    pub distance: Real,
    /// Fixed-point iterations taken (zero for closed-form cases).
    pub iterations: usize,
    pub diagnostic: Option<Diagnostic>,
}

/// Solver for the main lens image distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDistanceSolver;

/// Image distance for a camera; see [`ImageDistanceSolver::solve`].
pub fn image_distance(
    params: &CameraParameters,
    opts: &EngineOptions,
) -> Result<ImageDistance, GeometryError> {
    ImageDistanceSolver::solve(
        params.main_focal_length,
        params.main_principal_spacing,
        params.focus_distance,
        opts.max_iterations,
    )
}

/// Conjugate distance of `distance` through a thin lens, `(1/f - 1/distance)⁻¹`.
///
/// A distance equal to the focal length maps to infinity and vice versa.
pub fn thin_lens_conjugate(focal_length: Real, distance: Real) -> Real {
    1.0 / (1.0 / focal_length - 1.0 / distance)
}

impl ImageDistanceSolver {
    /// Image distance `bU` for focal length `fU`, principal plane spacing `HH`
    /// and focus distance `df`.
    ///
    /// - `df = +inf` gives `bU = fU`.
    /// - `df <= fU` gives `bU = +inf`.
    /// - otherwise `bU` is iterated until it stops changing. A negative object
    ///   distance stops the iteration early with
    ///   [`Diagnostic::ObjectCloserThanImage`] and keeps the last `bU`. The
    ///   starting object distance `df - fU - HH` is not checked, so a negative
    ///   one still yields one step.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NoConvergence`] if no fixed point is reached within
    /// `max_iterations`.
    pub fn solve(
        focal_length: Real,
        principal_spacing: Real,
        focus_distance: Real,
        max_iterations: usize,
    ) -> Result<ImageDistance, GeometryError> {
        if focus_distance == Real::INFINITY {
            return Ok(ImageDistance {
                distance: focal_length,
                iterations: 0,
                diagnostic: None,
            });
        }
        if focus_distance <= focal_length {
            return Ok(ImageDistance {
                distance: Real::INFINITY,
                iterations: 0,
                diagnostic: None,
            });
        }

        let mut b_u = focal_length;
        let mut a_u = focus_distance - focal_length - principal_spacing;
        for iteration in 1..=max_iterations {
            let next = thin_lens_conjugate(focal_length, a_u);
            if (next - b_u).abs() <= Real::EPSILON * next.abs() {
                debug!("image distance {next} converged after {iteration} iterations");
                return Ok(ImageDistance {
                    distance: next,
                    iterations: iteration,
                    diagnostic: None,
                });
            }

            b_u = next;
            a_u = focus_distance - b_u - principal_spacing;
            if a_u < 0.0 {
                warn!("object distance {a_u} smaller than image distance {b_u}");
                return Ok(ImageDistance {
                    distance: b_u,
                    iterations: iteration,
                    diagnostic: Some(Diagnostic::ObjectCloserThanImage),
                });
            }
        }

        Err(GeometryError::NoConvergence {
            iterations: max_iterations,
        })
    }
}
