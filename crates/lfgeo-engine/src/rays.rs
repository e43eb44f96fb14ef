//! Paraxial ray sampling through micro lens array and main lens.

use lfgeo_core::{
    CameraParameters, LinearSystemError, LinearSystemSolver, ParaxialRay, Real, RefocusGeometry,
    TriangulationGeometry,
};

/// Traces the ray pairs used by refocusing and triangulation for one camera
/// and a known main lens image distance.
#[derive(Debug, Clone, Copy)]
pub struct RayGeometryModel<'a> {
    params: &'a CameraParameters,
    image_distance: Real,
}

impl<'a> RayGeometryModel<'a> {
    pub fn new(params: &'a CameraParameters, image_distance: Real) -> Self {
        Self {
            params,
            image_distance,
        }
    }

    fn trace(&self, pixel: Real, center: Real, exit: Real) -> ParaxialRay {
        ParaxialRay::trace(
            pixel,
            center,
            exit,
            self.params.micro_focal_length,
            self.image_distance,
            self.params.main_focal_length,
        )
    }

    /// Micro image centre behind the micro lens at height `s`, found by the
    /// chief ray from the exit pupil centre.
    fn micro_image_center(&self, s: Real) -> Real {
        let chief_slope = -s / self.params.exit_pupil_distance;
        -chief_slope * self.params.micro_focal_length + s
    }

    /// Rays for the refocused plane selected by the shift parameter `a`.
    ///
    /// The two micro lenses are chosen so that their rays straddle the
    /// optical axis as symmetrically as `a` allows:
    /// `j0 = -round(a·(M-1)/2)`, `j1 = a·(M-1) + j0`. Ray `0` starts at the
    /// outermost pixel `+(M-1)/2` of its micro image, ray `1` at `-(M-1)/2`.
    pub fn refocus(&self) -> RefocusGeometry {
        let p = self.params;
        let c = p.half_resolution();
        let a = p.refocus;

        // halves round to even so that fractional shifts pick the same lens pair
        // regardless of sign
        let j0 = -(a * c).round_ties_even();
        let j1 = a * (p.micro_image_resolution - 1.0) + j0;
        let lens_indices = [j0, j1];

        let mut geometry = RefocusGeometry {
            lens_indices,
            ..Default::default()
        };

        for k in 0..2 {
            let s = lens_indices[k] * p.micro_pitch;
            let uc = self.micro_image_center(s);
            let offset = if k == 0 { c } else { -c };
            let u = uc + offset * p.pixel_pitch;

            geometry.lens_centers[k] = s;
            geometry.micro_image_centers[k] = uc;
            geometry.central[k] = self.trace(u, s, s);
            geometry.upper[k] = self.trace(
                u + p.pixel_pitch / 2.0,
                s,
                s + p.micro_pitch / 2.0,
            );
            geometry.lower[k] = self.trace(
                u - p.pixel_pitch / 2.0,
                s,
                s - p.micro_pitch / 2.0,
            );
        }

        geometry
    }

    /// Rays for the virtual camera pair separated by viewpoint gap `G`.
    ///
    /// Ray `0` leaves the on-axis micro lens from pixel `G`, ray `1` leaves
    /// the neighbouring micro lens (`j = 1`) from the same viewpoint.
    pub fn triangulation(&self) -> TriangulationGeometry {
        let p = self.params;
        let gap = Real::from(p.viewpoint_gap) * p.pixel_pitch;

        let s = p.micro_pitch;
        let uc = self.micro_image_center(s);

        TriangulationGeometry {
            lens_center: s,
            micro_image_center: uc,
            rays: [self.trace(gap, 0.0, 0.0), self.trace(uc + gap, s, s)],
        }
    }
}

/// Longitudinal distance behind the micro lens array at which two
/// image-side rays cross.
pub fn image_side_crossing(pair: &[ParaxialRay; 2]) -> Result<Real, LinearSystemError> {
    let x = LinearSystemSolver::intersect(
        [pair[0].slope, pair[1].slope],
        [pair[0].lens, pair[1].lens],
    )?;
    Ok(x.x)
}

/// Longitudinal distance in front of the main lens at which two object-side
/// rays cross, together with the crossing height.
pub fn object_side_crossing(pair: &[ParaxialRay; 2]) -> Result<(Real, Real), LinearSystemError> {
    let x = LinearSystemSolver::intersect(
        [pair[0].object_slope, pair[1].object_slope],
        [pair[0].main_lens, pair[1].main_lens],
    )?;
    Ok((x.x, x.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfgeo_core::test_utils::reference_camera;

    #[test]
    fn unit_shift_picks_symmetric_lenses() {
        let params = reference_camera();
        let geometry = RayGeometryModel::new(&params, params.main_focal_length).refocus();
        assert_eq!(geometry.lens_indices, [-6.0, 6.0]);
        assert_eq!(geometry.lens_centers, [-0.75, 0.75]);

        // mirror symmetry about the optical axis
        let [r0, r1] = geometry.central;
        assert!((r0.slope + r1.slope).abs() < 1e-15);
        assert!((r0.main_lens + r1.main_lens).abs() < 1e-12);
        assert!((geometry.micro_image_centers[0] + geometry.micro_image_centers[1]).abs() < 1e-15);
    }

    #[test]
    fn half_shift_rounds_to_even() {
        let params = CameraParameters {
            refocus: 0.5,
            micro_image_resolution: 11.0,
            ..reference_camera()
        };
        let geometry = RayGeometryModel::new(&params, params.main_focal_length).refocus();
        // a·(M-1)/2 = 2.5 rounds to 2
        assert_eq!(geometry.lens_indices, [-2.0, 3.0]);
    }

    #[test]
    fn bounding_rays_share_central_slope_origin() {
        let params = reference_camera();
        let geometry = RayGeometryModel::new(&params, params.main_focal_length).refocus();
        for k in 0..2 {
            let c = geometry.central[k];
            let up = geometry.upper[k];
            let lo = geometry.lower[k];
            assert!((up.pixel - c.pixel - params.pixel_pitch / 2.0).abs() < 1e-15);
            assert!((c.pixel - lo.pixel - params.pixel_pitch / 2.0).abs() < 1e-15);
            assert!((up.lens - c.lens - params.micro_pitch / 2.0).abs() < 1e-15);
            assert!((c.lens - lo.lens - params.micro_pitch / 2.0).abs() < 1e-15);
        }
    }

    #[test]
    fn zero_shift_rays_cross_at_micro_lens() {
        let params = CameraParameters {
            refocus: 0.0,
            ..reference_camera()
        };
        let geometry = RayGeometryModel::new(&params, params.main_focal_length).refocus();
        let z = image_side_crossing(&geometry.central).unwrap();
        assert_eq!(z, 0.0);
        // collimated object side: no crossing
        assert!(object_side_crossing(&geometry.central).is_err());
    }

    #[test]
    fn triangulation_rays_start_from_gap_pixel() {
        let params = reference_camera();
        let geometry = RayGeometryModel::new(&params, params.main_focal_length).triangulation();
        let [r0, r1] = geometry.rays;
        assert_eq!(geometry.lens_center, params.micro_pitch);
        assert!((r0.slope - 6.0 * 0.009 / 2.75).abs() < 1e-15);
        assert_eq!(r0.lens, 0.0);
        assert!((r1.pixel - geometry.micro_image_center + 6.0 * 0.009).abs() < 1e-15);
        // focused at infinity the on-axis lens yields a ray parallel to the axis
        assert!(r0.object_slope.abs() < 1e-15);
        assert!(r1.object_slope < 0.0);
    }
}
