use serde::{Deserialize, Serialize};

use crate::Real;

/// A paraxial ray traced from a sensor pixel through one micro lens and the
/// main lens into object space.
///
/// Heights are measured from the optical axis. Longitudinal positions are
/// implicit: the sensor sits one micro lens focal length `fs` behind the
/// micro lens, which sits at the image distance `bU` behind the main lens.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParaxialRay {
    /// Height `u` on the sensor.
    pub pixel: Real,
    /// Height `s` at which the ray leaves the micro lens array.
    pub lens: Real,
    /// Image-side slope `m`.
    pub slope: Real,
    /// Height `U` at the main lens.
    pub main_lens: Real,
    /// Height `F` at the main lens focal plane.
    pub focal_plane: Real,
    /// Object-side slope `q`.
    pub object_slope: Real,
}

impl ParaxialRay {
    /// Trace the ray leaving `pixel` towards the micro lens centre `center`.
    ///
    /// The image-side slope is set by the micro lens centre, while the ray
    /// leaves the array at height `exit`; both are equal for central rays and
    /// differ by half a micro lens pitch for depth-of-field bounding rays.
    pub fn trace(
        pixel: Real,
        center: Real,
        exit: Real,
        micro_focal_length: Real,
        image_distance: Real,
        main_focal_length: Real,
    ) -> Self {
        let slope = (center - pixel) / micro_focal_length;
        let main_lens = slope * image_distance + exit;
        let focal_plane = slope * main_focal_length;
        let object_slope = (focal_plane - main_lens) / main_focal_length;
        Self {
            pixel,
            lens: exit,
            slope,
            main_lens,
            focal_plane,
            object_slope,
        }
    }
}

/// Ray geometry sampled for refocusing.
///
/// Index `0` and `1` denote the two micro lenses whose rays intersect in the
/// refocused plane. `upper`/`lower` are the rays through the pixel borders
/// and micro lens borders that bound the depth of field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefocusGeometry {
    /// Micro lens indices `j`.
    pub lens_indices: [Real; 2],
    /// Micro lens centres `s`.
    pub lens_centers: [Real; 2],
    /// Micro image centres `uc`.
    pub micro_image_centers: [Real; 2],
    pub central: [ParaxialRay; 2],
    pub upper: [ParaxialRay; 2],
    pub lower: [ParaxialRay; 2],
}

impl RefocusGeometry {
    /// Ray pair whose crossing is the near depth-of-field border.
    pub fn near_pair(&self) -> [ParaxialRay; 2] {
        [self.lower[0], self.upper[1]]
    }

    /// Ray pair whose crossing is the far depth-of-field border.
    pub fn far_pair(&self) -> [ParaxialRay; 2] {
        [self.upper[0], self.lower[1]]
    }
}

/// Ray geometry sampled for triangulation.
///
/// `rays[0]` leaves the on-axis micro lens from viewpoint `G`, `rays[1]`
/// leaves the neighbouring micro lens so that both rays start on the same
/// virtual camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangulationGeometry {
    /// Centre `s` of the neighbouring micro lens.
    pub lens_center: Real,
    /// Micro image centre `uc` behind that lens.
    pub micro_image_center: Real,
    pub rays: [ParaxialRay; 2],
}
