use lfgeo_core::{LinearSystemError, ParameterError, Real};
use thiserror::Error;

/// Errors that abort a geometry computation.
///
/// Non-fatal conditions are reported as [`Diagnostic`](lfgeo_core::Diagnostic)s
/// on the result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The camera parameters violate an invariant.
    #[error("invalid camera parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
    /// A ray intersection could not be solved.
    #[error("ray intersection failed: {0}")]
    SingularSystem(#[from] LinearSystemError),
    /// The image distance iteration did not reach a fixed point.
    #[error("image distance did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
    /// Image-side and object-side distances disagree.
    #[error(
        "image-side distances {image_side:?} disagree with object-side distances {object_side:?}"
    )]
    Inconsistent {
        image_side: [Real; 3],
        object_side: [Real; 3],
    },
    /// The solved baseline disagrees with its closed form.
    #[error("solved baseline {solved} disagrees with closed-form baseline {closed_form}")]
    BaselineMismatch { solved: Real, closed_form: Real },
}
