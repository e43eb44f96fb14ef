//! Scalar types and the linear solver behind every ray intersection.
//!
//! Intersecting two paraxial rays `y = m·z + o` is a 2×2 linear system
//!
//! ```text
//! | -m0  1 | | z |   | o0 |
//! | -m1  1 | | y | = | o1 |
//! ```
//!
//! which [`LinearSystemSolver::intersect`] builds and solves. The general
//! [`LinearSystemSolver::solve`] also accepts non-square systems and falls
//! back to the Moore-Penrose pseudo-inverse.

use nalgebra::{DMatrix, DVector, Vector2};
use thiserror::Error;

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;
/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;

/// Determinant threshold of the scale-normalized matrix below which a system
/// is reported as singular.
const SINGULAR_EPS: Real = 1e-14;

/// Failure to solve a linear system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearSystemError {
    #[error("matrix has {rows} rows but right-hand side has {len} entries")]
    DimensionMismatch { rows: usize, len: usize },
    #[error("linear system is empty")]
    Empty,
    #[error("linear system contains non-finite entries")]
    NonFinite,
    #[error("linear system is singular")]
    Singular,
}

/// Solver for small systems `A·x = b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSystemSolver;

/// Solve `A·x = b`; see [`LinearSystemSolver::solve`].
pub fn solve_linear_system(
    a: &DMatrix<Real>,
    b: &DVector<Real>,
) -> Result<DVector<Real>, LinearSystemError> {
    LinearSystemSolver::solve(a, b)
}

impl LinearSystemSolver {
    /// Solve `A·x = b` for an `n×m` matrix `A`.
    ///
    /// Square systems are solved through the exact inverse. Otherwise the
    /// Moore-Penrose pseudo-inverse is used, which yields the least-squares
    /// solution for overdetermined systems and the minimum-norm solution for
    /// underdetermined ones.
    ///
    /// # Errors
    ///
    /// [`LinearSystemError::Singular`] if `A` (or its Gram matrix) is
    /// numerically singular, [`LinearSystemError::NonFinite`] if any entry is
    /// infinite or NaN.
    pub fn solve(
        a: &DMatrix<Real>,
        b: &DVector<Real>,
    ) -> Result<DVector<Real>, LinearSystemError> {
        if a.nrows() != b.len() {
            return Err(LinearSystemError::DimensionMismatch {
                rows: a.nrows(),
                len: b.len(),
            });
        }
        if a.is_empty() {
            return Err(LinearSystemError::Empty);
        }
        if b.iter().any(|v| !v.is_finite()) {
            return Err(LinearSystemError::NonFinite);
        }

        let a_inv = if a.is_square() {
            invert(a)?
        } else {
            Self::pseudo_inverse(a)?
        };

        Ok(a_inv * b)
    }

    /// Moore-Penrose pseudo-inverse of a full-rank matrix.
    ///
    /// Wide matrices (`n < m`) use `Aᵗ·(A·Aᵗ)⁻¹`, tall matrices use
    /// `(Aᵗ·A)⁻¹·Aᵗ`; square matrices reduce to the ordinary inverse.
    pub fn pseudo_inverse(a: &DMatrix<Real>) -> Result<DMatrix<Real>, LinearSystemError> {
        if a.is_empty() {
            return Err(LinearSystemError::Empty);
        }
        let at = a.transpose();
        if a.nrows() <= a.ncols() {
            let gram = a * &at;
            Ok(at * invert(&gram)?)
        } else {
            let gram = &at * a;
            Ok(invert(&gram)? * at)
        }
    }

    /// Intersect two rays `y = slope·z + offset`.
    ///
    /// Returns `(z, y)` of the crossing point. Parallel rays give
    /// [`LinearSystemError::Singular`].
    pub fn intersect(slopes: [Real; 2], offsets: [Real; 2]) -> Result<Vec2, LinearSystemError> {
        let a = DMatrix::from_row_slice(2, 2, &[-slopes[0], 1.0, -slopes[1], 1.0]);
        let b = DVector::from_column_slice(&offsets);
        let x = Self::solve(&a, &b)?;
        Ok(Vec2::new(x[0], x[1]))
    }
}

/// Invert a square matrix, rejecting numerically singular input.
fn invert(m: &DMatrix<Real>) -> Result<DMatrix<Real>, LinearSystemError> {
    if m.iter().any(|v| !v.is_finite()) {
        return Err(LinearSystemError::NonFinite);
    }
    let scale = m.amax();
    if scale == 0.0 {
        return Err(LinearSystemError::Singular);
    }

    let normalized = m / scale;
    let det = normalized.determinant();
    if det.abs() <= SINGULAR_EPS {
        return Err(LinearSystemError::Singular);
    }

    let inv = normalized
        .try_inverse()
        .ok_or(LinearSystemError::Singular)?;
    Ok(inv / scale)
}

/// Round `value` to `decimals` fractional digits.
///
/// Infinite and NaN values are returned unchanged, and so is any value that
/// cannot be scaled by `10^decimals` without overflowing.
pub fn round_to(value: Real, decimals: u32) -> Real {
    if !value.is_finite() {
        return value;
    }
    let Ok(exponent) = i32::try_from(decimals) else {
        return value;
    };
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// `true` if both values agree after rounding to `decimals` digits.
///
/// Two infinities of the same sign agree; NaN never agrees with anything.
pub fn agree_to(a: Real, b: Real, decimals: u32) -> bool {
    round_to(a, decimals) == round_to(b, decimals)
}

/// `true` if `a` and `b` are equal up to a few units in the last place.
pub fn nearly_equal(a: Real, b: Real) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    scale.is_finite() && (a - b).abs() <= 4.0 * Real::EPSILON * scale
}
