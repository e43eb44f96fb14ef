use serde::{Deserialize, Serialize};

/// Options shared by the refocusing and triangulation engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Fractional digits at which the image-side/object-side cross-checks
    /// must agree.
    pub decimals: u32,
    /// Iteration cap of the image distance solver.
    pub max_iterations: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            decimals: 4,
            max_iterations: 1000,
        }
    }
}
