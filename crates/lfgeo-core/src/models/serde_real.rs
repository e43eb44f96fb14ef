//! Serde helpers for distances that may be infinite.
//!
//! JSON has no representation for IEEE infinities, so non-finite values are
//! written as strings (`"inf"`, `"-inf"`, `"nan"`). Reading accepts numbers,
//! those strings (case-insensitive, `"infinity"` included) and `null`, which
//! maps to `+inf`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

use crate::Real;

pub fn serialize<S: Serializer>(value: &Real, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if value.is_nan() {
        serializer.serialize_str("nan")
    } else if *value > 0.0 {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(Real),
    Text(String),
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Real, D::Error> {
    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(Real::INFINITY),
        Some(Repr::Number(v)) => Ok(v),
        Some(Repr::Text(text)) => parse_real(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid distance `{text}`"))),
    }
}

/// Parse a number that may be spelled as an infinity.
pub fn parse_real(text: &str) -> Option<Real> {
    let t = text.trim();
    match t.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" | "+infinity" => Some(Real::INFINITY),
        "-inf" | "-infinity" => Some(Real::NEG_INFINITY),
        _ => t.parse::<Real>().ok(),
    }
}
