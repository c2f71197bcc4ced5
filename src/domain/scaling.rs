//! Per-kind scaling strategies
//!
//! Integer-like data is compared on raw values, floating-point data is
//! min-max rescaled into `[0, 1]`, each array using only its own range.

use crate::domain::entities::ElementKind;

/// How values are transformed before differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleStrategy {
    /// Raw values (integers are codes, rescaling would distort them)
    Identity,
    /// Independent min-max normalization of each array
    MinMax,
}

impl ScaleStrategy {
    /// Strategy for a kind, `None` when the kind cannot be compared.
    pub fn for_kind(kind: &ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Signed | ElementKind::Unsigned | ElementKind::Boolean => {
                Some(ScaleStrategy::Identity)
            }
            ElementKind::Float => Some(ScaleStrategy::MinMax),
            ElementKind::Unsupported(_) => None,
        }
    }
}

/// Min-max scaled copy of an array.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub values: Vec<f64>,
    /// All finite values were equal (or there were none); they map to `0.0`
    pub degenerate: bool,
}

/// Rescale `values` linearly so the observed minimum maps to 0 and the maximum to 1.
///
/// Only finite values take part in the min/max and are rescaled; NaN and
/// infinities pass through unchanged. A constant array maps to all zeros.
pub fn min_max_scale(values: &[f64]) -> Scaled {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let degenerate = max <= min;
    // max - min overflows for ranges wider than f64::MAX; halve both sides then
    let halved = !(max - min).is_finite();

    let values = values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                v
            } else if degenerate {
                0.0
            } else if halved {
                ((v / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)).clamp(0.0, 1.0)
            } else {
                // clamp absorbs rounding just outside [0, 1]
                ((v - min) / (max - min)).clamp(0.0, 1.0)
            }
        })
        .collect();

    Scaled { values, degenerate }
}
