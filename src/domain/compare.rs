//! Element-wise comparison and worst-element search

use crate::domain::entities::{Column, ComparisonResult, Scalar};
use crate::domain::error::DomainError;
use crate::domain::scaling::{min_max_scale, ScaleStrategy};

/// Position and size of the largest difference in a dataset pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Worst {
    pub index: usize,
    pub difference: f64,
}

/// Outcome of comparing one dataset pair against the precision.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Worst difference exceeds the precision
    Differs(ComparisonResult),
    /// Worst difference is at or below the precision; `None` for empty datasets
    Within(Option<Worst>),
}

/// Absolute difference of two values that are already on a common scale.
///
/// Never returns NaN: non-finite values compare by identity and any other
/// pairing with a non-finite value is an infinite difference.
pub fn float_difference(a: f64, b: f64) -> f64 {
    if a.is_finite() && b.is_finite() {
        (a - b).abs()
    } else if a == b || (a.is_nan() && b.is_nan()) {
        0.0
    } else {
        f64::INFINITY
    }
}

fn raw_difference(a: Scalar, b: Scalar) -> f64 {
    match (a.as_i128(), b.as_i128()) {
        // exact for the full i64/u64 range before the final rounding
        (Some(a), Some(b)) => (a - b).unsigned_abs() as f64,
        _ => float_difference(a.as_f64(), b.as_f64()),
    }
}

/// Element-wise absolute differences of two equally long columns after scaling.
pub fn differences(x: &Column, y: &Column, strategy: ScaleStrategy) -> Vec<f64> {
    match strategy {
        ScaleStrategy::Identity => (0..x.len().min(y.len()))
            .filter_map(|i| Some(raw_difference(x.get(i)?, y.get(i)?)))
            .collect(),
        ScaleStrategy::MinMax => {
            let xs = min_max_scale(&x.to_f64());
            let ys = min_max_scale(&y.to_f64());
            xs.values
                .iter()
                .zip(ys.values.iter())
                .map(|(&a, &b)| float_difference(a, b))
                .collect()
        }
    }
}

/// Index of the maximum difference, first occurrence on ties.
pub fn worst_element(differences: &[f64]) -> Option<Worst> {
    let mut worst: Option<Worst> = None;
    for (index, &difference) in differences.iter().enumerate() {
        match worst {
            Some(w) if difference <= w.difference => {}
            _ => worst = Some(Worst { index, difference }),
        }
    }
    worst
}

/// Compares dataset pairs against a precision threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparator {
    precision: f64,
}

impl Comparator {
    pub fn new(precision: f64) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Compare two columns of the dataset at `path`.
    ///
    /// Reports only when the worst difference is strictly greater than the
    /// precision. Reported values are the raw ones, never the scaled ones.
    pub fn evaluate(
        &self,
        path: &str,
        x: &Column,
        y: &Column,
        strategy: ScaleStrategy,
    ) -> Result<Verdict, DomainError> {
        if x.len() != y.len() {
            return Err(DomainError::ShapeMismatch {
                path: path.to_string(),
                left: vec![x.len()],
                right: vec![y.len()],
            });
        }

        let diffs = differences(x, y, strategy);
        let Some(worst) = worst_element(&diffs) else {
            return Ok(Verdict::Within(None));
        };

        if worst.difference > self.precision {
            // index comes from diffs, which has exactly x.len() entries
            match (x.get(worst.index), y.get(worst.index)) {
                (Some(xv), Some(yv)) => Ok(Verdict::Differs(ComparisonResult {
                    path: path.to_string(),
                    index: worst.index,
                    x: xv,
                    y: yv,
                    difference: worst.difference,
                })),
                _ => Ok(Verdict::Within(Some(worst))),
            }
        } else {
            Ok(Verdict::Within(Some(worst)))
        }
    }
}
