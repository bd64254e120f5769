use std::cmp::Ordering;

/// Total ordering for floats where NaN compares equal to everything
pub fn safe_float_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
