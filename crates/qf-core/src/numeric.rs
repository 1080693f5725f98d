use crate::QfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, QfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(QfError::NonFinite { what, value: v })
    }
}

/// Reject non-finite and non-positive values.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, QfError> {
    ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(QfError::InvalidArg { what })
    }
}

/// `||new - old||₂ / ||old||₂`, the convergence measure of fixed-point loops.
///
/// Returns the absolute norm of the difference when `old` is the zero vector.
pub fn relative_change(new: &[Real], old: &[Real]) -> Real {
    let (mut num, mut den) = (0.0, 0.0);
    for (a, b) in new.iter().zip(old) {
        num += (a - b) * (a - b);
        den += b * b;
    }
    if den > 0.0 {
        (num / den).sqrt()
    } else {
        num.sqrt()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn relative_change_is_scale_free(
            old in proptest::collection::vec(1.0f64..1e6, 1..6),
            bump in 1e-6f64..1e-1,
            scale in 1e-3f64..1e3,
        ) {
            let new: Vec<f64> = old.iter().map(|v| v * (1.0 + bump)).collect();
            let rc = relative_change(&new, &old);
            prop_assert!((rc - bump).abs() <= 1e-9 * bump);
            let old_s: Vec<f64> = old.iter().map(|v| v * scale).collect();
            let new_s: Vec<f64> = new.iter().map(|v| v * scale).collect();
            prop_assert!((relative_change(&new_s, &old_s) - rc).abs() <= 1e-9 * rc);
        }
    }
}
