//! Finite difference Jacobian of the centre-state residual.

use crate::error::{BoundaryError, BoundaryResult};
use nalgebra::{DMatrix, DVector};

/// Box constraints on the unknowns.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn open(n: usize) -> Self {
        Self {
            lower: vec![f64::NEG_INFINITY; n],
            upper: vec![f64::INFINITY; n],
        }
    }
}

/// Compute the Jacobian by finite differences with one step per unknown,
/// never evaluating `f` outside `bounds`.
///
/// Column j is `(f(x + h_j e_j) − f(x − h_j e_j)) / (2 h_j)` away from the
/// bounds. Within one step of a bound the difference turns one-sided, and
/// the step shrinks when the box is narrower than `h_j` on both sides.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
    steps: &[f64],
    bounds: &Bounds,
) -> BoundaryResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> BoundaryResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;
    let mut f_center: Option<DVector<f64>> = None;

    for j in 0..n {
        let room_up = (bounds.upper[j] - x[j]).max(0.0);
        let room_down = (x[j] - bounds.lower[j]).max(0.0);
        let dx = steps[j];

        let (up, down) = if room_up >= dx && room_down >= dx {
            (dx, dx)
        } else if room_up >= dx {
            (dx, 0.0)
        } else if room_down >= dx {
            (0.0, dx)
        } else if room_up >= room_down {
            (room_up, 0.0)
        } else {
            (0.0, room_down)
        };
        if up + down <= 0.0 {
            return Err(BoundaryError::InvalidArg {
                what: "no room for a difference step inside the bounds",
            });
        }

        let mut eval_at = |offset: f64| -> BoundaryResult<DVector<f64>> {
            if offset == 0.0 {
                if let Some(fc) = &f_center {
                    return Ok(fc.clone());
                }
                let fc = f(x)?;
                f_center = Some(fc.clone());
                return Ok(fc);
            }
            let mut xs = x.clone();
            xs[j] += offset;
            f(&xs)
        };
        let f_plus = eval_at(up)?;
        let f_minus = eval_at(-down)?;

        let df = (f_plus - f_minus) / (up + down);
        let m = jac.get_or_insert_with(|| DMatrix::zeros(df.len(), n));
        m.set_column(j, &df);
    }

    Ok(jac.unwrap_or_else(|| DMatrix::zeros(0, n)))
}

/// Smallest column norm; a value near zero flags an unknown the residual
/// does not see.
pub fn min_column_norm(jac: &DMatrix<f64>) -> f64 {
    jac.column_iter()
        .map(|c| c.norm())
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f = (2x + y, x − 3y)
        let f = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![2.0 * x[0] + x[1], x[0] - 3.0 * x[1]]))
        };
        let x = DVector::from_vec(vec![300.0, 40.0]);
        let jac = central_difference_jacobian(&x, f, &[0.03, 0.004], &Bounds::open(2)).unwrap();
        assert!((jac[(0, 0)] - 2.0).abs() < 1e-9);
        assert!((jac[(0, 1)] - 1.0).abs() < 1e-9);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-9);
        assert!((jac[(1, 1)] + 3.0).abs() < 1e-9);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x; central differences are exact for quadratics
        let f = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0]))
        };
        let x = DVector::from_element(1, 3.0);
        let jac = central_difference_jacobian(&x, f, &[1e-3], &Bounds::open(1)).unwrap();
        assert!((jac[(0, 0)] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn detects_blind_unknown() {
        let f = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0], 2.0 * x[0]]))
        };
        let x = DVector::from_vec(vec![1.0, 1.0]);
        let jac = central_difference_jacobian(&x, f, &[1e-4, 1e-4], &Bounds::open(2)).unwrap();
        assert!(min_column_norm(&jac) < 1e-12);
    }

    #[test]
    fn stays_inside_bounds() {
        // defined on [1, 2] only; f = x²
        let f = |x: &DVector<f64>| -> BoundaryResult<DVector<f64>> {
            if !(1.0..=2.0).contains(&x[0]) {
                return Err(BoundaryError::InvalidArg { what: "outside domain" });
            }
            Ok(DVector::from_element(1, x[0] * x[0]))
        };
        let bounds = Bounds {
            lower: vec![1.0],
            upper: vec![2.0],
        };
        let at_lower = central_difference_jacobian(&DVector::from_element(1, 1.0), f, &[1e-6], &bounds).unwrap();
        assert!((at_lower[(0, 0)] - 2.0).abs() < 1e-5);
        let at_upper = central_difference_jacobian(&DVector::from_element(1, 2.0), f, &[1e-6], &bounds).unwrap();
        assert!((at_upper[(0, 0)] - 4.0).abs() < 1e-5);
        let narrow = Bounds {
            lower: vec![1.0],
            upper: vec![1.0 + 1e-7],
        };
        let squeezed = central_difference_jacobian(&DVector::from_element(1, 1.0), f, &[1e-3], &narrow).unwrap();
        assert!((squeezed[(0, 0)] - 2.0).abs() < 1e-5);
    }
}
