extern crate nalgebra as na;

use na::{DMatrix, DVector};

use crate::numerical::Driver::errors::SolverError;
use crate::numerical::Driver::kernel::Residual;
use log::{info, warn};

const EPS: f64 = f64::EPSILON;
/// floor for the finite-difference perturbation of a component
const JAC_THRESHOLD: f64 = 1.0;

pub fn newton_tol(rtol: f64) -> f64 {
    f64::max(10.0 * EPS / rtol, f64::min(0.03, rtol.powf(0.5)))
}

pub fn validate_first_step(first_step: f64, t0: f64, t_bound: f64) -> Result<f64, SolverError> {
    if first_step <= 0.0 {
        return Err(SolverError::configuration("inith", "must be positive"));
    }
    if first_step > (t_bound - t0).abs() {
        return Err(SolverError::configuration(
            "inith",
            format!("{} exceeds the integration interval", first_step),
        ));
    }
    info!("first step validation: done");
    Ok(first_step)
}

pub fn validate_max_step(max_step: f64) -> Result<f64, SolverError> {
    if max_step <= 0.0 {
        return Err(SolverError::configuration("maxh", "must be positive"));
    }
    Ok(max_step)
}

/// RMS norm
pub fn norm(vector: &DVector<f64>) -> f64 {
    if vector.len() == 0 {
        return 0.0;
    }
    vector.norm() / (vector.len() as f64).sqrt()
}

/// RMS norm of `vector / scale` over the components with `mask[i] == true`
/// (all components when there is no mask)
pub fn weighted_norm(vector: &DVector<f64>, scale: &DVector<f64>, mask: Option<&[bool]>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..vector.len() {
        if let Some(mask) = mask {
            if !mask[i] {
                continue;
            }
        }
        let e = vector[i] / scale[i];
        sum += e * e;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64).sqrt()
}

/// absolute tolerance given either as one number or per component
#[derive(Debug, Clone, PartialEq)]
pub enum NumberOrVec {
    Number(f64),
    Vec(Vec<f64>),
}

impl NumberOrVec {
    /// per-component vector of length n
    pub fn expand(&self, n: usize) -> DVector<f64> {
        match self {
            NumberOrVec::Number(x) => DVector::from_element(n, *x),
            NumberOrVec::Vec(v) => DVector::from_vec(v.clone()),
        }
    }

    pub fn min_value(&self) -> f64 {
        match self {
            NumberOrVec::Number(x) => *x,
            NumberOrVec::Vec(v) => v.iter().cloned().fold(f64::INFINITY, f64::min),
        }
    }
}

/// atol_i + rtol*|y_i|
pub fn scale_func(rtol: f64, atol: &DVector<f64>, y: &DVector<f64>) -> DVector<f64> {
    atol + y.abs() * rtol
}

/// This function calculates the initial step size.
///
/// For explicit problems the second derivative is estimated with one extra residual call
/// (the right-hand side is recovered as `-F(t, y, 0)`); for implicit problems only the
/// first-derivative estimate is used and the error test takes care of the rest.
pub fn select_initial_step(
    residual: &Residual<'_>,
    explicit: bool,
    t0: f64,
    y0: &DVector<f64>,
    yd0: &DVector<f64>,
    t_bound: f64,
    max_step: f64,
    order: f64,
    rtol: f64,
    atol: &DVector<f64>,
) -> f64 {
    if y0.len() == 0 {
        return f64::INFINITY;
    }
    let interval_length = (t_bound - t0).abs();
    if interval_length == 0.0 {
        return 0.0;
    }

    let scale = scale_func(rtol, atol, y0);
    let d0 = norm(&(y0.component_div(&scale)));
    let d1 = norm(&(yd0.component_div(&scale)));
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(interval_length);

    let d2 = if explicit {
        let y1 = y0 + h0 * yd0;
        let f1 = -residual(t0 + h0, &y1, &DVector::zeros(y0.len()));
        norm(&((f1 - yd0).component_div(&scale))) / h0
    } else {
        0.0
    };
    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        f64::max(1e-6, h0 * 1e-3)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order + 1.0))
    };

    vec![100.0 * h0, h1, interval_length, max_step]
        .into_iter()
        .fold(f64::INFINITY, |acc, x| acc.min(x))
}

/// Forward-difference Jacobians of the residual `F(t, y, yd)`.
///
/// Returns `(dF/dy, dF/dyd)`. For explicit problems `F = yd - f(t, y)`, so `dF/dyd` is the
/// identity and is not differenced.
pub fn num_jac(
    residual: &Residual<'_>,
    t: f64,
    y: &DVector<f64>,
    yd: &DVector<f64>,
    r0: &DVector<f64>,
    explicit: bool,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = y.len();
    let factor = EPS.sqrt();
    let mut jy = DMatrix::zeros(n, n);
    let mut y_pert = y.clone();
    for j in 0..n {
        let h = factor * f64::max(y[j].abs(), JAC_THRESHOLD);
        y_pert[j] = y[j] + h;
        // exactly representable increment
        let h = y_pert[j] - y[j];
        let r = residual(t, &y_pert, yd);
        jy.set_column(j, &((r - r0) / h));
        y_pert[j] = y[j];
    }

    let jyd = if explicit {
        DMatrix::identity(n, n)
    } else {
        let mut jyd = DMatrix::zeros(n, n);
        let mut yd_pert = yd.clone();
        for j in 0..n {
            let h = factor * f64::max(yd[j].abs(), JAC_THRESHOLD);
            yd_pert[j] = yd[j] + h;
            let h = yd_pert[j] - yd[j];
            let r = residual(t, y, &yd_pert);
            jyd.set_column(j, &((r - r0) / h));
            yd_pert[j] = yd[j];
        }
        jyd
    };
    if jy.iter().chain(jyd.iter()).any(|x| !x.is_finite()) {
        warn!("non-finite entries in the finite-difference jacobian at t = {}", t);
    }
    (jy, jyd)
}
