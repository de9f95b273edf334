//! Dense-output history for delay problems.
//!
//! Every accepted step leaves a [`HistorySegment`]: a polynomial per component valid on
//! `[t_start, t_end]`. The [`HistoryBuffer`] keeps the segments contiguous and ordered, answers
//! delayed-argument queries by binary search and falls back to the user history function
//! `phi` before the initial time.

use log::debug;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::rc::Rc;

use crate::numerical::Driver::errors::SolverError;

/// `phi(component, t)` for `t < t0`
pub type HistoryFn = Rc<dyn Fn(usize, f64) -> f64>;

/// relative slack for queries a roundoff past the latest recorded time
const END_SLACK: f64 = 8.0 * f64::EPSILON;

/// Evaluates the `dx`-th derivative of polynomial column `cj` at local coordinate `s`.
/// Coefficient of the highest-order term comes first.
fn evaluate_poly(s: f64, c: &DMatrix<f64>, cj: usize, dx: usize) -> f64 {
    let k = c.nrows();
    let mut res = 0.0;
    let mut z = 1.0;
    for kp in 0..k {
        if kp < dx {
            continue;
        }
        let prefactor: f64 = ((kp - dx + 1)..=kp).map(|v| v as f64).product();
        res += c[(k - kp - 1, cj)] * z * prefactor;
        if kp < k - 1 {
            z *= s;
        }
    }
    res
}

/// Interpolant of one accepted step.
#[derive(Clone, PartialEq)]
pub struct HistorySegment {
    t_start: f64,
    t_end: f64,
    /// (degree + 1) x n, powers of `t - t_start`, highest first
    coeffs: DMatrix<f64>,
}

impl fmt::Debug for HistorySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistorySegment")
            .field("t_start", &self.t_start)
            .field("t_end", &self.t_end)
            .field("degree", &(self.coeffs.nrows().saturating_sub(1)))
            .finish()
    }
}

impl HistorySegment {
    pub fn new(t_start: f64, t_end: f64, coeffs: DMatrix<f64>) -> Result<Self, SolverError> {
        if !(t_end >= t_start) {
            return Err(SolverError::Invariant(format!(
                "segment end {} precedes its start {}",
                t_end, t_start
            )));
        }
        if coeffs.nrows() == 0 {
            return Err(SolverError::Invariant("segment without coefficients".to_string()));
        }
        Ok(HistorySegment {
            t_start,
            t_end,
            coeffs,
        })
    }

    /// Cubic Hermite interpolant through `(t0, y0, yd0)` and `(t1, y1, yd1)`.
    pub fn hermite(
        t0: f64,
        y0: &DVector<f64>,
        yd0: &DVector<f64>,
        t1: f64,
        y1: &DVector<f64>,
        yd1: &DVector<f64>,
    ) -> Self {
        let n = y0.len();
        let h = t1 - t0;
        let mut coeffs = DMatrix::zeros(4, n);
        for i in 0..n {
            let (c3, c2) = if h > 0.0 {
                let slope = (y1[i] - y0[i]) / h;
                (
                    (yd0[i] + yd1[i] - 2.0 * slope) / (h * h),
                    (3.0 * slope - 2.0 * yd0[i] - yd1[i]) / h,
                )
            } else {
                (0.0, 0.0)
            };
            coeffs[(0, i)] = c3;
            coeffs[(1, i)] = c2;
            coeffs[(2, i)] = yd0[i];
            coeffs[(3, i)] = y0[i];
        }
        HistorySegment {
            t_start: t0,
            t_end: t1.max(t0),
            coeffs,
        }
    }

    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn n_components(&self) -> usize {
        self.coeffs.ncols()
    }

    pub fn value(&self, i: usize, t: f64) -> f64 {
        evaluate_poly(t - self.t_start, &self.coeffs, i, 0)
    }

    pub fn derivative(&self, i: usize, t: f64) -> f64 {
        evaluate_poly(t - self.t_start, &self.coeffs, i, 1)
    }

    pub fn values(&self, t: f64) -> DVector<f64> {
        DVector::from_iterator(
            self.n_components(),
            (0..self.n_components()).map(|i| self.value(i, t)),
        )
    }

    pub fn derivatives(&self, t: f64) -> DVector<f64> {
        DVector::from_iterator(
            self.n_components(),
            (0..self.n_components()).map(|i| self.derivative(i, t)),
        )
    }

    /// same polynomial restricted to `[t_start, t_end]`
    pub fn truncated(&self, t_end: f64) -> Self {
        HistorySegment {
            t_start: self.t_start,
            t_end: t_end.clamp(self.t_start, self.t_end),
            coeffs: self.coeffs.clone(),
        }
    }
}

/// Ordered, contiguous segments plus the pre-initial history.
pub struct HistoryBuffer {
    t0: f64,
    y0: DVector<f64>,
    yd0: DVector<f64>,
    segments: Vec<HistorySegment>,
    phi: HistoryFn,
    /// components whose derivative may be queried; all when `None`
    dense_components: Option<Vec<usize>>,
    t_end: f64,
}

impl fmt::Debug for HistoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryBuffer")
            .field("t0", &self.t0)
            .field("t_end", &self.t_end)
            .field("segments", &self.segments.len())
            .field("dense_components", &self.dense_components)
            .finish()
    }
}

impl HistoryBuffer {
    pub fn new(
        t0: f64,
        y0: DVector<f64>,
        yd0: DVector<f64>,
        phi: HistoryFn,
        dense_components: Option<Vec<usize>>,
    ) -> Self {
        HistoryBuffer {
            t0,
            y0,
            yd0,
            segments: Vec::new(),
            phi,
            dense_components,
            t_end: t0,
        }
    }

    /// derivative at `t0` used while no segment has been recorded
    pub fn set_initial_derivative(&mut self, yd0: DVector<f64>) {
        self.yd0 = yd0;
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// latest recorded time (`t0` before the first step)
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[HistorySegment] {
        &self.segments
    }

    pub fn record(&mut self, segment: HistorySegment) -> Result<(), SolverError> {
        if segment.t_start() != self.t_end {
            return Err(SolverError::Invariant(format!(
                "history segment starts at {} but the buffer ends at {}",
                segment.t_start(),
                self.t_end
            )));
        }
        if segment.n_components() != self.y0.len() {
            return Err(SolverError::dimension(
                "history segment",
                self.y0.len(),
                segment.n_components(),
            ));
        }
        self.t_end = segment.t_end();
        self.segments.push(segment);
        Ok(())
    }

    fn check_component(&self, i: usize) -> Result<(), SolverError> {
        if i >= self.y0.len() {
            return Err(SolverError::dimension("history component", self.y0.len(), i));
        }
        Ok(())
    }

    /// segment covering `t >= t0`; right-continuous at segment boundaries
    fn locate(&self, t: f64) -> Result<Option<&HistorySegment>, SolverError> {
        let slack = END_SLACK * self.t_end.abs().max(1.0);
        if t > self.t_end + slack {
            return Err(SolverError::OutOfRange {
                t,
                t_end: self.t_end,
            });
        }
        if self.segments.is_empty() {
            return Ok(None);
        }
        let idx = self.segments.partition_point(|s| s.t_start() <= t);
        if idx == 0 {
            return Err(SolverError::Invariant(format!(
                "history before {} was pruned, queried at {}",
                self.segments[0].t_start(),
                t
            )));
        }
        Ok(Some(&self.segments[idx - 1]))
    }

    pub fn evaluate(&self, i: usize, t: f64) -> Result<f64, SolverError> {
        self.check_component(i)?;
        if t < self.t0 {
            return Ok((self.phi)(i, t));
        }
        match self.locate(t)? {
            Some(segment) => Ok(segment.value(i, t.min(segment.t_end()))),
            None => Ok(self.y0[i]),
        }
    }

    pub fn evaluate_derivative(&self, i: usize, t: f64) -> Result<f64, SolverError> {
        self.check_component(i)?;
        if let Some(dense) = &self.dense_components {
            if !dense.contains(&i) {
                return Err(SolverError::Dimension {
                    what: format!("dense output of component {}", i),
                    expected: dense.len(),
                    actual: i,
                });
            }
        }
        if t < self.t0 {
            let h = 1e-6 * t.abs().max(1.0);
            return Ok(((self.phi)(i, t + h) - (self.phi)(i, t - h)) / (2.0 * h));
        }
        match self.locate(t)? {
            Some(segment) => Ok(segment.derivative(i, t.min(segment.t_end()))),
            None => Ok(self.yd0[i]),
        }
    }

    /// Drops segments ending before `t_now - max_lag`. The segment covering that time and
    /// every later one are kept.
    pub fn prune(&mut self, t_now: f64, max_lag: f64) {
        let cutoff = t_now - max_lag.max(0.0);
        let keep_from = self.segments.partition_point(|s| s.t_end() < cutoff);
        // never empty the buffer
        let keep_from = keep_from.min(self.segments.len().saturating_sub(1));
        if keep_from > 0 {
            self.segments.drain(..keep_from);
            debug!("pruned {} history segments before t = {}", keep_from, cutoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sin_segment(a: f64, b: f64) -> HistorySegment {
        let v = |t: f64| DVector::from_vec(vec![t.sin(), t * t]);
        let d = |t: f64| DVector::from_vec(vec![t.cos(), 2.0 * t]);
        HistorySegment::hermite(a, &v(a), &d(a), b, &v(b), &d(b))
    }

    fn buffer() -> HistoryBuffer {
        let phi: HistoryFn = Rc::new(|i, t| if i == 0 { t.sin() } else { t * t });
        HistoryBuffer::new(
            0.0,
            DVector::from_vec(vec![0.0, 0.0]),
            DVector::from_vec(vec![1.0, 0.0]),
            phi,
            Some(vec![0]),
        )
    }

    #[test]
    fn hermite_reproduces_end_values_and_cubics() {
        let y0 = DVector::from_vec(vec![1.0]);
        let yd0 = DVector::from_vec(vec![0.0]);
        // y = 1 + t^3 on [0, 2]
        let y1 = DVector::from_vec(vec![9.0]);
        let yd1 = DVector::from_vec(vec![12.0]);
        let seg = HistorySegment::hermite(0.0, &y0, &yd0, 2.0, &y1, &yd1);
        assert_relative_eq!(seg.value(0, 2.0), 9.0, epsilon = 1e-12);
        assert_relative_eq!(seg.value(0, 1.5), 1.0 + 1.5f64.powi(3), epsilon = 1e-12);
        assert_relative_eq!(seg.derivative(0, 1.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(seg.derivative(0, 2.0), 12.0, epsilon = 1e-12);
        let short = seg.truncated(1.0);
        assert_eq!(short.t_end(), 1.0);
        assert_relative_eq!(short.value(0, 1.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn round_trip_over_zero_to_five() {
        let mut buf = buffer();
        buf.record(sin_segment(0.0, 2.5)).unwrap();
        buf.record(sin_segment(2.5, 5.0)).unwrap();
        assert_eq!(buf.len(), 2);

        // continuity at the shared boundary
        let left = buf.evaluate(0, 2.5 - 1e-12).unwrap();
        let at = buf.evaluate(0, 2.5).unwrap();
        assert_relative_eq!(left, at, epsilon = 1e-9);
        assert_relative_eq!(at, 2.5f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(buf.evaluate(1, 4.0).unwrap(), 16.0, epsilon = 1e-9);

        // before t0 the history function is used as is
        assert_eq!(buf.evaluate(0, -1.0).unwrap(), (-1.0f64).sin());
        assert_relative_eq!(
            buf.evaluate_derivative(0, -1.0).unwrap(),
            (-1.0f64).cos(),
            epsilon = 1e-6
        );

        match buf.evaluate(0, 10.0) {
            Err(SolverError::OutOfRange { t, t_end }) => {
                assert_eq!(t, 10.0);
                assert_eq!(t_end, 5.0);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn right_continuous_at_boundaries() {
        let mut buf = buffer();
        let a = HistorySegment::hermite(
            0.0,
            &DVector::from_vec(vec![0.0, 0.0]),
            &DVector::from_vec(vec![0.0, 0.0]),
            1.0,
            &DVector::from_vec(vec![0.0, 0.0]),
            &DVector::from_vec(vec![0.0, 0.0]),
        );
        let b = HistorySegment::hermite(
            1.0,
            &DVector::from_vec(vec![1.0, 0.0]),
            &DVector::from_vec(vec![0.0, 0.0]),
            2.0,
            &DVector::from_vec(vec![1.0, 0.0]),
            &DVector::from_vec(vec![0.0, 0.0]),
        );
        buf.record(a).unwrap();
        buf.record(b).unwrap();
        assert_eq!(buf.evaluate(0, 1.0).unwrap(), 1.0);
        assert_eq!(buf.evaluate(0, 0.999).unwrap(), 0.0);
    }

    #[test]
    fn empty_buffer_answers_at_t0() {
        let buf = buffer();
        assert_eq!(buf.evaluate(0, 0.0).unwrap(), 0.0);
        assert_eq!(buf.evaluate_derivative(0, 0.0).unwrap(), 1.0);
        assert!(matches!(
            buf.evaluate(0, 0.1),
            Err(SolverError::OutOfRange { .. })
        ));
    }

    #[test]
    fn non_contiguous_record_is_rejected() {
        let mut buf = buffer();
        let err = buf.record(sin_segment(0.5, 1.0)).unwrap_err();
        assert!(matches!(err, SolverError::Invariant(_)));
    }

    #[test]
    fn derivative_only_for_dense_components() {
        let mut buf = buffer();
        buf.record(sin_segment(0.0, 1.0)).unwrap();
        assert!(buf.evaluate_derivative(0, 0.5).is_ok());
        assert!(matches!(
            buf.evaluate_derivative(1, 0.5),
            Err(SolverError::Dimension { .. })
        ));
        assert!(matches!(
            buf.evaluate(2, 0.5),
            Err(SolverError::Dimension { .. })
        ));
    }

    #[test]
    fn prune_keeps_covering_segment() {
        let mut buf = buffer();
        for k in 0..5 {
            buf.record(sin_segment(k as f64, (k + 1) as f64)).unwrap();
        }
        buf.prune(5.0, 2.5);
        // [2, 3] still covers 2.5
        assert_eq!(buf.segments()[0].t_start(), 2.0);
        assert!(buf.evaluate(0, 2.5).is_ok());
        assert!(matches!(
            buf.evaluate(0, 1.5),
            Err(SolverError::Invariant(_))
        ));
        assert_relative_eq!(buf.evaluate(0, -0.5).unwrap(), (-0.5f64).sin());
    }
}
