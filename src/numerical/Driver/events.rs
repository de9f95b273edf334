//! Sign-change detection on event indicators and localization of the event time.
//!
//! Localization runs on the dense output of a completed step, so it never calls the kernel.
//! The root finder is regula falsi with the Illinois modification, guarded by bisection.

use log::{debug, warn};
use nalgebra::DVector;

/// Configuration of the event localizer
#[derive(Debug, Clone)]
pub struct LocalizerConfig {
    /// bracket width at which the search stops; `None` scales with the step
    pub tolerance: Option<f64>,
    pub max_iterations: usize,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            tolerance: None,
            max_iterations: 100,
        }
    }
}

/// localized time of one indicator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Localized {
    pub t: f64,
    pub iterations: usize,
    pub boundary_detected: bool,
}

/// one discontinuity as reported to the driver and to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    pub t_event: f64,
    /// indicators that fired at `t_event`, ascending
    pub indices: Vec<usize>,
    pub boundary_detected: bool,
}

fn sign_changed(start: f64, end: f64) -> bool {
    (start > 0.0 && end <= 0.0) || (start < 0.0 && end >= 0.0)
}

/// Indicators whose sign changes between the two traces. A move from nonzero to zero
/// counts, a start at zero does not.
pub fn detect(trace_start: &DVector<f64>, trace_end: &DVector<f64>) -> Vec<usize> {
    trace_start
        .iter()
        .zip(trace_end.iter())
        .enumerate()
        .filter(|(_, (s, e))| sign_changed(**s, **e))
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct EventLocalizer {
    config: LocalizerConfig,
}

impl EventLocalizer {
    pub fn new() -> Self {
        Self {
            config: LocalizerConfig::default(),
        }
    }

    pub fn with_config(config: LocalizerConfig) -> Self {
        Self { config }
    }

    /// 4·eps·max(|t_lo|, |t_hi|) + 1e-12·(t_hi - t_lo) unless configured
    pub fn tolerance(&self, t_lo: f64, t_hi: f64) -> f64 {
        self.config.tolerance.unwrap_or_else(|| {
            4.0 * f64::EPSILON * t_lo.abs().max(t_hi.abs()) + 1e-12 * (t_hi - t_lo).abs()
        })
    }

    /// Time in `[t_lo, t_hi]` at which indicator `indicator_index`, read through `eval_fn`,
    /// crosses zero.
    ///
    /// Returns the upper end of the final bracket, so the indicator already has its new sign
    /// there. If the endpoint values do not bracket a root, `t_hi` is returned with
    /// `boundary_detected` set.
    pub fn localize<F>(
        &self,
        indicator_index: usize,
        t_lo: f64,
        t_hi: f64,
        eval_fn: F,
    ) -> Localized
    where
        F: Fn(f64) -> f64,
    {
        let tol = self.tolerance(t_lo, t_hi);
        let (mut a, mut b) = (t_lo, t_hi);
        let mut fa = eval_fn(a);
        let mut fb = eval_fn(b);

        if fb == 0.0 && fa != 0.0 {
            // still look for the first crossing, fb = 0 only pins the bracket end
        } else if !(fa.is_finite() && fb.is_finite()) || fa * fb > 0.0 || fa == 0.0 {
            warn!(
                "indicator {} values {} and {} do not bracket a root in [{}, {}]",
                indicator_index, fa, fb, t_lo, t_hi
            );
            return Localized {
                t: t_hi,
                iterations: 0,
                boundary_detected: true,
            };
        }

        // side of the last update: -1 for a, +1 for b
        let mut side = 0;
        let mut iterations = 0;
        while iterations < self.config.max_iterations && (b - a) > tol {
            iterations += 1;
            let mut c = if fb == fa {
                0.5 * (a + b)
            } else {
                b - fb * (b - a) / (fb - fa)
            };
            // bisection when the secant leaves the bracket and every fourth iteration
            if !(c > a && c < b) || iterations % 4 == 0 {
                c = 0.5 * (a + b);
            }
            let fc = eval_fn(c);
            if fc == 0.0 || sign_changed(fa, fc) {
                b = c;
                fb = fc;
                if side == 1 {
                    fa *= 0.5;
                }
                side = 1;
            } else {
                a = c;
                fa = fc;
                if side == -1 {
                    fb *= 0.5;
                }
                side = -1;
            }
        }
        debug!(
            "indicator {} localized at {} after {} iterations",
            indicator_index, b, iterations
        );
        Localized {
            t: b,
            iterations,
            boundary_detected: false,
        }
    }

    /// Localizes every changed indicator and keeps the earliest time. Indicators whose time
    /// lies within the tolerance of the earliest one are reported together.
    pub fn locate_earliest<F>(
        &self,
        changed: &[usize],
        t_lo: f64,
        t_hi: f64,
        eval_all: F,
    ) -> EventReport
    where
        F: Fn(f64) -> DVector<f64>,
    {
        let tol = self.tolerance(t_lo, t_hi);
        let localized: Vec<(usize, Localized)> = changed
            .iter()
            .map(|&i| (i, self.localize(i, t_lo, t_hi, |t| eval_all(t)[i])))
            .collect();
        let t_event = localized
            .iter()
            .map(|(_, l)| l.t)
            .fold(f64::INFINITY, f64::min);
        let mut indices = Vec::new();
        let mut boundary_detected = false;
        for (i, l) in localized {
            if l.t <= t_event + tol {
                indices.push(i);
                boundary_detected |= l.boundary_detected;
            }
        }
        indices.sort_unstable();
        EventReport {
            t_event,
            indices,
            boundary_detected,
        }
    }
}
