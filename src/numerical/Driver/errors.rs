//! Error taxonomy of the integration driver.
//!
//! Every failure that can reach the caller of `simulate`, of the option setters or of the
//! history buffer is one variant of [`SolverError`]. Nothing is swallowed on the way up:
//! the driver only adds context (time, option name, sizes) before returning it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// bad option value detected before the run starts
    #[error("configuration error in option '{option}': {reason}")]
    Configuration { option: String, reason: String },

    /// size mismatch between problem data and options/guesses
    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    Dimension {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// the kernel or the consistency initializer gave up
    #[error("convergence failure at t = {t}: {reason}")]
    Convergence { t: f64, reason: String },

    #[error("maximum number of steps ({max_steps}) exceeded at t = {t}")]
    MaxStepsExceeded { max_steps: usize, t: f64 },

    #[error("history queried at t = {t}, beyond the latest recorded time {t_end}")]
    OutOfRange { t: f64, t_end: f64 },

    /// internal contract violation, fatal for the run
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl SolverError {
    pub fn configuration(option: &str, reason: impl Into<String>) -> Self {
        SolverError::Configuration {
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dimension(what: &str, expected: usize, actual: usize) -> Self {
        SolverError::Dimension {
            what: what.to_string(),
            expected,
            actual,
        }
    }

    pub fn convergence(t: f64, reason: impl Into<String>) -> Self {
        SolverError::Convergence {
            t,
            reason: reason.into(),
        }
    }

    /// errors after which the partial result is still meaningful
    pub fn keeps_partial_result(&self) -> bool {
        matches!(
            self,
            SolverError::MaxStepsExceeded { .. }
                | SolverError::Convergence { .. }
                | SolverError::OutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = SolverError::configuration("rtol", "must be positive");
        assert_eq!(
            e.to_string(),
            "configuration error in option 'rtol': must be positive"
        );
        let e = SolverError::dimension("atol", 3, 2);
        assert!(e.to_string().contains("expected 3, got 2"));
        let e = SolverError::MaxStepsExceeded {
            max_steps: 5,
            t: 0.25,
        };
        assert!(e.to_string().contains("(5)"));
        assert!(e.keeps_partial_result());
        assert!(!SolverError::Invariant("x".into()).keeps_partial_result());
    }
}
