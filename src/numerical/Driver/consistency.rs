//! Consistent initial values for implicit problems.
//!
//! `ConsistencyInitializer` checks the guesses, picks the unknowns according to the mode and
//! delegates the nonlinear solve to the kernel's own initialization routine.

use log::info;
use nalgebra::DVector;
use strum_macros::{Display, EnumString};

use crate::numerical::Driver::errors::SolverError;
use crate::numerical::Driver::kernel::{KernelSettings, Residual, StepKernel};

/// which unknowns the initialization solves for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum InitMode {
    /// all of `y`, holding `y'` as given
    #[strum(to_string = "IDA_Y_INIT", serialize = "Y_INIT")]
    YInit,
    /// algebraic `y` and differential `y'`, holding differential `y` fixed
    #[strum(to_string = "IDA_YA_YDP_INIT", serialize = "YA_YDP_INIT")]
    YaYdpInit,
}

#[derive(Debug, Clone)]
pub struct ConsistencyInitializer {
    n: usize,
}

impl ConsistencyInitializer {
    pub fn new(n: usize) -> Self {
        ConsistencyInitializer { n }
    }

    pub fn compute<K: StepKernel + ?Sized>(
        &self,
        kernel: &mut K,
        mode: InitMode,
        t0: f64,
        y_guess: &DVector<f64>,
        yd_guess: &DVector<f64>,
        settings: &KernelSettings,
        residual: &Residual<'_>,
    ) -> Result<(DVector<f64>, DVector<f64>), SolverError> {
        if y_guess.len() != self.n {
            return Err(SolverError::dimension("y guess", self.n, y_guess.len()));
        }
        if yd_guess.len() != self.n {
            return Err(SolverError::dimension("yd guess", self.n, yd_guess.len()));
        }
        if settings.differential.len() != self.n {
            return Err(SolverError::dimension(
                "algvar",
                self.n,
                settings.differential.len(),
            ));
        }
        info!("computing consistent initial values with {}", mode);
        let (y, yd) = kernel.calc_ic(mode, t0, y_guess, yd_guess, settings, residual)?;
        if y.len() != self.n || yd.len() != self.n {
            return Err(SolverError::Invariant(format!(
                "{} kernel returned initial values of size {}/{}, expected {}",
                kernel.name(),
                y.len(),
                yd.len(),
                self.n
            )));
        }
        if y.iter().chain(yd.iter()).any(|x| !x.is_finite()) {
            return Err(SolverError::convergence(t0, "non-finite consistent initial values"));
        }
        Ok((y, yd))
    }
}
