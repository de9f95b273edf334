//! The seam between the driver and the step-producing method.
//!
//! The driver never looks inside a kernel: it hands over the residual `F(t, y, yd)` as a
//! borrowed closure, asks for one step attempt at a time and reads back the accepted state.
//! Explicit and delay problems reach the kernel already wrapped as `yd - f(..)`.

use nalgebra::DVector;

use crate::numerical::Driver::consistency::InitMode;
use crate::numerical::Driver::errors::SolverError;

/// residual of the problem in implicit form, `F(t, y, yd)`
pub type Residual<'a> = dyn Fn(f64, &DVector<f64>, &DVector<f64>) -> DVector<f64> + 'a;

/// Normalized settings handed to a kernel at the start of a run.
#[derive(Debug, Clone)]
pub struct KernelSettings {
    pub rtol: f64,
    /// absolute tolerance expanded to one entry per component
    pub atol: DVector<f64>,
    pub max_order: usize,
    /// f64::INFINITY when unbounded
    pub max_step: f64,
    pub first_step: Option<f64>,
    /// true for differential components, false for algebraic ones
    pub differential: Vec<bool>,
    /// exclude algebraic components from the local error test
    pub suppress_alg: bool,
    /// switch off the line search of the initialization routine
    pub lsoff: bool,
    /// first output time, sets the time scale of the initialization routine
    pub tout1: f64,
    /// the residual is `yd - f(t, y)`
    pub explicit: bool,
}

impl KernelSettings {
    pub fn new(n: usize) -> Self {
        KernelSettings {
            rtol: 1e-6,
            atol: DVector::from_element(n, 1e-6),
            max_order: 5,
            max_step: f64::INFINITY,
            first_step: None,
            differential: vec![true; n],
            suppress_alg: false,
            lsoff: false,
            tout1: 0.001,
            explicit: false,
        }
    }
}

/// accepted step as seen by the driver
#[derive(Debug, Clone)]
pub struct AcceptedStep {
    pub t_old: f64,
    pub t: f64,
    pub y: DVector<f64>,
    pub yd: DVector<f64>,
    /// step size actually taken
    pub h: f64,
    /// order used for the step
    pub order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ErrorTest,
    NewtonFailure,
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Accepted(AcceptedStep),
    /// no advance; `h_next` is the size the next attempt will use
    Rejected { h_next: f64, reason: RejectReason },
}

pub trait StepKernel {
    fn name(&self) -> &str;
    /// inclusive range of orders the method supports
    fn order_bounds(&self) -> (usize, usize);
    /// start a run at `(t0, y0, yd0)` towards `t_bound`
    fn initialize(
        &mut self,
        t0: f64,
        y0: &DVector<f64>,
        yd0: &DVector<f64>,
        t_bound: f64,
        settings: &KernelSettings,
        residual: &Residual<'_>,
    ) -> Result<(), SolverError>;
    /// restart at order one from a new state (after an event or at a breakpoint)
    fn restart(
        &mut self,
        t: f64,
        y: &DVector<f64>,
        yd: &DVector<f64>,
        residual: &Residual<'_>,
    ) -> Result<(), SolverError>;
    /// cap for the following steps, f64::INFINITY to lift it
    fn set_max_step(&mut self, max_step: f64);
    /// the next steps never go past `t_stop`
    fn set_stop_time(&mut self, t_stop: f64);
    /// one attempt; errors are fatal (step size underflow)
    fn attempt_step(&mut self, residual: &Residual<'_>) -> Result<StepOutcome, SolverError>;
    /// consistent initial values, see `ConsistencyInitializer`
    fn calc_ic(
        &mut self,
        mode: InitMode,
        t0: f64,
        y: &DVector<f64>,
        yd: &DVector<f64>,
        settings: &KernelSettings,
        residual: &Residual<'_>,
    ) -> Result<(DVector<f64>, DVector<f64>), SolverError>;
    fn jacobian_evaluations(&self) -> usize;
    fn lu_factorizations(&self) -> usize;
    fn reset_counters(&mut self);
}
