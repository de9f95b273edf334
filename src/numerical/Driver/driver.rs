//! Integration driver: the state machine that pulls steps from a kernel, watches the event
//! indicators, keeps the history of delay problems and collects the output.
//!
//! One run goes `Idle -> Validating -> (Initializing) -> Stepping <-> EventHandling ->
//! Terminated`, or ends in `Failed` from any state. After a failure the partial result
//! stays available through [`Driver::result`].
//!
//! ```ignore
//! let problem = Problem::explicit("decay", 0.0, DVector::from_vec(vec![1.0]), |_t, y, _sw| -y);
//! let mut driver = Driver::new(problem)?;
//! driver.options_mut().set_rtol(1e-8)?;
//! let result = driver.simulate(5.0, 50)?;
//! ```

use log::{debug, error, info, warn};
use nalgebra::{DMatrix, DVector};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use strum_macros::Display;

use crate::Utils::logger::{init_logger, log_file_name, save_matrix_to_csv};
use crate::numerical::BDF::BDF_solver::BDFKernel;
use crate::numerical::Driver::consistency::{ConsistencyInitializer, InitMode};
use crate::numerical::Driver::errors::SolverError;
use crate::numerical::Driver::events::{EventLocalizer, EventReport, LocalizerConfig, detect};
use crate::numerical::Driver::history::{HistoryBuffer, HistorySegment};
use crate::numerical::Driver::kernel::{Residual, StepKernel, StepOutcome};
use crate::numerical::Driver::options::{OptionValue, SolverOptions};
use crate::numerical::Driver::problem::{Equation, Problem};
use crate::numerical::Driver::statistics::Statistics;

const MAX_CONSECUTIVE_REJECTIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DriverState {
    Idle,
    Validating,
    Initializing,
    Stepping,
    EventHandling,
    Terminated,
    Failed,
}

/// size and order of one accepted step (one-step mode)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDetail {
    pub t: f64,
    pub h: f64,
    pub order: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub t: Vec<f64>,
    pub y: Vec<DVector<f64>>,
    pub yd: Vec<DVector<f64>>,
    pub statistics: Statistics,
    pub events: Vec<EventReport>,
    /// filled in one-step mode only
    pub step_detail: Vec<StepDetail>,
    /// switches at the end of the run
    pub switches: Vec<bool>,
    /// false when the run stopped on an error
    pub completed: bool,
}

impl RunResult {
    fn push(&mut self, t: f64, y: DVector<f64>, yd: DVector<f64>) {
        self.t.push(t);
        self.y.push(y);
        self.yd.push(yd);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// sample times and a matrix with one row per sample
    pub fn to_matrix(&self) -> (DVector<f64>, DMatrix<f64>) {
        let n = self.y.first().map_or(0, |y| y.len());
        let y = DMatrix::from_fn(self.y.len(), n, |i, j| self.y[i][j]);
        (DVector::from_vec(self.t.clone()), y)
    }

    /// columns `t, y_0 .. y_{n-1}`
    pub fn save_csv(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let (_, y) = self.to_matrix();
        let headers: Vec<String> = (0..y.ncols()).map(|i| format!("y_{}", i)).collect();
        save_matrix_to_csv(&y, &headers, path, &self.t, "t")?;
        info!("result saved to {}", path);
        Ok(())
    }
}

/// counters and side results of residual evaluations
#[derive(Debug, Default)]
struct Probes {
    nfev: Cell<usize>,
    max_lag: Cell<f64>,
    history_error: RefCell<Option<SolverError>>,
}

/// Delayed values `ydelay[lag][k]` of the components `lagcompmap[lag][k]`.
/// Arguments at or after `t` read the current state.
fn delayed_values(
    problem: &Problem,
    history: Option<&HistoryBuffer>,
    probes: &Probes,
    t: f64,
    y: &DVector<f64>,
) -> Result<Vec<DVector<f64>>, SolverError> {
    let (Some(delay), Some(history)) = (problem.delay.as_ref(), history) else {
        return Err(SolverError::Invariant(
            "delay equation evaluated without a history buffer".to_string(),
        ));
    };
    let mut ydelay = Vec::with_capacity(delay.ntimelags);
    for (lag, comps) in delay.lagcompmap.iter().enumerate() {
        let t_lag = (delay.arglag)(lag, t, y);
        if !t_lag.is_finite() {
            return Err(SolverError::convergence(
                t,
                format!("delayed argument of lag {} is not finite", lag),
            ));
        }
        if t_lag >= t {
            ydelay.push(DVector::from_iterator(comps.len(), comps.iter().map(|&i| y[i])));
            continue;
        }
        probes.max_lag.set(probes.max_lag.get().max(t - t_lag));
        let values = comps
            .iter()
            .map(|&i| history.evaluate(i, t_lag))
            .collect::<Result<Vec<f64>, SolverError>>()?;
        ydelay.push(DVector::from_vec(values));
    }
    Ok(ydelay)
}

/// The problem in residual form `F(t, y, yd)` with the switches frozen.
/// A failed history lookup is stashed in `probes` and reported as a NaN residual so the
/// kernel rejects the attempt.
fn build_residual<'a>(
    problem: &'a Problem,
    switches: &'a [bool],
    history: Option<&'a HistoryBuffer>,
    probes: &'a Probes,
) -> Box<Residual<'a>> {
    match &problem.equation {
        Equation::Explicit(rhs) => Box::new(move |t: f64, y: &DVector<f64>, yd: &DVector<f64>| {
            probes.nfev.set(probes.nfev.get() + 1);
            yd - rhs(t, y, switches)
        }),
        Equation::Implicit(res) => Box::new(move |t: f64, y: &DVector<f64>, yd: &DVector<f64>| {
            probes.nfev.set(probes.nfev.get() + 1);
            res(t, y, yd, switches)
        }),
        Equation::Delay(rhs) => Box::new(move |t: f64, y: &DVector<f64>, yd: &DVector<f64>| {
            probes.nfev.set(probes.nfev.get() + 1);
            match delayed_values(problem, history, probes, t, y) {
                Ok(ydelay) => yd - rhs(t, y, &ydelay, switches),
                Err(e) => {
                    *probes.history_error.borrow_mut() = Some(e);
                    DVector::from_element(y.len(), f64::NAN)
                }
            }
        }),
    }
}

/// `f(t, y)` of a problem in the form `yd - f = 0`
fn explicit_derivative(residual: &Residual<'_>, t: f64, y: &DVector<f64>) -> DVector<f64> {
    -residual(t, y, &DVector::zeros(y.len()))
}

/// smallest positive lag and largest lag at `(t, y)`
fn current_lags(problem: &Problem, t: f64, y: &DVector<f64>) -> (f64, f64) {
    let Some(delay) = problem.delay.as_ref() else {
        return (f64::INFINITY, 0.0);
    };
    (0..delay.ntimelags)
        .map(|lag| t - (delay.arglag)(lag, t, y))
        .filter(|l| *l > 0.0)
        .fold((f64::INFINITY, 0.0), |(lo, hi), l| (lo.min(l), hi.max(l)))
}

fn update_switches(problem: &Problem, indices: &[usize], switches: &mut Vec<bool>) {
    match &problem.handle_event {
        Some(hook) => hook(indices, switches),
        None => {
            for &i in indices {
                if i < switches.len() {
                    switches[i] = !switches[i];
                }
            }
        }
    }
}

/// pushes every communication point up to `t_end`
fn emit_samples(
    result: &mut RunResult,
    samples: &[f64],
    next: &mut usize,
    segment: &HistorySegment,
    t_end: f64,
    y_end: &DVector<f64>,
    yd_end: &DVector<f64>,
) {
    while *next < samples.len() && samples[*next] <= t_end {
        let ts = samples[*next];
        if ts == t_end {
            result.push(ts, y_end.clone(), yd_end.clone());
        } else {
            result.push(ts, segment.values(ts), segment.derivatives(ts));
        }
        *next += 1;
    }
}

/// `ncp + 1` evenly spaced points, the last one exactly `t_final`
fn communication_points(t0: f64, t_final: f64, ncp: usize) -> Vec<f64> {
    if ncp == 0 {
        return Vec::new();
    }
    (0..=ncp)
        .map(|k| {
            if k == ncp {
                t_final
            } else {
                t0 + (t_final - t0) * (k as f64) / (ncp as f64)
            }
        })
        .collect()
}

pub struct Driver<K: StepKernel = BDFKernel> {
    problem: Problem,
    kernel: K,
    options: SolverOptions,
    statistics: Statistics,
    state: DriverState,
    localizer: EventLocalizer,
    consistency: ConsistencyInitializer,
    switches: Vec<bool>,
    /// initial data of the next run, updated by `make_consistency`
    y0: DVector<f64>,
    yd0: DVector<f64>,
    history: Option<HistoryBuffer>,
    result: RunResult,
}

impl Driver<BDFKernel> {
    /// driver with the default BDF kernel
    pub fn new(problem: Problem) -> Result<Self, SolverError> {
        Driver::with_kernel(problem, BDFKernel::new())
    }
}

impl<K: StepKernel> Driver<K> {
    pub fn with_kernel(problem: Problem, kernel: K) -> Result<Self, SolverError> {
        problem.validate()?;
        let n = problem.n;
        let mut options = SolverOptions::new(n, kernel.order_bounds());
        options.set_option("problem_name", problem.problem_name.as_str())?;
        let y0 = problem.y0.clone();
        let yd0 = problem
            .yd0
            .clone()
            .unwrap_or_else(|| DVector::zeros(n));
        let switches = problem.switches0.clone().unwrap_or_default();
        Ok(Driver {
            problem,
            kernel,
            options,
            statistics: Statistics::new(),
            state: DriverState::Idle,
            localizer: EventLocalizer::new(),
            consistency: ConsistencyInitializer::new(n),
            switches,
            y0,
            yd0,
            history: None,
            result: RunResult::default(),
        })
    }

    pub fn with_localizer(mut self, config: LocalizerConfig) -> Self {
        self.localizer = EventLocalizer::with_config(config);
        self
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SolverOptions {
        &mut self.options
    }

    pub fn set_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<(), SolverError> {
        self.options.set_option(name, value)
    }

    pub fn get_option(&self, name: &str) -> Option<OptionValue> {
        self.options.get_option(name)
    }

    /// result of the last run; partial when the run failed
    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// counter name -> value
    pub fn stats(&self) -> HashMap<String, usize> {
        self.statistics.as_map()
    }

    /// `(event time, fired indicator indices)` of the last run
    pub fn disc_info(&self) -> Vec<(f64, Vec<usize>)> {
        self.result
            .events
            .iter()
            .map(|e| (e.t_event, e.indices.clone()))
            .collect()
    }

    /// history of the last delay run
    pub fn past(&self) -> Option<&HistoryBuffer> {
        self.history.as_ref()
    }

    pub fn switches(&self) -> &[bool] {
        &self.switches
    }

    fn problem_name(&self) -> String {
        self.options
            .problem_name()
            .unwrap_or(&self.problem.problem_name)
            .to_string()
    }

    /// back to `Idle` with the problem's initial data
    pub fn reset(&mut self) {
        self.state = DriverState::Idle;
        self.y0 = self.problem.y0.clone();
        self.yd0 = self
            .problem
            .yd0
            .clone()
            .unwrap_or_else(|| DVector::zeros(self.problem.n));
        self.switches = self.problem.switches0.clone().unwrap_or_default();
        self.history = None;
        self.result = RunResult::default();
        self.statistics.reset();
        self.kernel.reset_counters();
        debug!("driver for {} reset", self.problem.problem_name);
    }

    fn initial_switches(&self) -> Result<Vec<bool>, SolverError> {
        match (self.options.switches0(), self.problem.switches0.as_ref()) {
            (Some(option), Some(declared)) if option.len() != declared.len() => {
                Err(SolverError::configuration(
                    "switches0",
                    format!(
                        "expected {} switches, got {}",
                        declared.len(),
                        option.len()
                    ),
                ))
            }
            (Some(option), _) => Ok(option.to_vec()),
            (None, Some(declared)) => Ok(declared.clone()),
            (None, None) => Ok(Vec::new()),
        }
    }

    /// Consistent initial values at `t0` from the current initial data. They replace the
    /// initial data of the following runs.
    pub fn make_consistency(
        &mut self,
        mode: InitMode,
    ) -> Result<(DVector<f64>, DVector<f64>), SolverError> {
        if !self.problem.is_implicit() {
            return Err(SolverError::configuration(
                "init_mode",
                "consistent initial values only apply to implicit problems",
            ));
        }
        let switches = self.initial_switches()?;
        let settings = self.options.kernel_settings(false);
        let probes = Probes::default();
        let (y, yd) = {
            let residual = build_residual(&self.problem, &switches, None, &probes);
            self.consistency.compute(
                &mut self.kernel,
                mode,
                self.problem.t0,
                &self.y0,
                &self.yd0,
                &settings,
                &*residual,
            )?
        };
        self.statistics.count_consistency_call();
        self.statistics.add_function_evaluations(probes.nfev.take());
        self.statistics.sync_kernel_counters(
            self.kernel.jacobian_evaluations(),
            self.kernel.lu_factorizations(),
        );
        self.y0 = y.clone();
        self.yd0 = yd.clone();
        Ok((y, yd))
    }

    /// Integrates from `t0` to `t_final`. `ncp > 0` gives `ncp + 1` evenly spaced samples,
    /// `ncp == 0` records every accepted step.
    pub fn simulate(&mut self, t_final: f64, ncp: usize) -> Result<RunResult, SolverError> {
        let problem_name = self.problem_name();
        let log_file = self.options.log_file().map(|f| {
            if f.is_empty() {
                log_file_name(&problem_name)
            } else {
                f.to_string()
            }
        });
        init_logger(self.options.verbosity().level_filter(), log_file.as_deref());
        info!(
            "simulating {} ({} problem, n = {}) on [{}, {}] with the {} kernel",
            problem_name,
            self.problem.equation.kind(),
            self.problem.n,
            self.problem.t0,
            t_final,
            self.kernel.name()
        );

        let outcome = self.run(t_final, ncp);
        self.result.statistics = self.statistics.clone();
        self.result.switches = self.switches.clone();
        match outcome {
            Ok(()) => {
                self.state = DriverState::Terminated;
                self.result.completed = true;
                info!("{} finished at t = {}", problem_name, t_final);
                self.statistics.log_table(&problem_name);
                Ok(self.result.clone())
            }
            Err(e) => {
                self.state = DriverState::Failed;
                error!(
                    "{} stopped after {} samples: {}",
                    problem_name,
                    self.result.len(),
                    e
                );
                self.statistics.log_table(&problem_name);
                Err(e)
            }
        }
    }

    fn run(&mut self, t_final: f64, ncp: usize) -> Result<(), SolverError> {
        self.state = DriverState::Validating;
        self.statistics.reset();
        self.kernel.reset_counters();
        self.result = RunResult::default();

        let t0 = self.problem.t0;
        if !t_final.is_finite() || t_final <= t0 {
            return Err(SolverError::configuration(
                "t_final",
                format!("final time {} must be greater than the initial time {}", t_final, t0),
            ));
        }
        self.problem.validate()?;
        self.switches = self.initial_switches()?;
        let n = self.problem.n;
        let explicit = !self.problem.is_implicit();
        let mut settings = self.options.kernel_settings(explicit);
        let maxsteps = self.options.maxsteps();
        let probes = Probes::default();

        self.history = self.problem.delay.as_ref().map(|delay| {
            HistoryBuffer::new(
                t0,
                self.y0.clone(),
                DVector::zeros(n),
                delay.phi.clone(),
                Some(delay.ipast.clone()),
            )
        });

        let mut y = self.y0.clone();
        let mut yd = self.yd0.clone();
        if explicit {
            let residual = build_residual(
                &self.problem,
                &self.switches,
                self.history.as_ref(),
                &probes,
            );
            yd = explicit_derivative(&*residual, t0, &y);
        } else if let Some(mode) = self.options.init_mode() {
            self.state = DriverState::Initializing;
            let residual = build_residual(&self.problem, &self.switches, None, &probes);
            let (y_c, yd_c) = self.consistency.compute(
                &mut self.kernel,
                mode,
                t0,
                &y,
                &yd,
                &settings,
                &*residual,
            )?;
            self.statistics.count_consistency_call();
            y = y_c;
            yd = yd_c;
        }
        if let Some(err) = probes.history_error.take() {
            return Err(err);
        }
        if let Some(history) = self.history.as_mut() {
            history.set_initial_derivative(yd.clone());
        }

        let user_max_step = settings.max_step;
        let mut max_lag: f64 = 0.0;
        if self.problem.is_delay() {
            let (min_lag, largest) = current_lags(&self.problem, t0, &y);
            settings.max_step = user_max_step.min(min_lag);
            max_lag = largest;
        }
        {
            let residual = build_residual(
                &self.problem,
                &self.switches,
                self.history.as_ref(),
                &probes,
            );
            self.kernel
                .initialize(t0, &y, &yd, t_final, &settings, &*residual)?;
        }

        let samples = communication_points(t0, t_final, ncp);
        let mut next_sample = 1;
        self.result.push(t0, y.clone(), yd.clone());

        let mut g_prev = self
            .problem
            .event_fcn
            .as_ref()
            .map(|g| g(t0, &y, &yd, &self.switches));
        if g_prev.is_some() {
            self.statistics.add_event_function_evaluations(1);
        }

        let mut t = t0;
        let mut consecutive_rejections = 0;
        self.state = DriverState::Stepping;
        while t < t_final {
            if self.statistics.steps() >= maxsteps {
                warn!("maximum number of steps {} reached at t = {}", maxsteps, t);
                return Err(SolverError::MaxStepsExceeded {
                    max_steps: maxsteps,
                    t,
                });
            }
            let breakpoint = self
                .problem
                .breakpoints_after(t)
                .first()
                .copied()
                .filter(|&b| b < t_final);
            self.kernel.set_stop_time(breakpoint.unwrap_or(t_final));
            if self.problem.is_delay() {
                let (min_lag, largest) = current_lags(&self.problem, t, &y);
                max_lag = max_lag.max(largest);
                self.kernel.set_max_step(user_max_step.min(min_lag));
            }

            let outcome = {
                let residual = build_residual(
                    &self.problem,
                    &self.switches,
                    self.history.as_ref(),
                    &probes,
                );
                self.kernel.attempt_step(&*residual)
            };
            self.statistics.add_function_evaluations(probes.nfev.take());
            self.statistics.sync_kernel_counters(
                self.kernel.jacobian_evaluations(),
                self.kernel.lu_factorizations(),
            );
            let step = match outcome {
                Err(e) => return Err(probes.history_error.take().unwrap_or(e)),
                Ok(StepOutcome::Rejected { h_next, reason }) => {
                    self.statistics.count_rejection();
                    consecutive_rejections += 1;
                    debug!(
                        "step rejected at t = {} ({:?}), next h = {:e}",
                        t, reason, h_next
                    );
                    if consecutive_rejections > MAX_CONSECUTIVE_REJECTIONS {
                        return Err(probes.history_error.take().unwrap_or_else(|| {
                            SolverError::convergence(
                                t,
                                format!("{} consecutive rejected steps", consecutive_rejections),
                            )
                        }));
                    }
                    continue;
                }
                Ok(StepOutcome::Accepted(step)) => step,
            };
            if step.t_old != t {
                return Err(SolverError::Invariant(format!(
                    "{} kernel stepped from {} but the driver is at {}",
                    self.kernel.name(),
                    step.t_old,
                    t
                )));
            }
            consecutive_rejections = 0;
            probes.history_error.take();
            self.statistics.count_step();
            max_lag = max_lag.max(probes.max_lag.get());
            debug!(
                "step {} accepted: t = {}, h = {:e}, order = {}",
                self.statistics.steps(),
                step.t,
                step.h,
                step.order
            );

            let mut segment = HistorySegment::hermite(t, &y, &yd, step.t, &step.y, &step.yd);
            let mut t_new = step.t;
            let mut y_new = step.y;
            let mut yd_new = step.yd;
            let restart = breakpoint.is_some_and(|b| t_new >= b);
            let mut event: Option<EventReport> = None;

            if let (Some(g), Some(g_old)) = (self.problem.event_fcn.as_ref(), g_prev.take()) {
                let g_new = g(t_new, &y_new, &yd_new, &self.switches);
                self.statistics.add_event_function_evaluations(1);
                let changed = detect(&g_old, &g_new);
                if changed.is_empty() {
                    g_prev = Some(g_new);
                } else {
                    self.state = DriverState::EventHandling;
                    let evaluations = Cell::new(0);
                    let switches = &self.switches;
                    let report = self.localizer.locate_earliest(&changed, t, t_new, |tau| {
                        evaluations.set(evaluations.get() + 1);
                        g(tau, &segment.values(tau), &segment.derivatives(tau), switches)
                    });
                    self.statistics
                        .add_event_function_evaluations(evaluations.get());
                    if report.boundary_detected {
                        warn!(
                            "indicators {:?} changed sign without a bracketed root, event at t = {}",
                            report.indices, report.t_event
                        );
                    }
                    if report.t_event < t_new {
                        segment = segment.truncated(report.t_event);
                        t_new = report.t_event;
                        y_new = segment.values(t_new);
                        yd_new = segment.derivatives(t_new);
                    }
                    event = Some(report);
                }
            }

            if let Some(history) = self.history.as_mut() {
                history.record(segment.clone())?;
            }
            if ncp > 0 {
                emit_samples(
                    &mut self.result,
                    &samples,
                    &mut next_sample,
                    &segment,
                    t_new,
                    &y_new,
                    &yd_new,
                );
            } else {
                self.result.push(t_new, y_new.clone(), yd_new.clone());
                self.result.step_detail.push(StepDetail {
                    t: t_new,
                    h: t_new - t,
                    order: step.order,
                });
            }
            let t_step_start = t;
            t = t_new;
            y = y_new;
            yd = yd_new;

            if let Some(report) = event {
                self.statistics.count_event();
                update_switches(&self.problem, &report.indices, &mut self.switches);
                info!(
                    "event at t = {}: indicators {:?}, switches now {:?}",
                    report.t_event, report.indices, self.switches
                );
                self.result.events.push(report);
                if t_final - t <= self.localizer.tolerance(t_step_start, t_final) {
                    // event at the final time
                    t = t_final;
                    break;
                }
                let residual = build_residual(
                    &self.problem,
                    &self.switches,
                    self.history.as_ref(),
                    &probes,
                );
                if explicit {
                    yd = explicit_derivative(&*residual, t, &y);
                } else if let Some(mode) = self.options.init_mode() {
                    let (y_c, yd_c) = self.consistency.compute(
                        &mut self.kernel,
                        mode,
                        t,
                        &y,
                        &yd,
                        &settings,
                        &*residual,
                    )?;
                    self.statistics.count_consistency_call();
                    y = y_c;
                    yd = yd_c;
                }
                self.kernel.restart(t, &y, &yd, &*residual)?;
                if let Some(g) = self.problem.event_fcn.as_ref() {
                    g_prev = Some(g(t, &y, &yd, &self.switches));
                    self.statistics.add_event_function_evaluations(1);
                }
                self.state = DriverState::Stepping;
            } else if restart {
                debug!("breakpoint reached at t = {}", t);
                let residual = build_residual(
                    &self.problem,
                    &self.switches,
                    self.history.as_ref(),
                    &probes,
                );
                if explicit {
                    yd = explicit_derivative(&*residual, t, &y);
                }
                self.kernel.restart(t, &y, &yd, &*residual)?;
            }
            self.statistics.add_function_evaluations(probes.nfev.take());
            if let Some(err) = probes.history_error.take() {
                return Err(err);
            }

            if let Some(history) = self.history.as_mut() {
                history.prune(t, max_lag);
            }
        }

        // samples left over by an event at the final time
        while ncp > 0 && next_sample < samples.len() {
            self.result.push(samples[next_sample], y.clone(), yd.clone());
            next_sample += 1;
        }
        Ok(())
    }
}
