//! Problem descriptor: the equation in one of three forms plus optional capabilities
//! (events, switches, breakpoint grid, delays).

use nalgebra::DVector;
use std::fmt;
use std::rc::Rc;

use crate::numerical::Driver::errors::SolverError;
use crate::numerical::Driver::history::HistoryFn;

/// `f(t, y, switches)` of `y' = f`
pub type ExplicitRhs = Box<dyn Fn(f64, &DVector<f64>, &[bool]) -> DVector<f64>>;
/// `F(t, y, y', switches)` of `F = 0`
pub type ImplicitResidual = Box<dyn Fn(f64, &DVector<f64>, &DVector<f64>, &[bool]) -> DVector<f64>>;
/// `f(t, y, ydelay, switches)`, `ydelay[lag][k]` is the delayed value of component
/// `lagcompmap[lag][k]`
pub type DelayRhs = Box<dyn Fn(f64, &DVector<f64>, &[DVector<f64>], &[bool]) -> DVector<f64>>;
/// event indicators `g(t, y, y', switches)`
pub type EventFn = Box<dyn Fn(f64, &DVector<f64>, &DVector<f64>, &[bool]) -> DVector<f64>>;
/// switch update called with the fired indicator indices
pub type SwitchHook = Box<dyn Fn(&[usize], &mut Vec<bool>)>;
/// delayed argument `alpha(lag, t, y)`
pub type LagFn = Box<dyn Fn(usize, f64, &DVector<f64>) -> f64>;

pub enum Equation {
    Explicit(ExplicitRhs),
    Implicit(ImplicitResidual),
    Delay(DelayRhs),
}

impl Equation {
    pub fn kind(&self) -> &'static str {
        match self {
            Equation::Explicit(_) => "explicit",
            Equation::Implicit(_) => "implicit",
            Equation::Delay(_) => "delay",
        }
    }
}

/// delay data of a retarded problem
pub struct DelaySpec {
    pub ntimelags: usize,
    /// lag index -> components read through that lag
    pub lagcompmap: Vec<Vec<usize>>,
    pub nrdens: usize,
    /// dense slot -> component index
    pub ipast: Vec<usize>,
    pub arglag: LagFn,
    pub phi: HistoryFn,
}

impl DelaySpec {
    /// every component is dense and read through every lag
    pub fn new<L, P>(n: usize, ntimelags: usize, arglag: L, phi: P) -> Self
    where
        L: Fn(usize, f64, &DVector<f64>) -> f64 + 'static,
        P: Fn(usize, f64) -> f64 + 'static,
    {
        DelaySpec {
            ntimelags,
            lagcompmap: vec![(0..n).collect(); ntimelags],
            nrdens: n,
            ipast: (0..n).collect(),
            arglag: Box::new(arglag),
            phi: Rc::new(phi),
        }
    }

    pub fn with_lagcompmap(mut self, lagcompmap: Vec<Vec<usize>>) -> Self {
        self.lagcompmap = lagcompmap;
        self
    }

    pub fn with_dense_components(mut self, ipast: Vec<usize>) -> Self {
        self.nrdens = ipast.len();
        self.ipast = ipast;
        self
    }
}

pub struct Problem {
    pub problem_name: String,
    pub n: usize,
    pub t0: f64,
    pub y0: DVector<f64>,
    /// required for implicit problems, computed from the right-hand side otherwise
    pub yd0: Option<DVector<f64>>,
    pub equation: Equation,
    pub event_fcn: Option<EventFn>,
    pub handle_event: Option<SwitchHook>,
    pub switches0: Option<Vec<bool>>,
    /// breakpoints the steps must not cross
    pub grid: Option<Vec<f64>>,
    pub delay: Option<DelaySpec>,
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("problem_name", &self.problem_name)
            .field("kind", &self.equation.kind())
            .field("n", &self.n)
            .field("t0", &self.t0)
            .field("y0", &self.y0)
            .field("yd0", &self.yd0)
            .field("events", &self.event_fcn.is_some())
            .field("switches0", &self.switches0)
            .field("grid", &self.grid)
            .field("ntimelags", &self.delay.as_ref().map(|d| d.ntimelags))
            .finish()
    }
}

impl Problem {
    fn with_equation(name: &str, t0: f64, y0: DVector<f64>, equation: Equation) -> Self {
        Problem {
            problem_name: name.to_string(),
            n: y0.len(),
            t0,
            y0,
            yd0: None,
            equation,
            event_fcn: None,
            handle_event: None,
            switches0: None,
            grid: None,
            delay: None,
        }
    }

    /// `y' = f(t, y, switches)`
    pub fn explicit<F>(name: &str, t0: f64, y0: DVector<f64>, rhs: F) -> Self
    where
        F: Fn(f64, &DVector<f64>, &[bool]) -> DVector<f64> + 'static,
    {
        Self::with_equation(name, t0, y0, Equation::Explicit(Box::new(rhs)))
    }

    /// `F(t, y, y', switches) = 0`
    pub fn implicit<F>(name: &str, t0: f64, y0: DVector<f64>, yd0: DVector<f64>, res: F) -> Self
    where
        F: Fn(f64, &DVector<f64>, &DVector<f64>, &[bool]) -> DVector<f64> + 'static,
    {
        let mut problem = Self::with_equation(name, t0, y0, Equation::Implicit(Box::new(res)));
        problem.yd0 = Some(yd0);
        problem
    }

    /// `y' = f(t, y, ydelay, switches)`
    pub fn delay<F>(name: &str, t0: f64, y0: DVector<f64>, rhs: F, delay: DelaySpec) -> Self
    where
        F: Fn(f64, &DVector<f64>, &[DVector<f64>], &[bool]) -> DVector<f64> + 'static,
    {
        let mut problem = Self::with_equation(name, t0, y0, Equation::Delay(Box::new(rhs)));
        problem.delay = Some(delay);
        problem
    }

    pub fn with_events<G>(mut self, event_fcn: G) -> Self
    where
        G: Fn(f64, &DVector<f64>, &DVector<f64>, &[bool]) -> DVector<f64> + 'static,
    {
        self.event_fcn = Some(Box::new(event_fcn));
        self
    }

    pub fn with_switches(mut self, switches0: Vec<bool>) -> Self {
        self.switches0 = Some(switches0);
        self
    }

    pub fn with_switch_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&[usize], &mut Vec<bool>) + 'static,
    {
        self.handle_event = Some(Box::new(hook));
        self
    }

    pub fn with_grid(mut self, grid: Vec<f64>) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self.equation, Equation::Implicit(_))
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self.equation, Equation::Explicit(_))
    }

    pub fn is_delay(&self) -> bool {
        matches!(self.equation, Equation::Delay(_))
    }

    pub fn has_events(&self) -> bool {
        self.event_fcn.is_some()
    }

    /// sorted breakpoints strictly after `t`
    pub fn breakpoints_after(&self, t: f64) -> Vec<f64> {
        let mut points: Vec<f64> = self
            .grid
            .iter()
            .flatten()
            .cloned()
            .filter(|&p| p > t)
            .collect();
        points.sort_by(|a, b| a.total_cmp(b));
        points.dedup();
        points
    }

    /// checks sizes and indices of the descriptor
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.y0.len() != self.n {
            return Err(SolverError::dimension("y0", self.n, self.y0.len()));
        }
        if self.n == 0 {
            return Err(SolverError::dimension("problem", 1, 0));
        }
        if let Some(yd0) = &self.yd0 {
            if yd0.len() != self.n {
                return Err(SolverError::dimension("yd0", self.n, yd0.len()));
            }
        }
        if self.is_implicit() && self.yd0.is_none() {
            return Err(SolverError::configuration(
                "yd0",
                "implicit problems need an initial derivative",
            ));
        }
        if self.y0.iter().any(|x| !x.is_finite()) {
            return Err(SolverError::configuration(
                "y0",
                "all components of the initial state must be finite",
            ));
        }
        if let Some(grid) = &self.grid {
            if grid.iter().any(|x| !x.is_finite()) {
                return Err(SolverError::configuration("grid", "breakpoints must be finite"));
            }
        }
        match (&self.equation, &self.delay) {
            (Equation::Delay(_), None) => {
                return Err(SolverError::configuration(
                    "delay",
                    "delay problems need lag data and a history function",
                ));
            }
            (_, Some(delay)) => self.validate_delay(delay)?,
            _ => {}
        }
        Ok(())
    }

    fn validate_delay(&self, delay: &DelaySpec) -> Result<(), SolverError> {
        if delay.lagcompmap.len() != delay.ntimelags {
            return Err(SolverError::dimension(
                "lagcompmap",
                delay.ntimelags,
                delay.lagcompmap.len(),
            ));
        }
        if delay.ipast.len() != delay.nrdens {
            return Err(SolverError::dimension("ipast", delay.nrdens, delay.ipast.len()));
        }
        let out_of_range = delay
            .lagcompmap
            .iter()
            .flatten()
            .chain(delay.ipast.iter())
            .find(|&&i| i >= self.n);
        if let Some(&i) = out_of_range {
            return Err(SolverError::Dimension {
                what: "component index in lagcompmap/ipast".to_string(),
                expected: self.n,
                actual: i,
            });
        }
        for (lag, comps) in delay.lagcompmap.iter().enumerate() {
            if let Some(c) = comps.iter().find(|c| !delay.ipast.contains(c)) {
                return Err(SolverError::configuration(
                    "ipast",
                    format!("component {} read through lag {} has no dense output", c, lag),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dde(delay: DelaySpec) -> Problem {
        Problem::delay(
            "dde",
            0.0,
            DVector::from_vec(vec![0.0, 1.0]),
            |_t, y, yd, _sw| -y + &yd[0],
            delay,
        )
    }

    #[test]
    fn capabilities() {
        let p = Problem::explicit("decay", 0.0, DVector::from_vec(vec![1.0]), |_t, y, _sw| -y)
            .with_events(|t, _y, _yd, _sw| DVector::from_vec(vec![t - 1.0]))
            .with_switches(vec![false])
            .with_grid(vec![2.0, 1.0, 1.0, -1.0]);
        assert!(p.is_explicit() && p.has_events() && !p.is_delay());
        assert_eq!(p.breakpoints_after(0.0), vec![1.0, 2.0]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn delay_indices_are_checked() {
        let spec = DelaySpec::new(2, 1, |_lag, t, _y| t - 1.0, |_i, t| t.sin());
        assert!(dde(spec).validate().is_ok());

        let spec = DelaySpec::new(2, 1, |_lag, t, _y| t - 1.0, |_i, t| t.sin())
            .with_lagcompmap(vec![vec![0, 2]]);
        assert!(matches!(dde(spec).validate(), Err(SolverError::Dimension { .. })));

        let spec = DelaySpec::new(2, 2, |_lag, t, _y| t - 1.0, |_i, t| t.sin())
            .with_lagcompmap(vec![vec![0]]);
        assert!(matches!(dde(spec).validate(), Err(SolverError::Dimension { .. })));

        let spec = DelaySpec::new(2, 1, |_lag, t, _y| t - 1.0, |_i, t| t.sin())
            .with_dense_components(vec![1]);
        assert!(matches!(dde(spec).validate(), Err(SolverError::Configuration { .. })));
    }

    #[test]
    fn implicit_needs_matching_derivative() {
        let p = Problem::implicit(
            "dae",
            0.0,
            DVector::from_vec(vec![1.0, 0.0]),
            DVector::from_vec(vec![1.0]),
            |_t, y, _yd, _sw| y.clone(),
        );
        assert!(matches!(p.validate(), Err(SolverError::Dimension { .. })));
    }
}
