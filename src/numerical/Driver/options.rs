//! Solver options and their validation.
//!
//! Options can be set through typed setters, through `set_option(name, value)` with a dynamic
//! [`OptionValue`], or loaded from a TOML table. Every path goes through the same validators,
//! so a bad value is reported as `SolverError::Configuration` before the run starts.

use log::LevelFilter;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::numerical::BDF::common::NumberOrVec;
use crate::numerical::Driver::consistency::InitMode;
use crate::numerical::Driver::errors::SolverError;
use crate::numerical::Driver::kernel::KernelSettings;

/// names accepted by `SolverOptions::set_option`
pub const OPTION_NAMES: [&str; 15] = [
    "rtol",
    "atol",
    "maxord",
    "maxsteps",
    "suppress_alg",
    "algvar",
    "switches0",
    "lsoff",
    "tout1",
    "maxh",
    "inith",
    "verbosity",
    "init_mode",
    "log_file",
    "problem_name",
];

/// dynamically typed option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    FloatVec(Vec<f64>),
    IntVec(Vec<i64>),
    BoolVec(Vec<bool>),
    /// heterogeneous sequence, accepted by no option
    List(Vec<OptionValue>),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Float(_) => "float",
            OptionValue::Int(_) => "integer",
            OptionValue::Bool(_) => "boolean",
            OptionValue::Text(_) => "string",
            OptionValue::FloatVec(_) => "float vector",
            OptionValue::IntVec(_) => "integer vector",
            OptionValue::BoolVec(_) => "boolean vector",
            OptionValue::List(_) => "mixed sequence",
        }
    }

    /// converts one TOML value; tables and datetimes are not option values
    pub fn from_toml(name: &str, value: &toml::Value) -> Result<Self, SolverError> {
        let converted = match value {
            toml::Value::Float(x) => OptionValue::Float(*x),
            toml::Value::Integer(i) => OptionValue::Int(*i),
            toml::Value::Boolean(b) => OptionValue::Bool(*b),
            toml::Value::String(s) => OptionValue::Text(s.clone()),
            toml::Value::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| OptionValue::from_toml(name, item))
                    .collect::<Result<Vec<_>, _>>()?;
                OptionValue::from_items(items)
            }
            other => {
                return Err(SolverError::configuration(
                    name,
                    format!("unsupported TOML value of type {}", other.type_str()),
                ));
            }
        };
        Ok(converted)
    }

    /// homogeneous sequences become typed vectors, anything else a `List`
    fn from_items(items: Vec<OptionValue>) -> Self {
        if items.iter().all(|v| matches!(v, OptionValue::Float(_))) && !items.is_empty() {
            OptionValue::FloatVec(
                items
                    .iter()
                    .filter_map(|v| if let OptionValue::Float(x) = v { Some(*x) } else { None })
                    .collect(),
            )
        } else if items.iter().all(|v| matches!(v, OptionValue::Int(_))) && !items.is_empty() {
            OptionValue::IntVec(
                items
                    .iter()
                    .filter_map(|v| if let OptionValue::Int(x) = v { Some(*x) } else { None })
                    .collect(),
            )
        } else if items.iter().all(|v| matches!(v, OptionValue::Bool(_))) && !items.is_empty() {
            OptionValue::BoolVec(
                items
                    .iter()
                    .filter_map(|v| if let OptionValue::Bool(x) = v { Some(*x) } else { None })
                    .collect(),
            )
        } else {
            OptionValue::List(items)
        }
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}
impl From<i64> for OptionValue {
    fn from(x: i64) -> Self {
        OptionValue::Int(x)
    }
}
impl From<i32> for OptionValue {
    fn from(x: i32) -> Self {
        OptionValue::Int(x as i64)
    }
}
impl From<bool> for OptionValue {
    fn from(x: bool) -> Self {
        OptionValue::Bool(x)
    }
}
impl From<&str> for OptionValue {
    fn from(x: &str) -> Self {
        OptionValue::Text(x.to_string())
    }
}
impl From<String> for OptionValue {
    fn from(x: String) -> Self {
        OptionValue::Text(x)
    }
}
impl From<Vec<f64>> for OptionValue {
    fn from(x: Vec<f64>) -> Self {
        OptionValue::FloatVec(x)
    }
}
impl From<Vec<i64>> for OptionValue {
    fn from(x: Vec<i64>) -> Self {
        OptionValue::IntVec(x)
    }
}
impl From<Vec<bool>> for OptionValue {
    fn from(x: Vec<bool>) -> Self {
        OptionValue::BoolVec(x)
    }
}

/// amount of log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Whisper,
    Normal,
    Loud,
    Scream,
}

impl Verbosity {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Whisper => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Loud => LevelFilter::Info,
            Verbosity::Scream => LevelFilter::Debug,
        }
    }

    /// numeric levels 50/40/30/20/10
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            50 => Some(Verbosity::Quiet),
            40 => Some(Verbosity::Whisper),
            30 => Some(Verbosity::Normal),
            20 => Some(Verbosity::Loud),
            10 => Some(Verbosity::Scream),
            _ => None,
        }
    }
}

fn wrong_type(option: &str, expected: &str, value: &OptionValue) -> SolverError {
    SolverError::configuration(
        option,
        format!("expected {}, got {}", expected, value.type_name()),
    )
}

pub fn validate_rtol(value: &OptionValue) -> Result<f64, SolverError> {
    match value {
        OptionValue::Float(x) if x.is_finite() && *x > 0.0 => Ok(*x),
        OptionValue::Float(x) => Err(SolverError::configuration(
            "rtol",
            format!("must be a positive number, got {}", x),
        )),
        other => Err(wrong_type("rtol", "a positive float", other)),
    }
}

pub fn validate_atol(value: &OptionValue, n: usize) -> Result<NumberOrVec, SolverError> {
    match value {
        OptionValue::Float(x) if x.is_finite() && *x > 0.0 => Ok(NumberOrVec::Number(*x)),
        OptionValue::Float(x) => Err(SolverError::configuration(
            "atol",
            format!("must be positive, got {}", x),
        )),
        OptionValue::FloatVec(v) => {
            if v.len() != n {
                return Err(SolverError::configuration(
                    "atol",
                    format!("vector must have length {}, got {}", n, v.len()),
                ));
            }
            if let Some(bad) = v.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
                return Err(SolverError::configuration(
                    "atol",
                    format!("all entries must be positive, got {}", bad),
                ));
            }
            Ok(NumberOrVec::Vec(v.clone()))
        }
        other => Err(wrong_type("atol", "a positive float or float vector", other)),
    }
}

/// validates a tolerance pair for a problem of dimension `n`
pub fn validate(
    rtol: &OptionValue,
    atol: &OptionValue,
    n: usize,
) -> Result<(f64, NumberOrVec), SolverError> {
    Ok((validate_rtol(rtol)?, validate_atol(atol, n)?))
}

/// clamps an order request into the kernel's range
pub fn clamp_order(requested: i64, bounds: (usize, usize)) -> usize {
    let (min_order, max_order) = bounds;
    requested.clamp(min_order as i64, max_order as i64) as usize
}

pub fn validate_order(value: &OptionValue, bounds: (usize, usize)) -> Result<usize, SolverError> {
    match value {
        OptionValue::Int(requested) => Ok(clamp_order(*requested, bounds)),
        other => Err(wrong_type("maxord", "an integer", other)),
    }
}

/// booleans only; `expected_len` is checked when the problem already has switches
pub fn validate_switches(
    value: &OptionValue,
    expected_len: Option<usize>,
) -> Result<Vec<bool>, SolverError> {
    let switches = match value {
        OptionValue::BoolVec(v) => v.clone(),
        OptionValue::Bool(b) => vec![*b],
        other => return Err(wrong_type("switches0", "a sequence of booleans", other)),
    };
    if let Some(len) = expected_len {
        if switches.len() != len {
            return Err(SolverError::configuration(
                "switches0",
                format!("expected {} switches, got {}", len, switches.len()),
            ));
        }
    }
    Ok(switches)
}

fn validate_bool(option: &str, value: &OptionValue) -> Result<bool, SolverError> {
    match value {
        OptionValue::Bool(b) => Ok(*b),
        other => Err(wrong_type(option, "a boolean", other)),
    }
}

/// floats, with integers widened
fn validate_number(option: &str, value: &OptionValue) -> Result<f64, SolverError> {
    match value {
        OptionValue::Float(x) if x.is_finite() => Ok(*x),
        OptionValue::Int(i) => Ok(*i as f64),
        other => Err(wrong_type(option, "a finite number", other)),
    }
}

fn validate_algvar(value: &OptionValue, n: usize) -> Result<Vec<f64>, SolverError> {
    let algvar: Vec<f64> = match value {
        OptionValue::FloatVec(v) => v.clone(),
        OptionValue::IntVec(v) => v.iter().map(|&i| i as f64).collect(),
        other => return Err(wrong_type("algvar", "a vector of 0/1 entries", other)),
    };
    if algvar.len() != n {
        return Err(SolverError::configuration(
            "algvar",
            format!("vector must have length {}, got {}", n, algvar.len()),
        ));
    }
    if let Some(bad) = algvar.iter().find(|x| **x != 0.0 && **x != 1.0) {
        return Err(SolverError::configuration(
            "algvar",
            format!("entries must be 0 or 1, got {}", bad),
        ));
    }
    Ok(algvar)
}

fn validate_maxsteps(value: &OptionValue) -> Result<usize, SolverError> {
    match value {
        OptionValue::Int(i) if *i > 0 => Ok(*i as usize),
        OptionValue::Int(i) => Err(SolverError::configuration(
            "maxsteps",
            format!("must be positive, got {}", i),
        )),
        other => Err(wrong_type("maxsteps", "a positive integer", other)),
    }
}

fn validate_maxh(value: &OptionValue) -> Result<f64, SolverError> {
    let maxh = validate_number("maxh", value)?;
    if maxh < 0.0 {
        return Err(SolverError::configuration(
            "maxh",
            format!("must be non-negative, got {}", maxh),
        ));
    }
    Ok(maxh)
}

fn validate_inith(value: &OptionValue) -> Result<f64, SolverError> {
    let inith = validate_number("inith", value)?;
    if inith <= 0.0 {
        return Err(SolverError::configuration(
            "inith",
            format!("must be positive, got {}", inith),
        ));
    }
    Ok(inith)
}

fn validate_verbosity(value: &OptionValue) -> Result<Verbosity, SolverError> {
    match value {
        OptionValue::Text(s) => Verbosity::from_str(&s.to_lowercase()).map_err(|_| {
            SolverError::configuration(
                "verbosity",
                format!("expected quiet/whisper/normal/loud/scream, got '{}'", s),
            )
        }),
        OptionValue::Int(level) => Verbosity::from_level(*level).ok_or_else(|| {
            SolverError::configuration(
                "verbosity",
                format!("expected one of 10, 20, 30, 40, 50, got {}", level),
            )
        }),
        other => Err(wrong_type("verbosity", "a verbosity name", other)),
    }
}

fn validate_init_mode(value: &OptionValue) -> Result<Option<InitMode>, SolverError> {
    match value {
        OptionValue::Text(s) if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("off") => {
            Ok(None)
        }
        OptionValue::Text(s) => InitMode::from_str(s).map(Some).map_err(|_| {
            SolverError::configuration("init_mode", format!("unknown initialization mode '{}'", s))
        }),
        OptionValue::Bool(false) => Ok(None),
        other => Err(wrong_type("init_mode", "an initialization mode name", other)),
    }
}

fn validate_text(option: &str, value: &OptionValue) -> Result<String, SolverError> {
    match value {
        OptionValue::Text(s) => Ok(s.clone()),
        other => Err(wrong_type(option, "a string", other)),
    }
}

/// Validated configuration of one driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    n: usize,
    order_bounds: (usize, usize),
    rtol: f64,
    atol: NumberOrVec,
    maxord: usize,
    maxsteps: usize,
    suppress_alg: bool,
    algvar: Vec<f64>,
    switches0: Option<Vec<bool>>,
    lsoff: bool,
    tout1: f64,
    maxh: f64,
    inith: Option<f64>,
    verbosity: Verbosity,
    init_mode: Option<InitMode>,
    log_file: Option<String>,
    problem_name: Option<String>,
}

impl SolverOptions {
    /// defaults for a problem of dimension `n` and a kernel with the given order range
    pub fn new(n: usize, order_bounds: (usize, usize)) -> Self {
        SolverOptions {
            n,
            order_bounds,
            rtol: 1e-6,
            atol: NumberOrVec::Number(1e-6),
            maxord: order_bounds.1,
            maxsteps: 10000,
            suppress_alg: false,
            algvar: vec![1.0; n],
            switches0: None,
            lsoff: false,
            tout1: 0.001,
            maxh: 0.0,
            inith: None,
            verbosity: Verbosity::Normal,
            init_mode: Some(InitMode::YaYdpInit),
            log_file: None,
            problem_name: None,
        }
    }

    /// options from TOML text such as `rtol = 1e-8` / `atol = [1e-6, 1e-8]`
    pub fn from_toml_str(
        text: &str,
        n: usize,
        order_bounds: (usize, usize),
    ) -> Result<Self, SolverError> {
        let mut options = SolverOptions::new(n, order_bounds);
        options.load_toml_str(text)?;
        Ok(options)
    }

    pub fn load_toml_str(&mut self, text: &str) -> Result<(), SolverError> {
        let table = text
            .parse::<toml::Table>()
            .map_err(|e| SolverError::configuration("toml", e.to_string()))?;
        for (name, value) in table.iter() {
            let value = OptionValue::from_toml(name, value)?;
            self.set_option(name, value)?;
        }
        Ok(())
    }

    pub fn set_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<(), SolverError> {
        let value = value.into();
        match name {
            "rtol" => self.rtol = validate_rtol(&value)?,
            "atol" => self.atol = validate_atol(&value, self.n)?,
            "maxord" => self.maxord = validate_order(&value, self.order_bounds)?,
            "maxsteps" => self.maxsteps = validate_maxsteps(&value)?,
            "suppress_alg" => self.suppress_alg = validate_bool(name, &value)?,
            "algvar" => self.algvar = validate_algvar(&value, self.n)?,
            "switches0" => self.switches0 = Some(validate_switches(&value, None)?),
            "lsoff" => self.lsoff = validate_bool(name, &value)?,
            "tout1" => self.tout1 = validate_number(name, &value)?,
            "maxh" => self.maxh = validate_maxh(&value)?,
            "inith" => self.inith = Some(validate_inith(&value)?),
            "verbosity" => self.verbosity = validate_verbosity(&value)?,
            "init_mode" => self.init_mode = validate_init_mode(&value)?,
            "log_file" => self.log_file = Some(validate_text(name, &value)?),
            "problem_name" => self.problem_name = Some(validate_text(name, &value)?),
            _ => {
                return Err(SolverError::configuration(
                    name,
                    format!("unknown option, expected one of {}", OPTION_NAMES.join(", ")),
                ));
            }
        }
        Ok(())
    }

    pub fn get_option(&self, name: &str) -> Option<OptionValue> {
        let value = match name {
            "rtol" => OptionValue::Float(self.rtol),
            "atol" => match &self.atol {
                NumberOrVec::Number(x) => OptionValue::Float(*x),
                NumberOrVec::Vec(v) => OptionValue::FloatVec(v.clone()),
            },
            "maxord" => OptionValue::Int(self.maxord as i64),
            "maxsteps" => OptionValue::Int(self.maxsteps as i64),
            "suppress_alg" => OptionValue::Bool(self.suppress_alg),
            "algvar" => OptionValue::FloatVec(self.algvar.clone()),
            "switches0" => OptionValue::BoolVec(self.switches0.clone()?),
            "lsoff" => OptionValue::Bool(self.lsoff),
            "tout1" => OptionValue::Float(self.tout1),
            "maxh" => OptionValue::Float(self.maxh),
            "inith" => OptionValue::Float(self.inith?),
            "verbosity" => OptionValue::Text(self.verbosity.to_string()),
            "init_mode" => OptionValue::Text(
                self.init_mode
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
            "log_file" => OptionValue::Text(self.log_file.clone()?),
            "problem_name" => OptionValue::Text(self.problem_name.clone()?),
            _ => return None,
        };
        Some(value)
    }

    pub fn set_rtol(&mut self, rtol: f64) -> Result<(), SolverError> {
        self.set_option("rtol", rtol)
    }
    pub fn set_atol(&mut self, atol: f64) -> Result<(), SolverError> {
        self.set_option("atol", atol)
    }
    pub fn set_atol_vec(&mut self, atol: Vec<f64>) -> Result<(), SolverError> {
        self.set_option("atol", atol)
    }
    pub fn set_maxord(&mut self, maxord: i64) -> Result<(), SolverError> {
        self.set_option("maxord", maxord)
    }
    pub fn set_maxsteps(&mut self, maxsteps: i64) -> Result<(), SolverError> {
        self.set_option("maxsteps", maxsteps)
    }
    pub fn set_suppress_alg(&mut self, suppress_alg: bool) -> Result<(), SolverError> {
        self.set_option("suppress_alg", suppress_alg)
    }
    pub fn set_algvar(&mut self, algvar: Vec<f64>) -> Result<(), SolverError> {
        self.set_option("algvar", algvar)
    }
    pub fn set_switches0(&mut self, switches0: Vec<bool>) -> Result<(), SolverError> {
        self.set_option("switches0", switches0)
    }
    pub fn set_lsoff(&mut self, lsoff: bool) -> Result<(), SolverError> {
        self.set_option("lsoff", lsoff)
    }
    pub fn set_tout1(&mut self, tout1: f64) -> Result<(), SolverError> {
        self.set_option("tout1", tout1)
    }
    pub fn set_maxh(&mut self, maxh: f64) -> Result<(), SolverError> {
        self.set_option("maxh", maxh)
    }
    pub fn set_inith(&mut self, inith: f64) -> Result<(), SolverError> {
        self.set_option("inith", inith)
    }
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }
    pub fn set_init_mode(&mut self, init_mode: Option<InitMode>) {
        self.init_mode = init_mode;
    }
    pub fn set_log_file(&mut self, log_file: Option<String>) {
        self.log_file = log_file;
    }

    pub fn n(&self) -> usize {
        self.n
    }
    pub fn rtol(&self) -> f64 {
        self.rtol
    }
    pub fn atol(&self) -> &NumberOrVec {
        &self.atol
    }
    pub fn maxord(&self) -> usize {
        self.maxord
    }
    pub fn maxsteps(&self) -> usize {
        self.maxsteps
    }
    pub fn suppress_alg(&self) -> bool {
        self.suppress_alg
    }
    pub fn algvar(&self) -> &[f64] {
        &self.algvar
    }
    pub fn switches0(&self) -> Option<&[bool]> {
        self.switches0.as_deref()
    }
    pub fn lsoff(&self) -> bool {
        self.lsoff
    }
    pub fn tout1(&self) -> f64 {
        self.tout1
    }
    pub fn maxh(&self) -> f64 {
        self.maxh
    }
    pub fn inith(&self) -> Option<f64> {
        self.inith
    }
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
    pub fn init_mode(&self) -> Option<InitMode> {
        self.init_mode
    }
    pub fn log_file(&self) -> Option<&str> {
        self.log_file.as_deref()
    }
    pub fn problem_name(&self) -> Option<&str> {
        self.problem_name.as_deref()
    }

    /// normalized settings for the kernel
    pub fn kernel_settings(&self, explicit: bool) -> KernelSettings {
        KernelSettings {
            rtol: self.rtol,
            atol: self.atol.expand(self.n),
            max_order: self.maxord,
            max_step: if self.maxh > 0.0 { self.maxh } else { f64::INFINITY },
            first_step: self.inith,
            differential: self.algvar.iter().map(|&a| a == 1.0).collect(),
            suppress_alg: self.suppress_alg,
            lsoff: self.lsoff,
            tout1: self.tout1,
            explicit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SolverOptions {
        SolverOptions::new(2, (1, 5))
    }

    #[test]
    fn tolerance_boundary_table() {
        assert_eq!(validate_rtol(&OptionValue::Float(1e-8)).unwrap(), 1e-8);
        for bad in [
            OptionValue::Float(0.0),
            OptionValue::Float(-1.0),
            OptionValue::Int(1),
            OptionValue::Text("1e-6".into()),
        ] {
            assert!(matches!(
                validate_rtol(&bad),
                Err(SolverError::Configuration { .. })
            ));
        }

        assert_eq!(
            validate_atol(&OptionValue::FloatVec(vec![1e-6, 1e-8]), 2).unwrap(),
            NumberOrVec::Vec(vec![1e-6, 1e-8])
        );
        for bad in [
            OptionValue::Float(0.0),
            OptionValue::Float(-1e-6),
            OptionValue::FloatVec(vec![1e-6]),
            OptionValue::FloatVec(vec![1e-6, 0.0]),
            OptionValue::FloatVec(vec![1e-6, -1.0]),
            OptionValue::IntVec(vec![1, 1]),
            OptionValue::List(vec![OptionValue::Float(1.0), OptionValue::Text("test".into())]),
        ] {
            assert!(validate_atol(&bad, 2).is_err(), "{:?} accepted", bad);
        }
        let (rtol, atol) = validate(&OptionValue::Float(1e-4), &OptionValue::Float(1e-9), 2).unwrap();
        assert_eq!(rtol, 1e-4);
        assert_eq!(atol, NumberOrVec::Number(1e-9));
    }

    #[test]
    fn order_is_clamped_not_rejected() {
        let mut o = opts();
        o.set_maxord(-1).unwrap();
        assert_eq!(o.maxord(), 1);
        o.set_maxord(6).unwrap();
        assert_eq!(o.maxord(), 5);
        o.set_maxord(3).unwrap();
        assert_eq!(o.maxord(), 3);
        assert!(o.set_option("maxord", 1.0).is_err());
    }

    #[test]
    fn boolean_options_reject_other_types() {
        let mut o = opts();
        for name in ["suppress_alg", "lsoff"] {
            assert!(o.set_option(name, true).is_ok());
            assert!(o.set_option(name, "True").is_err());
            assert!(o.set_option(name, 1.0).is_err());
            assert!(o.set_option(name, 1i64).is_err());
        }
        assert!(o.suppress_alg());
        assert!(o.lsoff());
    }

    #[test]
    fn switches_accept_only_booleans() {
        assert_eq!(
            validate_switches(&OptionValue::BoolVec(vec![false, true]), Some(2)).unwrap(),
            vec![false, true]
        );
        assert!(validate_switches(&OptionValue::FloatVec(vec![1.0]), None).is_err());
        assert!(validate_switches(&OptionValue::IntVec(vec![0, 1]), None).is_err());
        assert!(validate_switches(&OptionValue::BoolVec(vec![true]), Some(2)).is_err());
    }

    #[test]
    fn algvar_and_numbers() {
        let mut o = opts();
        o.set_algvar(vec![1.0, 0.0]).unwrap();
        assert_eq!(o.kernel_settings(false).differential, vec![true, false]);
        assert!(o.set_algvar(vec![1.0]).is_err());
        assert!(o.set_algvar(vec![1.0, 0.5]).is_err());
        assert!(o.set_option("algvar", vec![1i64, 0]).is_ok());

        o.set_option("tout1", 1i64).unwrap();
        assert_eq!(o.tout1(), 1.0);
        assert!(o.set_option("tout1", "test").is_err());

        assert!(o.set_option("maxsteps", 0i64).is_err());
        assert!(o.set_option("maxsteps", 10.0).is_err());
        o.set_maxsteps(5).unwrap();
        assert_eq!(o.maxsteps(), 5);

        assert!(o.set_maxh(-1.0).is_err());
        o.set_maxh(0.0).unwrap();
        assert_eq!(o.kernel_settings(true).max_step, f64::INFINITY);
        assert!(o.set_inith(0.0).is_err());
        o.set_inith(1e-4).unwrap();
        assert_eq!(o.kernel_settings(true).first_step, Some(1e-4));

        assert!(o.set_option("no_such_option", 1.0).is_err());
    }

    #[test]
    fn verbosity_and_init_mode() {
        let mut o = opts();
        o.set_option("verbosity", "LOUD").unwrap();
        assert_eq!(o.verbosity(), Verbosity::Loud);
        o.set_option("verbosity", 50i64).unwrap();
        assert_eq!(o.verbosity(), Verbosity::Quiet);
        assert!(o.set_option("verbosity", "chatty").is_err());
        assert_eq!(Verbosity::Scream.level_filter(), LevelFilter::Debug);

        o.set_option("init_mode", "IDA_Y_INIT").unwrap();
        assert_eq!(o.init_mode(), Some(InitMode::YInit));
        o.set_option("init_mode", "none").unwrap();
        assert_eq!(o.init_mode(), None);
        assert!(o.set_option("init_mode", "IDA_X_INIT").is_err());
    }

    #[test]
    fn toml_loading() {
        let text = r#"
rtol = 1e-8
atol = [1e-6, 1e-9]
maxord = 7
suppress_alg = true
algvar = [1, 0]
switches0 = [false, true]
verbosity = "whisper"
"#;
        let o = SolverOptions::from_toml_str(text, 2, (1, 5)).unwrap();
        assert_eq!(o.rtol(), 1e-8);
        assert_eq!(o.atol(), &NumberOrVec::Vec(vec![1e-6, 1e-9]));
        assert_eq!(o.maxord(), 5);
        assert!(o.suppress_alg());
        assert_eq!(o.algvar(), &[1.0, 0.0]);
        assert_eq!(o.switches0(), Some(&[false, true][..]));
        assert_eq!(o.verbosity(), Verbosity::Whisper);
        assert_eq!(o.get_option("rtol"), Some(OptionValue::Float(1e-8)));

        let err = SolverOptions::from_toml_str("atol = [1.0, 'test']", 2, (1, 5)).unwrap_err();
        assert!(matches!(err, SolverError::Configuration { .. }));
        assert!(SolverOptions::from_toml_str("rtol = ", 2, (1, 5)).is_err());
    }
}
