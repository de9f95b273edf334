//! Run counters. They only grow during a run and are cleared when the next run starts.

use log::info;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    steps: usize,
    rejected_steps: usize,
    function_evaluations: usize,
    jacobian_evaluations: usize,
    events: usize,
    lu_factorizations: usize,
    consistency_calls: usize,
    event_function_evaluations: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
    pub fn rejected_steps(&self) -> usize {
        self.rejected_steps
    }
    pub fn function_evaluations(&self) -> usize {
        self.function_evaluations
    }
    pub fn jacobian_evaluations(&self) -> usize {
        self.jacobian_evaluations
    }
    pub fn events(&self) -> usize {
        self.events
    }
    pub fn lu_factorizations(&self) -> usize {
        self.lu_factorizations
    }
    pub fn consistency_calls(&self) -> usize {
        self.consistency_calls
    }
    pub fn event_function_evaluations(&self) -> usize {
        self.event_function_evaluations
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
    pub(crate) fn count_step(&mut self) {
        self.steps += 1;
    }
    pub(crate) fn count_rejection(&mut self) {
        self.rejected_steps += 1;
    }
    pub(crate) fn count_event(&mut self) {
        self.events += 1;
    }
    pub(crate) fn count_consistency_call(&mut self) {
        self.consistency_calls += 1;
    }
    pub(crate) fn add_function_evaluations(&mut self, k: usize) {
        self.function_evaluations += k;
    }
    pub(crate) fn add_event_function_evaluations(&mut self, k: usize) {
        self.event_function_evaluations += k;
    }
    /// kernel counters are cumulative since the start of the run
    pub(crate) fn sync_kernel_counters(&mut self, njev: usize, nlu: usize) {
        self.jacobian_evaluations = self.jacobian_evaluations.max(njev);
        self.lu_factorizations = self.lu_factorizations.max(nlu);
    }

    /// counter name -> value
    pub fn as_map(&self) -> HashMap<String, usize> {
        let mut stats = HashMap::new();
        stats.insert("number of steps".to_string(), self.steps);
        stats.insert("number of rejected steps".to_string(), self.rejected_steps);
        stats.insert(
            "number of function evaluations".to_string(),
            self.function_evaluations,
        );
        stats.insert(
            "number of jacobian evaluations".to_string(),
            self.jacobian_evaluations,
        );
        stats.insert("number of events".to_string(), self.events);
        stats.insert(
            "number of LU factorizations".to_string(),
            self.lu_factorizations,
        );
        stats.insert(
            "number of consistency calls".to_string(),
            self.consistency_calls,
        );
        stats.insert(
            "number of event function evaluations".to_string(),
            self.event_function_evaluations,
        );
        stats
    }

    pub fn table(&self) -> String {
        let mut rows: Vec<(String, usize)> = self.as_map().into_iter().collect();
        rows.sort();
        let mut builder = Builder::default();
        builder.push_record(["counter", "value"]);
        for (name, value) in rows {
            builder.push_record([name, value.to_string()]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    pub fn log_table(&self, problem_name: &str) {
        info!(
            "\n \n CALC STATISTICS ({}) \n \n {}",
            problem_name,
            self.table()
        );
    }
}
