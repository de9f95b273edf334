//////////////////////////////////////////////////////////////////////////////////////////////////
//                         SCENARIO TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::numerical::Driver::consistency::InitMode;
    use crate::numerical::Driver::driver::{Driver, DriverState};
    use crate::numerical::Driver::errors::SolverError;
    use crate::numerical::Driver::kernel::StepKernel;
    use crate::numerical::Driver::options::Verbosity;
    use crate::numerical::Driver::problem::{DelaySpec, Problem};
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use std::cell::Cell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    fn decay() -> Problem {
        Problem::explicit("decay", 0.0, DVector::from_vec(vec![1.0]), |_t, y, _sw| -y)
    }

    fn quiet<K: StepKernel>(driver: &mut Driver<K>) {
        driver.options_mut().set_verbosity(Verbosity::Quiet);
    }

    #[test]
    fn exponential_decay() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_rtol(1e-8).unwrap();
        driver.options_mut().set_atol(1e-10).unwrap();
        let result = driver.simulate(5.0, 50).unwrap();

        assert!(result.completed);
        assert_eq!(result.len(), 51);
        assert_eq!(*result.t.last().unwrap(), 5.0);
        let y_end = result.y.last().unwrap()[0];
        assert_relative_eq!(y_end, (-5.0f64).exp(), epsilon = 1e-6);
        for (t, y) in result.t.iter().zip(result.y.iter()) {
            assert_relative_eq!(y[0], (-t).exp(), epsilon = 1e-4);
        }
        assert_eq!(driver.state(), DriverState::Terminated);
        assert!(driver.statistics().steps() > 0);
        assert!(driver.statistics().function_evaluations() > driver.statistics().steps());
        assert_eq!(
            driver.stats()["number of steps"],
            driver.statistics().steps()
        );
        assert!(driver.past().is_none());
    }

    #[test]
    fn communication_points_are_evenly_spaced() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(1.0, 10).unwrap();
        assert_eq!(result.t.len(), 11);
        assert_eq!(result.y.len(), 11);
        assert_eq!(result.yd.len(), 11);
        for (k, t) in result.t.iter().enumerate() {
            assert_relative_eq!(*t, k as f64 / 10.0, epsilon = 1e-14);
        }
        assert_eq!(result.t[10], 1.0);
        assert!(result.step_detail.is_empty());
    }

    #[test]
    fn one_step_mode_records_every_step() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(2.0, 0).unwrap();
        let steps = driver.statistics().steps();
        assert_eq!(result.len(), steps + 1);
        assert_eq!(result.step_detail.len(), steps);
        for w in result.t.windows(2) {
            assert!(w[1] > w[0]);
        }
        for d in &result.step_detail {
            assert!(d.h > 0.0);
            assert!((1..=5).contains(&d.order));
        }
        assert!(result.step_detail.iter().any(|d| d.order > 1));
    }

    #[test]
    fn delayed_values_come_from_history() {
        let phi_after_start = Rc::new(Cell::new(false));
        let flag = phi_after_start.clone();
        let phi = move |_i: usize, t: f64| {
            if t >= 0.0 {
                flag.set(true);
            }
            (PI * t).sin()
        };
        let delay = DelaySpec::new(1, 1, |_lag, t, _y| t - 1.0, phi);
        let problem = Problem::delay(
            "retarded decay",
            0.0,
            DVector::from_vec(vec![0.0]),
            |_t, y, ydelay, _sw| -y + &ydelay[0],
            delay,
        )
        .with_grid(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_rtol(1e-8).unwrap();
        driver.options_mut().set_atol(1e-10).unwrap();
        let result = driver.simulate(5.0, 5).unwrap();

        assert_eq!(result.t, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        // y' = -y - sin(pi t) on [0, 1]
        let y1 = -PI * (1.0 + (-1.0f64).exp()) / (1.0 + PI * PI);
        assert_relative_eq!(result.y[1][0], y1, epsilon = 1e-3);
        assert!(!phi_after_start.get());

        let past = driver.past().unwrap();
        assert!(!past.is_empty());
        assert_relative_eq!(past.t_end(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(past.evaluate(0, 5.0).unwrap(), result.y[5][0], epsilon = 1e-10);
        assert!(matches!(
            past.evaluate(0, 10.0),
            Err(SolverError::OutOfRange { .. })
        ));
    }

    #[test]
    fn steps_do_not_cross_breakpoints() {
        let problem = decay().with_grid(vec![0.3, 1.7]);
        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(2.0, 0).unwrap();
        assert!(result.t.contains(&0.3));
        assert!(result.t.contains(&1.7));
    }

    #[test]
    fn implicit_event_changes_switches() {
        let problem = Problem::implicit(
            "constant",
            0.0,
            DVector::from_vec(vec![1.0]),
            DVector::from_vec(vec![0.0]),
            |_t, y, _yd, _sw| DVector::from_vec(vec![y[0] - 1.0]),
        )
        .with_events(|t, _y, _yd, _sw| DVector::from_vec(vec![t - 1.0, t]))
        .with_switches(vec![false, true]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_algvar(vec![0.0]).unwrap();
        let result = driver.simulate(2.0, 0).unwrap();

        let events = driver.disc_info();
        assert_eq!(events.len(), 1);
        assert_relative_eq!(events[0].0, 1.0, epsilon = 1e-8);
        assert_eq!(events[0].1, vec![0]);
        assert_eq!(driver.switches(), &[true, true]);
        assert_eq!(result.switches, vec![true, true]);
        assert_eq!(driver.statistics().events(), 1);
        assert_eq!(*result.t.last().unwrap(), 2.0);
        for y in &result.y {
            assert_relative_eq!(y[0], 1.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn explicit_switch_reverses_the_slope() {
        let problem = Problem::explicit(
            "bounce",
            0.0,
            DVector::from_vec(vec![0.0]),
            |_t, _y, sw| DVector::from_vec(vec![if sw[0] { -1.0 } else { 1.0 }]),
        )
        .with_events(|_t, y, _yd, sw| {
            DVector::from_vec(vec![if sw[0] { y[0] + 2.0 } else { y[0] - 0.5 }])
        })
        .with_switches(vec![false]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(2.0, 4).unwrap();

        assert_eq!(driver.disc_info().len(), 1);
        assert_relative_eq!(driver.disc_info()[0].0, 0.5, epsilon = 1e-8);
        assert_relative_eq!(result.y[1][0], 0.5, epsilon = 1e-8);
        assert_relative_eq!(result.y[2][0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y[4][0], -1.0, epsilon = 1e-6);
        assert_relative_eq!(result.yd[4][0], -1.0, epsilon = 1e-6);
        assert_eq!(driver.switches(), &[true]);
    }

    #[test]
    fn indicator_crossing_again_right_after_an_event() {
        let problem = Problem::explicit(
            "still",
            0.0,
            DVector::from_vec(vec![1.0]),
            |_t, y, _sw| DVector::zeros(y.len()),
        )
        .with_events(|t, _y, _yd, _sw| DVector::from_vec(vec![(5.0 * PI * t).sin()]))
        .with_switches(vec![false]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_maxh(0.25).unwrap();
        let result = driver.simulate(2.1, 0).unwrap();

        let events = driver.disc_info();
        assert_eq!(events.len(), 10);
        for (k, (t_event, indices)) in events.iter().enumerate() {
            assert_relative_eq!(*t_event, 0.2 * (k + 1) as f64, epsilon = 1e-8);
            assert_eq!(indices, &vec![0]);
        }
        assert_eq!(driver.statistics().events(), 10);
        // ten toggles
        assert_eq!(driver.switches(), &[false]);
        assert_eq!(*result.t.last().unwrap(), 2.1);
    }

    #[test]
    fn event_at_the_final_time_terminates() {
        let problem = Problem::explicit(
            "ramp",
            0.0,
            DVector::from_vec(vec![0.0]),
            |_t, _y, _sw| DVector::from_vec(vec![1.0]),
        )
        .with_events(|t, _y, _yd, _sw| DVector::from_vec(vec![t - 2.0]))
        .with_switches(vec![false]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(2.0, 4).unwrap();

        let events = driver.disc_info();
        assert_eq!(events.len(), 1);
        assert_relative_eq!(events[0].0, 2.0, epsilon = 1e-10);
        assert_eq!(driver.state(), DriverState::Terminated);
        assert!(result.completed);
        assert_eq!(driver.switches(), &[true]);
        assert_eq!(result.switches, vec![true]);
        assert_eq!(result.t.len(), 5);
        assert_eq!(*result.t.last().unwrap(), 2.0);
        assert_relative_eq!(result.y[4][0], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn unbracketed_sign_change_reports_the_step_end() {
        // positive only on the call made at the end of the first step
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let problem = Problem::explicit("decay", 0.0, DVector::from_vec(vec![1.0]), |_t, y, _sw| {
            -y
        })
        .with_events(move |_t, _y, _yd, _sw| {
            let k = counter.get();
            counter.set(k + 1);
            DVector::from_vec(vec![if k == 1 { 1.0 } else { -1.0 }])
        })
        .with_switches(vec![false]);

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(1.0, 0).unwrap();

        assert!(result.completed);
        assert_eq!(driver.state(), DriverState::Terminated);
        assert_eq!(result.events.len(), 1);
        let report = &result.events[0];
        assert!(report.boundary_detected);
        assert_eq!(report.indices, vec![0]);
        // the first accepted step is not truncated
        assert_eq!(report.t_event, result.t[1]);
        assert_eq!(result.step_detail[0].t, report.t_event);
        assert_eq!(driver.switches(), &[true]);
        assert_relative_eq!(*result.t.last().unwrap(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn switch_hook_replaces_toggling() {
        let problem = Problem::explicit(
            "latch",
            0.0,
            DVector::from_vec(vec![0.0]),
            |_t, _y, sw| DVector::from_vec(vec![if sw[1] { 0.0 } else { 1.0 }]),
        )
        .with_events(|_t, y, _yd, _sw| DVector::from_vec(vec![y[0] - 0.25]))
        .with_switches(vec![false, false])
        .with_switch_hook(|indices, switches| {
            if indices.contains(&0) {
                switches[1] = true;
            }
        });

        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(1.0, 2).unwrap();
        assert_eq!(driver.switches(), &[false, true]);
        assert_relative_eq!(result.y[2][0], 0.25, epsilon = 1e-8);
    }

    #[test]
    fn dae_with_inconsistent_start() {
        // y0' = -y0, 0 = y1 - y0
        let problem = Problem::implicit(
            "index one",
            0.0,
            DVector::from_vec(vec![1.0, 0.5]),
            DVector::from_vec(vec![0.0, 0.0]),
            |_t, y, yd, _sw| DVector::from_vec(vec![yd[0] + y[0], y[1] - y[0]]),
        );
        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_algvar(vec![1.0, 0.0]).unwrap();
        driver.options_mut().set_rtol(1e-8).unwrap();
        driver.options_mut().set_atol(1e-10).unwrap();
        let result = driver.simulate(1.0, 4).unwrap();

        assert_relative_eq!(result.y[0][1], 1.0, epsilon = 1e-8);
        assert_relative_eq!(result.yd[0][0], -1.0, epsilon = 1e-8);
        let e = (-1.0f64).exp();
        assert_relative_eq!(result.y[4][0], e, epsilon = 1e-5);
        assert_relative_eq!(result.y[4][1], e, epsilon = 1e-5);
        assert!(driver.statistics().consistency_calls() >= 1);
    }

    #[test]
    fn make_consistency_solves_for_y() {
        let problem = Problem::implicit(
            "algebraic",
            0.0,
            DVector::from_vec(vec![2.0, 2.0]),
            DVector::from_vec(vec![1.0, 0.0]),
            |_t, y, _yd, _sw| DVector::from_vec(vec![y[0] + y[1] + 1.0, y[1]]),
        );
        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        let (y, yd) = driver.make_consistency(InitMode::YInit).unwrap();
        assert_relative_eq!(y[0], -1.0, epsilon = 1e-8);
        assert_relative_eq!(y[1], 0.0, epsilon = 1e-8);
        assert_eq!(yd, DVector::from_vec(vec![1.0, 0.0]));
        assert_eq!(driver.statistics().consistency_calls(), 1);
        assert!(driver.kernel().jacobian_evaluations() > 0);
        assert_eq!(
            driver.statistics().jacobian_evaluations(),
            driver.kernel().jacobian_evaluations()
        );
        assert_eq!(
            driver.statistics().lu_factorizations(),
            driver.kernel().lu_factorizations()
        );

        let mut explicit = Driver::new(decay()).unwrap();
        assert!(matches!(
            explicit.make_consistency(InitMode::YInit),
            Err(SolverError::Configuration { .. })
        ));
    }

    #[test]
    fn max_steps_keeps_partial_result() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        driver.options_mut().set_maxsteps(5).unwrap();
        driver.options_mut().set_rtol(1e-10).unwrap();
        let err = driver.simulate(100.0, 0).unwrap_err();
        assert!(matches!(err, SolverError::MaxStepsExceeded { max_steps: 5, .. }));
        assert!(err.keeps_partial_result());
        assert_eq!(driver.state(), DriverState::Failed);
        assert!(driver.result().t.len() <= 6);
        assert!(!driver.result().completed);
        assert_eq!(driver.statistics().steps(), 5);
    }

    #[test]
    fn bad_final_time_and_switches() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        assert!(matches!(
            driver.simulate(0.0, 10),
            Err(SolverError::Configuration { .. })
        ));
        assert_eq!(driver.state(), DriverState::Failed);

        let problem = decay().with_switches(vec![true]);
        let mut driver = Driver::new(problem).unwrap();
        quiet(&mut driver);
        driver.set_option("switches0", vec![true, false]).unwrap();
        assert!(matches!(
            driver.simulate(1.0, 10),
            Err(SolverError::Configuration { .. })
        ));
    }

    #[test]
    fn reset_allows_a_second_run() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        let first = driver.simulate(1.0, 4).unwrap();
        driver.reset();
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(driver.result().is_empty());
        assert_eq!(driver.statistics().steps(), 0);
        let second = driver.simulate(1.0, 4).unwrap();
        assert_eq!(first.t, second.t);
        assert_eq!(first.y, second.y);
        assert_eq!(first.statistics, second.statistics);
    }

    #[test]
    fn result_exports_to_csv() {
        let mut driver = Driver::new(decay()).unwrap();
        quiet(&mut driver);
        let result = driver.simulate(1.0, 4).unwrap();
        let (t, y) = result.to_matrix();
        assert_eq!(t.len(), 5);
        assert_eq!(y.shape(), (5, 1));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decay.csv");
        result.save_csv(path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "t,y_0");
        assert!(lines[1].starts_with("0,1"));
    }
}
