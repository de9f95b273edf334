#![allow(non_snake_case)]
use RustedDAE::numerical::Driver::consistency::InitMode;
use RustedDAE::numerical::Driver::driver::Driver;
use RustedDAE::numerical::Driver::options::{SolverOptions, Verbosity};
use RustedDAE::numerical::Driver::problem::{DelaySpec, Problem};
use nalgebra::DVector;
use std::f64::consts::PI;

fn main() {
    let example = 0;
    match example {
        0 => {
            // y' = -y, y(0) = 1
            let problem = Problem::explicit(
                "decay",
                0.0,
                DVector::from_vec(vec![1.0]),
                |_t, y, _sw| -y,
            );
            let mut driver = Driver::new(problem).unwrap();
            driver.options_mut().set_rtol(1e-8).unwrap();
            driver.options_mut().set_atol(1e-10).unwrap();
            driver.options_mut().set_verbosity(Verbosity::Loud);
            let result = driver.simulate(5.0, 10).unwrap();
            for (t, y) in result.t.iter().zip(result.y.iter()) {
                println!("t = {:.2}, y = {:.8}, exact = {:.8}", t, y[0], (-t).exp());
            }
        }
        1 => {
            // y' = -y + y(t - 1), y(t) = sin(pi t) for t < 0
            let delay = DelaySpec::new(1, 1, |_lag, t, _y| t - 1.0, |_i, t| (PI * t).sin());
            let problem = Problem::delay(
                "retarded decay",
                0.0,
                DVector::from_vec(vec![0.0]),
                |_t, y, ydelay, _sw| -y + &ydelay[0],
                delay,
            )
            .with_grid(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
            let mut driver = Driver::new(problem).unwrap();
            driver.options_mut().set_verbosity(Verbosity::Loud);
            let result = driver.simulate(5.0, 50).unwrap();
            println!("y(5) = {}", result.y.last().unwrap()[0]);
            result.save_csv("retarded_decay.csv").unwrap();
        }
        2 => {
            // bouncing slope: y' = +1 until y = 0.5, then -1
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
            driver.options_mut().set_verbosity(Verbosity::Loud);
            driver.simulate(2.0, 20).unwrap();
            println!("events: {:?}", driver.disc_info());
            println!("switches: {:?}", driver.switches());
        }
        3 => {
            // y0' = -y0, 0 = y1 - y0, started with an inconsistent y1
            let problem = Problem::implicit(
                "index one DAE",
                0.0,
                DVector::from_vec(vec![1.0, 0.5]),
                DVector::from_vec(vec![0.0, 0.0]),
                |_t, y, yd, _sw| DVector::from_vec(vec![yd[0] + y[0], y[1] - y[0]]),
            );
            let mut driver = Driver::new(problem).unwrap();
            let options = SolverOptions::from_toml_str(
                "rtol = 1e-8\natol = [1e-10, 1e-10]\nalgvar = [1, 0]\nverbosity = \"loud\"",
                2,
                (1, 5),
            )
            .unwrap();
            *driver.options_mut() = options;
            let (y0, yd0) = driver.make_consistency(InitMode::YaYdpInit).unwrap();
            println!("consistent y0 = {}, yd0 = {}", y0, yd0);
            let result = driver.simulate(1.0, 10).unwrap();
            println!("y(1) = {}", result.y.last().unwrap());
            println!("{}", driver.statistics().table());
        }
        _ => println!("no such example"),
    }
}
