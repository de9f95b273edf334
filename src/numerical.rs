/// Variable-order BDF kernel
pub mod BDF;
/// Integration driver for ODE, DAE and DDE problems with switches and events
/// ```ignore
///  use RustedDAE::numerical::Driver::driver::Driver;
///  use RustedDAE::numerical::Driver::problem::Problem;
///  use nalgebra::DVector;
///  // y' = -y, y(0) = 1
///  let problem = Problem::explicit("decay", 0.0, DVector::from_vec(vec![1.0]), |_t, y, _sw| -y);
///  let mut driver = Driver::new(problem).unwrap();
///  driver.options_mut().set_rtol(1e-8).unwrap();
///  let result = driver.simulate(5.0, 50).unwrap();
///  println!("y(5) = {}", result.y.last().unwrap()[0]);
/// ```
pub mod Driver;
