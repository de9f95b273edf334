/// SOLVER OF STIFF IVP and index-1 DAE in residual form
/// variable order BDF stepping behind the kernel trait of the driver
pub mod BDF_solver;
/// some utilities for BDF solver: norms, tolerances, initial step, finite-difference jacobian
pub mod common;
