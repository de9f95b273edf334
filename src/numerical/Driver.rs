/// integration driver: run loop, output sampling, event handling and delay bookkeeping
pub mod driver;
/// crate error type
pub mod errors;
/// seam between the driver and a step-producing method
pub mod kernel;
/// problem descriptor (explicit, implicit and delay forms)
pub mod problem;
/// option validation and the options of one driver
pub mod options;
/// dense history of delay problems
pub mod history;
/// consistent initial values of implicit problems
pub mod consistency;
/// sign change detection and event time localization
pub mod events;
/// run counters
pub mod statistics;

mod driver_tests;
