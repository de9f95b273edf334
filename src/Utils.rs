/// logger set up and csv export
pub mod logger;
