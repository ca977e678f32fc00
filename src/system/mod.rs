//! Platform and process-level helpers

pub mod logging;

pub use logging::init_logging;
