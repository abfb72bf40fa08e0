//! ShiftBoard common runtime support.

pub mod logging;

pub use logging::init_logging;
