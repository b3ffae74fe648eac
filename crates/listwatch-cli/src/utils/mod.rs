//! Shared helpers for the CLI binary.

pub mod logging;

pub use logging::initialize_logging;
