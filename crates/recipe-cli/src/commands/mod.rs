//! Command implementations for recipe-cli

pub mod check;
pub mod options;
pub mod resolve;

pub use check::run_check;
pub use options::run_options;
pub use resolve::run_resolve;
