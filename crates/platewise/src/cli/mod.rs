//! Command handlers, one module per subcommand.

pub mod config;
pub mod estimate;
pub mod serve;
pub mod vocab;
