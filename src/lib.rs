pub mod cli;
pub mod load_config;
pub mod publish;
pub mod sources;

pub use cli::{run, Cli, Commands};
