pub mod cli;
pub mod load_config;
pub mod summarise;

pub use cli::{run, Cli, Commands};
