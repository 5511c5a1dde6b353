pub mod cli;
pub mod git;
pub mod load_config;
pub mod openai;
pub mod prompt;
pub mod s3;

pub use cli::{run, Aborted, Cli, Commands};
