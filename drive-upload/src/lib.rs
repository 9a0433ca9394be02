pub mod cli;
pub mod credentials;
pub mod drive;
pub mod inputs;
pub mod outputs;

pub use cli::{run, Cli, Commands};
