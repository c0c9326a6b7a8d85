//! Command-line subcommands other than `run`.

pub mod replay;

pub use replay::ReplayArgs;
