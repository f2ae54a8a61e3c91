//! Settings come from a TOML file selected on the command line, with
//! `USER_API__<SECTION>__<KEY>` environment variables layered on top.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
