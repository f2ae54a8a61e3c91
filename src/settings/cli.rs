use super::Parser;

/// Serves the user lookup API.
#[derive(Parser, Debug)]
#[command(name = "user-api", version)]
pub struct Cli {
    /// Path to a TOML settings file. Defaults to `settings/dev.toml` in debug
    /// builds and `settings/release.toml` otherwise.
    #[arg(long)]
    pub settings: Option<String>,
}
