use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Weekly ops planner backed by plain JSON files.
/// Storage defaults to ~/.wop or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "wop", version, about = "Weekly ops planner")]
pub struct Cli {
    /// Directory holding the planner's JSON files (overrides WOP_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the data directory: flag, then `WOP_DATA_DIR`, then `~/.wop`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os("WOP_DATA_DIR").filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wop")
    }
}
