use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cliproxy-dashboard")]
#[command(about = "Usage dashboard for a CLIProxy instance", long_about = None)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite file backing the usage store.
    #[arg(long, env = "DASHBOARD_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Emit logs as JSON lines. Also enabled by LOG_FORMAT=json.
    #[arg(long, default_value_t = false)]
    pub json_logs: bool,
}
