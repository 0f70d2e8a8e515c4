use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Snippetbox - share short text snippets.
#[derive(Parser, Debug, Clone)]
#[command(name = "snippetbox")]
#[command(about = "Server-rendered snippet sharing", long_about = None)]
pub struct Config {
    /// HTTP network address. A bare `:port` listens on all interfaces.
    #[arg(long, env = "SNIPPETBOX_ADDR", default_value = ":4000")]
    pub addr: String,

    /// Path to static assets.
    #[arg(long, env = "SNIPPETBOX_STATIC_DIR", default_value = "./ui/static/")]
    pub static_dir: PathBuf,

    /// SQLite data source name (database file path).
    #[arg(long, env = "SNIPPETBOX_DSN")]
    pub dsn: String,

    /// Idle lifetime of a session cookie.
    #[arg(long, env = "SNIPPETBOX_SESSION_LIFETIME_HOURS", default_value_t = 12)]
    pub session_lifetime_hours: u64,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }

    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_hours * 3600)
    }
}
