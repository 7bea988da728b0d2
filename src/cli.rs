use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "github-favorites")]
#[command(about = "Keep a list of favourite GitHub users and browse their starred repositories")]
#[command(version)]
pub struct Cli {
    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com", global = true)]
    pub api_url: String,

    /// GitHub token, raises the rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Directory holding the saved favorites (defaults to the platform data dir)
    #[arg(long, env = "FAVORITES_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Timeout for a single GitHub request, in seconds
    #[arg(long, env = "LOOKUP_TIMEOUT_SECS", default_value_t = 15, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved users
    List,

    /// Look up users on GitHub and save them
    Add {
        /// One or more GitHub logins
        #[arg(required = true)]
        logins: Vec<String>,
    },

    /// Remove a saved user after confirmation
    Remove {
        /// Login to remove, or display name with --by-name
        target: String,

        /// Match on the display name instead of the login
        #[arg(long)]
        by_name: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show one saved user
    Show {
        login: String,
    },

    /// List repositories starred by a user
    Starred {
        login: String,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}
