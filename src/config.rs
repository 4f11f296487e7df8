use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::mutations::LikePolicy;
use crate::query_state::{is_page_size, SortOrder, PAGE_SIZES};
use crate::state::ManagerOptions;

#[derive(Parser, Debug)]
#[command(name = "postdesk", about = "Admin console for a posts and comments REST backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the REST API, e.g. http://localhost:5173/api
    #[arg(long)]
    pub api_url: Option<String>,

    /// Highlight search matches with terminal colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List posts for a filter
    List {
        /// Start from a saved query string, e.g. "?tag=love&limit=20"
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        skip: Option<u32>,
        /// Page size: 10, 20 or 30
        #[arg(long, value_parser = parse_page_size)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        order: Option<SortOrder>,
        #[arg(long)]
        tag: Option<String>,
        /// Move one page forward
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        /// Move one page back
        #[arg(long)]
        prev: bool,
    },
    /// List the available tags
    Tags,
    /// Show a user's details
    User { id: u64 },
    /// Show the comments on a post
    Comments { post: u64 },
    /// Create a post
    AddPost {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value_t = 1)]
        user_id: u64,
    },
    /// Change a post's title or body
    EditPost {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete a post
    DeletePost { id: u64 },
    /// Comment on a post
    AddComment {
        post: u64,
        #[arg(long)]
        body: String,
        #[arg(long, default_value_t = 1)]
        user_id: u64,
    },
    /// Replace a comment's body
    EditComment {
        post: u64,
        id: u64,
        #[arg(long)]
        body: String,
    },
    /// Delete a comment
    DeleteComment { post: u64, id: u64 },
    /// Like a comment
    LikeComment { post: u64, id: u64 },
}

fn parse_page_size(raw: &str) -> Result<u32, String> {
    let limit: u32 = raw.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    if is_page_size(limit) {
        Ok(limit)
    } else {
        Err(format!("page size must be one of {:?}", PAGE_SIZES))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub users: UsersConfig,
    pub comments: CommentsConfig,
    pub log: LogConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UsersConfig {
    /// Fields requested from the user directory for the author join
    pub select: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CommentsConfig {
    pub like_policy: LikePolicy,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173/api".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            select: vec!["username".to_string(), "image".to_string()],
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if cli.config.is_some() {
            anyhow::bail!("Config file {} does not exist", config_path.display());
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref api_url) = cli.api_url {
            config.api.base_url = api_url.clone();
        }

        url::Url::parse(&config.api.base_url).map_err(|e| {
            anyhow::anyhow!("Invalid API base URL '{}': {}", config.api.base_url, e)
        })?;

        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".postdesk")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            user_fields: self.users.select.clone(),
            like_policy: self.comments.like_policy,
        }
    }
}
