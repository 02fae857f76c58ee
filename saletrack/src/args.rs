use std::{borrow::Cow, fmt, io::IsTerminal, path::PathBuf, str::FromStr};

use api::Platform;
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use logforth::filter::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "saletrack", version, long_about = concat!("Saletrack v", env!("CARGO_PKG_VERSION")))]
pub(crate) struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, env = "SALETRACK_CONFIG_PATH", default_value = "./saletrack.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "SALETRACK_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "SALETRACK_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn config(&self) -> anyhow::Result<Config> {
        let config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            Config::default()
        };

        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Show the currently resolved identity
    Whoami,
    /// Sign in: synthesize a local development identity with --name, or
    /// print the provider login address to open in a browser
    Login {
        /// Display name for a locally synthesized development identity
        #[arg(long)]
        name: Option<String>,
    },
    /// Clear the local development identity
    Logout,
    /// Show the current user as reported by the backend
    User,
    /// Fetch the combined dashboard payload
    Dashboard,
    /// Fetch dashboard statistics
    Stats,
    /// Fetch the most recent sales
    Recent {
        /// Maximum number of sales to return; the server caps this at 20
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Manage sale records
    Sales {
        #[command(subcommand)]
        command: SalesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum SalesCommand {
    /// List all sales of the current user
    List,
    /// Show a single sale
    Show {
        /// Sale identifier
        id: String,
    },
    /// Record a new sale
    Create {
        /// Name of the product sold
        #[arg(long)]
        product: String,
        /// Sale amount in USD
        #[arg(long)]
        amount: f64,
        /// Sale date in ISO 8601; defaults to the current time
        #[arg(long)]
        date: Option<String>,
        /// Platform the sale occurred on: ebay, goat, stockx or manual
        #[arg(long)]
        platform: Platform,
        /// Customer name
        #[arg(long)]
        customer: Option<String>,
    },
    /// Update an existing sale
    Update {
        /// Sale identifier
        id: String,
        /// New product name
        #[arg(long)]
        product: Option<String>,
        /// New amount in USD
        #[arg(long)]
        amount: Option<f64>,
        /// New sale date in ISO 8601
        #[arg(long)]
        date: Option<String>,
        /// New platform
        #[arg(long)]
        platform: Option<Platform>,
        /// New customer name
        #[arg(long)]
        customer: Option<String>,
    },
    /// Delete a sale
    Delete {
        /// Sale identifier
        id: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stdout().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    #[default]
    Warn,
    /// Log errors, warnings, and info messages
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> EnvFilter {
        let filter_str = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            // For other levels, set the default to 'warn' for all crates,
            // but use the selected level for workspace crates
            level => Cow::Owned(format!(
                "warn,saletrack={level},api={level},identity={level},config={level}"
            )),
        };

        EnvFilter::from_str(&filter_str).expect("These all are valid env filters.")
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
