use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use otpsync_core::reorder::SortOrder;

#[derive(Parser)]
#[command(name = "otpsync")]
#[command(about = "Manage the one-time-password site registry from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local state file
    #[arg(long, global = true, value_name = "PATH")]
    pub state_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure the connection to the remote registry
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List configured sites
    #[command(alias = "ls")]
    List {
        /// Display order (never saved)
        #[arg(long, value_enum, default_value_t = SortArg::Default)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a site, or replace an existing one with the same name
    Add {
        /// Site name
        name: String,
        /// TOTP shared secret (whitespace is removed)
        #[arg(long, value_name = "SECRET")]
        secret: String,
        /// Site URL, may be repeated
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,
        /// Image file to use as the site icon (max 100KB)
        #[arg(long, value_name = "PATH")]
        icon_file: Option<PathBuf>,
        /// Skip automatic icon lookup
        #[arg(long)]
        no_auto_icon: bool,
    },
    /// Edit an existing site, keeping fields that are not given
    Edit {
        /// Site name
        name: String,
        /// New TOTP shared secret
        #[arg(long, value_name = "SECRET")]
        secret: Option<String>,
        /// Replacement site URL, may be repeated
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,
        /// Image file to use as the site icon (max 100KB)
        #[arg(long, value_name = "PATH")]
        icon_file: Option<PathBuf>,
    },
    /// Delete a site
    #[command(alias = "rm")]
    Delete {
        /// Site name
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a site to another position (1-based, stored order)
    Move {
        /// Current position
        from: usize,
        /// Target position
        to: usize,
    },
    /// Resolve or change site icons
    Icon {
        #[command(subcommand)]
        command: IconCommands,
    },
    /// Export the remote registry as JSON
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Replace the remote registry with a JSON document
    Import {
        /// Document to import
        path: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    Default,
    NameAsc,
    NameDesc,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Default => Self::Default,
            SortArg::NameAsc => Self::NameAsc,
            SortArg::NameDesc => Self::NameDesc,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Save connection settings and test them against the remote
    Test {
        /// Server address (scheme optional)
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Force the proxy to reset its connection settings
    Repair {
        /// Server address (scheme optional)
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Show stored connection settings
    Show,
    /// Remove all local settings (the remote registry is not affected)
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum IconCommands {
    /// Resolve an icon for a URL and print it as a data URL
    Fetch {
        /// Site URL (scheme optional)
        url: String,
    },
    /// Change the icon of a site
    #[command(group(ArgGroup::new("source").required(true).args(["file", "auto", "remove"])))]
    Set {
        /// Site name
        name: String,
        /// Image file to use (max 100KB)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Resolve the icon from the site's first URL
        #[arg(long)]
        auto: bool,
        /// Remove the icon
        #[arg(long)]
        remove: bool,
    },
}
