// crates/tl_cli/src/args.rs
//
// Command-line surface. Ids, tiers and post times are parsed by their
// `FromStr` impls, so malformed values are rejected by clap (exit 2).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tl_core::{ItemId, PostTime, ScopeId, Tier, VoterId};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "tierlist",
    version,
    disable_help_subcommand = true,
    about = "Community tier-list voting: record votes and build ranked tier lists per server"
)]
pub struct Args {
    /// Directory holding one sub-directory of JSON documents per scope.
    #[arg(long, env = "TIERLIST_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Also write logs to a daily rotated file in this directory.
    #[arg(long, env = "TIERLIST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Only log warnings and errors (unless RUST_LOG says otherwise).
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Record (or replace) a voter's tier for an item.
    Vote {
        #[arg(long)]
        scope: ScopeId,
        #[arg(long)]
        voter: VoterId,
        #[arg(long)]
        item: ItemId,
        /// One of SSS, S+, S, A, B, C, D.
        #[arg(long)]
        tier: Tier,
    },
    /// Print a scope's tier list.
    Show {
        #[arg(long)]
        scope: ScopeId,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Recompute first if votes or config changed since the last save.
        #[arg(long)]
        fresh: bool,
    },
    /// Rebuild one scope's tier list, or every stale one.
    Recompute {
        #[arg(long)]
        scope: Option<ScopeId>,
    },
    /// Set where and when a scope's daily song is announced.
    Setup {
        #[arg(long)]
        scope: ScopeId,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// 24h `HH:MM`.
        #[arg(long)]
        post_time: Option<PostTime>,
    },
    /// Print a scope's effective tier config, optionally replacing it first.
    Config {
        #[arg(long)]
        scope: ScopeId,
        /// JSON file with the new config.
        #[arg(long)]
        set: Option<PathBuf>,
    },
    /// Pick the scope's next daily song and advance its rotation.
    Next {
        #[arg(long)]
        scope: ScopeId,
        #[arg(long, env = "TIERLIST_CATALOG")]
        catalog: PathBuf,
    },
    /// List items that already have votes and can be voted on again.
    Revotable {
        #[arg(long)]
        scope: ScopeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Csv,
    Json,
}
