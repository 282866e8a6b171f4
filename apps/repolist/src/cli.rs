//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

/// Base argument that requests a full audit instead of a diff.
pub const NO_BASE: &str = "none";

#[derive(Parser)]
#[command(
    name = "repolist",
    version,
    about = "Check, sort and clean an overlay repositories.xml",
    long_about = "repolist — maintenance tool for the overlay registry (repositories.xml).\n\nConfiguration precedence: CLI > repolist.toml > defaults.",
    after_help = "Examples:\n  repolist check base/repositories.xml files/repositories.xml --output github\n  repolist check none files/repositories.xml --skip-email\n  repolist sort files/repositories.xml --write\n  repolist strip-insecure files/repositories.xml > secure.xml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Enable debug logging on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current repolist version.")]
    Version,
    /// Validate added overlays
    #[command(
        about = "Validate overlays added since a base revision",
        long_about = "Check owner emails against the user directory and the sort position of every overlay in CURRENT that is missing from BASE. Pass `none` as BASE to audit the whole list. Exits 1 when any error is reported.",
        after_help = "Examples:\n  repolist check old.xml new.xml\n  repolist check none repositories.xml --output json"
    )]
    Check {
        #[arg(help = "Accepted registry, or `none` for a full audit")]
        base: String,
        #[arg(help = "Proposed registry")]
        current: String,
        #[arg(long, help = "Output mode: human|github|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "User directory base URL (default: https://bugs.gentoo.org)")]
        directory_url: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip owner email lookups")]
        skip_email: bool,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Sort repo entries by name
    #[command(
        about = "Sort overlays by name",
        long_about = "Sort <repo> entries case-insensitively, keep comments in place, move vim modelines last, and pretty-print. Writes to stdout unless --write or --check is given.",
        after_help = "Examples:\n  repolist sort repositories.xml > sorted.xml\n  repolist sort repositories.xml --check"
    )]
    Sort {
        #[arg(help = "Path to repositories.xml")]
        path: String,
        #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "check", help = "Rewrite the file in place")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if the file is not normalized")]
        check: bool,
    },
    /// Remove insecure source links
    #[command(
        about = "Remove insecure <source> links",
        long_about = "Drop every <source> whose URL matches the insecure pattern (default: ^git:). The result is pretty-printed the same way `repolist sort` prints, so the original layout is not kept. Writes to stdout unless --write is given; removed links are listed on stderr."
    )]
    StripInsecure {
        #[arg(help = "Path to repositories.xml")]
        path: String,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Rewrite the file in place")]
        write: bool,
        #[arg(long, help = "Regex for insecure URLs (default: ^git:)")]
        pattern: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// List overlays and their sources
    #[command(
        about = "List overlay sources",
        long_about = "Print each overlay name with its source links, flagging insecure ones."
    )]
    Sources {
        #[arg(help = "Path to repositories.xml")]
        path: String,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Regex for insecure URLs (default: ^git:)")]
        pattern: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
}
