use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jotter", bin_name = "jotter", version, disable_help_subcommand = true)]
#[command(about = "Notes with formatting and checklists, from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (overrides configuration)
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub dir: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a note
    New {
        /// Note body
        text: Option<String>,

        #[arg(short, long)]
        title: Option<String>,
    },

    /// List notes (active ones by default)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: ListFilter,
    },

    /// Show a note with its checklists
    Show { id: String },

    /// Change a note's title or body
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Replacement body
        #[arg(long)]
        text: Option<String>,
    },

    /// Toggle a style over a character range of the body
    Format {
        id: String,
        /// First character (0-based)
        start: usize,
        /// One past the last character
        end: usize,
        /// bold, italic, underline, strikethrough, h1, h2 or h3
        style: String,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagCommands,
    },

    /// Manage checklists
    Check {
        #[command(subcommand)]
        action: CheckCommands,
    },

    /// Pin a note to the top of the list
    Pin { id: String },

    Unpin { id: String },

    Archive { id: String },

    Unarchive { id: String },

    /// Move a note to the trash
    #[command(alias = "rm")]
    Delete { id: String },

    /// Bring a note back from the trash
    Restore { id: String },

    /// Permanently delete a note
    Purge { id: String },

    /// Permanently delete every trashed note
    EmptyTrash,

    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct ListFilter {
    #[arg(long)]
    pub archived: bool,

    #[arg(long)]
    pub trashed: bool,

    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    Add { id: String, tag: String },
    #[command(alias = "remove")]
    Rm { id: String, tag: String },
}

/// Items are addressed by their number in `jotter show`.
#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Add a checklist, or append to an existing one with --to
    Add {
        id: String,
        #[arg(required = true)]
        items: Vec<String>,
        /// Append to the checklist holding this item number
        #[arg(long, value_name = "ITEM")]
        to: Option<usize>,
    },
    Toggle { id: String, item: usize },
    Edit { id: String, item: usize, text: String },
    Rm { id: String, item: usize },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
