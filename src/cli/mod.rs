pub mod commands;
pub mod output;

use crate::errors::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "pstack")]
#[command(about = "Linear stacks of dependent git branches")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a stack on top of ROOT
    Init {
        /// Branch at the bottom of the stack
        root: String,
    },

    /// Forget the stack (branches are kept)
    Deinit {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show the stack with each patch's status
    Show,

    /// Move up the stack, rebasing the next patch if needed
    Push {
        /// Create a new patch above the current position
        #[arg(long, value_name = "NAME", conflicts_with = "branch")]
        new: Option<String>,

        /// Track an existing branch above the current position
        #[arg(long, value_name = "NAME")]
        branch: Option<String>,
    },

    /// Move down the stack
    Pop {
        /// Go straight to the root
        #[arg(long)]
        all: bool,
    },

    /// Show the changes a patch adds over its parent
    Diff {
        /// Patch to diff (defaults to the current branch)
        patch: Option<String>,
    },

    /// List the commits a patch adds over its parent
    Log {
        /// Patch to list (defaults to the current branch)
        patch: Option<String>,
    },

    /// Stop tracking the top patch (the branch is kept)
    Untrack {
        /// Patch to untrack
        name: String,
    },

    /// Upload the current patch for review
    Arcdiff {
        /// Existing revision to update
        #[arg(long, value_name = "REV")]
        update: Option<String>,
    },

    /// Land the current patch
    Arcland,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., review.diff_command)
        key: String,
        /// Configuration value
        value: String,
        /// Write to the user-wide configuration
        #[arg(long)]
        global: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
        /// Read the user-wide configuration only
        #[arg(long)]
        global: bool,
    },

    /// List all configuration values
    List {
        /// Read the user-wide configuration only
        #[arg(long)]
        global: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        self.setup_logging();

        if self.no_color {
            console::set_colors_enabled(false);
        }

        match self.command {
            Commands::Init { root } => commands::init::run(&root).await,
            Commands::Deinit { yes } => commands::deinit::run(yes).await,
            Commands::Show => commands::show::show().await,
            Commands::Push { new, branch } => commands::navigate::push(new, branch).await,
            Commands::Pop { all } => commands::navigate::pop(all).await,
            Commands::Diff { patch } => commands::show::diff(patch).await,
            Commands::Log { patch } => commands::show::log(patch).await,
            Commands::Untrack { name } => commands::navigate::untrack(&name).await,
            Commands::Arcdiff { update } => commands::review::arcdiff(update).await,
            Commands::Arcland => commands::review::arcland().await,
            Commands::Config { action } => commands::config::run(action).await,
            Commands::Completions { shell } => commands::completions::generate_completions(shell),
        }
    }

    fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .without_time();

        if self.no_color {
            subscriber.with_ansi(false).init();
        } else {
            subscriber.init();
        }
    }
}
