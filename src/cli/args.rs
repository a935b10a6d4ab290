//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::iter::TraversalOrder;

/// Height-balanced (AVL) tree: insert keys, traverse, render and check
#[derive(Parser, Debug)]
#[command(name = "avltree")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file applied on top of the global and local config
    #[arg(short, long, global = true, env = "AVLTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Keys to insert, in insertion order
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Keys (negative values allowed); duplicates are ignored
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub keys: Vec<i64>,

    /// Maximum number of nodes, unbounded by default
    #[arg(long)]
    pub capacity: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert keys and print them in traversal order
    Traverse {
        #[command(flatten)]
        keys: KeyArgs,

        /// inorder, preorder or postorder (default from config)
        #[arg(short, long)]
        order: Option<TraversalOrder>,

        /// Separator printed between keys (default from config)
        #[arg(short, long)]
        separator: Option<String>,
    },

    /// Insert keys and show the resulting tree
    Tree {
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Insert keys and verify ordering, heights and balance
    Check {
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Build the 10 20 30 40 50 25 tree and print its pre-order
    Demo,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,
    /// Show config file locations
    Path,
}
