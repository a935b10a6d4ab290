use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::arena::AvlTree;
use crate::cli::args::{Cli, Commands, ConfigCommands, KeyArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::iter::TraversalOrder;
use crate::tree_traits::TreeRender;

/// Insertion sequence that exercises all four rotation cases.
pub const DEMO_KEYS: [i64; 6] = [10, 20, 30, 40, 50, 25];

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = || load_settings(cli.config.as_deref());
    match &cli.command {
        Some(Commands::Traverse {
            keys,
            order,
            separator,
        }) => _traverse(&settings()?, keys, *order, separator.as_deref()),
        Some(Commands::Tree { keys }) => _tree(&settings()?, keys),
        Some(Commands::Check { keys }) => _check(&settings()?, keys),
        Some(Commands::Demo) => _demo(),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(&settings()?),
            ConfigCommands::Path => _config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".into(),
        )),
    }
}

fn load_settings(explicit: Option<&Path>) -> CliResult<Settings> {
    let cwd = std::env::current_dir().ok();
    Ok(Settings::load(cwd.as_deref(), explicit)?)
}

/// Inserts `keys` in order; `--capacity` overrides the configured bound.
#[instrument(level = "debug", skip(keys), fields(n = keys.len()))]
pub fn build_tree(keys: &[i64], capacity: Option<usize>) -> CliResult<AvlTree<i64>> {
    let mut tree = match capacity {
        Some(0) => {
            return Err(CliError::InvalidArgs("capacity must be at least 1".into()));
        }
        Some(n) => AvlTree::bounded(n),
        None => AvlTree::new(),
    };
    for &key in keys {
        if !tree.insert(key)? {
            debug!(key, "duplicate ignored");
        }
    }
    Ok(tree)
}

pub fn format_traversal(tree: &AvlTree<i64>, order: TraversalOrder, separator: &str) -> String {
    tree.traverse(order).join(separator)
}

fn tree_for(settings: &Settings, args: &KeyArgs) -> CliResult<AvlTree<i64>> {
    build_tree(&args.keys, args.capacity.or(settings.capacity))
}

#[instrument(level = "debug", skip(settings))]
fn _traverse(
    settings: &Settings,
    keys: &KeyArgs,
    order: Option<TraversalOrder>,
    separator: Option<&str>,
) -> CliResult<()> {
    let tree = tree_for(settings, keys)?;
    let order = order.unwrap_or(settings.order);
    let separator = separator.unwrap_or(&settings.separator);
    output::info(&format_traversal(&tree, order, separator));
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn _tree(settings: &Settings, keys: &KeyArgs) -> CliResult<()> {
    let tree = tree_for(settings, keys)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn _check(settings: &Settings, keys: &KeyArgs) -> CliResult<()> {
    let tree = tree_for(settings, keys)?;
    if let Err(e) = tree.validate() {
        output::failure(&e);
        return Err(e.into());
    }
    output::success("ordering, heights and balance hold");
    output::detail(&format!("keys:   {}", tree.len()));
    output::detail(&format!("height: {}", tree.tree_height()));
    if let Some(root) = tree.root_key() {
        output::detail(&format!("root:   {}", root));
    }
    Ok(())
}

#[instrument(level = "debug")]
fn _demo() -> CliResult<()> {
    let tree = build_tree(&DEMO_KEYS, None)?;
    output::header(&"Constructed AVL tree:");
    output::info(&tree.to_tree_string());
    output::info(&format!(
        "Pre-order traversal of the constructed AVL tree: {}",
        format_traversal(&tree, TraversalOrder::PreOrder, " ")
    ));
    let released = tree.destroy();
    debug!(released = released.len(), "demo tree released");
    Ok(())
}

fn _config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_path() -> CliResult<()> {
    match global_config_path() {
        Some(p) => output::detail(&format!("global: {}", p.display())),
        None => output::detail(&"global: (no config directory)"),
    }
    let cwd = std::env::current_dir().map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    output::detail(&format!("local:  {}", local_config_path(&cwd).display()));
    Ok(())
}
