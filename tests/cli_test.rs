//! CLI argument parsing and command helpers

use clap::{CommandFactory, Parser};
use rstest::rstest;

use avltree::cli::args::{Cli, Commands, ConfigCommands};
use avltree::cli::commands::{build_tree, format_traversal, DEMO_KEYS};
use avltree::cli::CliError;
use avltree::{exitcode, TraversalOrder};

#[test]
fn verify_cli() {
    Cli::command().debug_assert();
}

#[test]
fn given_traverse_with_negative_keys_when_parsing_then_keys_kept_in_order() {
    let cli = Cli::try_parse_from(["avltree", "traverse", "-o", "inorder", "--", "-5", "3", "-12"]).unwrap();
    match cli.command {
        Some(Commands::Traverse { keys, order, separator }) => {
            assert_eq!(keys.keys, vec![-5, 3, -12]);
            assert_eq!(order, Some(TraversalOrder::InOrder));
            assert_eq!(separator, None);
            assert_eq!(keys.capacity, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn given_negative_keys_without_separator_when_parsing_then_accepted() {
    let cli = Cli::try_parse_from(["avltree", "check", "--capacity", "4", "1", "-2"]).unwrap();
    match cli.command {
        Some(Commands::Check { keys }) => {
            assert_eq!(keys.keys, vec![1, -2]);
            assert_eq!(keys.capacity, Some(4));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[rstest]
#[case::missing_keys(&["avltree", "tree"])]
#[case::not_a_number(&["avltree", "tree", "ten"])]
#[case::bad_order(&["avltree", "traverse", "-o", "sideways", "1"])]
fn given_invalid_arguments_when_parsing_then_rejected(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_applied() {
    let cli = Cli::try_parse_from(["avltree", "config", "show", "-dd"]).unwrap();
    assert_eq!(cli.debug, 2);
    assert!(matches!(
        cli.command,
        Some(Commands::Config { command: ConfigCommands::Show })
    ));
}

#[test]
fn given_demo_keys_when_built_then_reference_preorder() {
    let tree = build_tree(&DEMO_KEYS, None).unwrap();
    assert_eq!(
        format_traversal(&tree, TraversalOrder::PreOrder, " "),
        "30 20 10 25 40 50"
    );
    assert_eq!(
        format_traversal(&tree, TraversalOrder::InOrder, " "),
        "10 20 25 30 40 50"
    );
}

#[test]
fn given_capacity_exhausted_when_building_then_unavailable_exit_code() {
    let err = build_tree(&[1, 2, 3], Some(1)).unwrap_err();
    assert!(matches!(err, CliError::Tree(_)));
    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
}
