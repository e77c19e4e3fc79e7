// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exec_subcommand_parses_platform_and_scripts() {
    let cli = Cli::try_parse_from([
        "pyjob", "exec", "-p", "local", "-t", "2", "a.sh", "b.sh",
    ])
    .unwrap();
    match cli.command {
        Commands::Exec(args) => {
            assert_eq!(args.platform.as_deref(), Some("local"));
            assert_eq!(args.processes, Some(2));
            assert_eq!(args.scripts, vec!["a.sh", "b.sh"]);
        }
        Commands::Conf(_) => panic!("expected Exec"),
    }
}

#[test]
fn conf_subcommand_parses_key_value_pairs() {
    let cli = Cli::try_parse_from(["pyjob", "conf", "platform:lsf", "queue:None"]).unwrap();
    match cli.command {
        Commands::Conf(args) => {
            assert_eq!(args.pairs, vec!["platform:lsf", "queue:None"]);
        }
        Commands::Exec(_) => panic!("expected Conf"),
    }
}

#[test]
fn verbose_flag_is_repeatable() {
    let cli = Cli::try_parse_from(["pyjob", "-vvv", "conf", "platform:local"]).unwrap();
    assert_eq!(cli.verbose, 3);
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["pyjob"]).is_err());
}
