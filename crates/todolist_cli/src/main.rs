//! CLI probe for the persistence core.
//!
//! # Responsibility
//! - Load a database file and print a per-account summary.
//! - Optionally re-save it under another name, converting between formats.

use clap::{Arg, ArgMatches, Command, value_parser};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use todolist_core::{default_log_level, init_logging, load_accounts, save_accounts, Accounts};

fn cli() -> Command {
    Command::new("todolist_cli")
        .version(todolist_core::core_version())
        .about("Inspect and convert TodoList database files")
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Database to load (`.csv` for records, anything else for XML)"),
        )
        .arg(
            Arg::new("output")
                .value_parser(value_parser!(PathBuf))
                .help("Where to save the loaded database; format follows the file name"),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_parser(value_parser!(String))
                .help("Absolute directory for rotated log files (logging is off without it)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Log level; defaults to debug in debug builds and info otherwise"),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    println!("todolist_core ping={}", todolist_core::ping());
    println!("todolist_core version={}", todolist_core::core_version());

    start_logging(&matches);

    let Some(input) = matches.get_one::<PathBuf>("input") else {
        return ExitCode::from(2);
    };
    let accounts = match load_accounts(input) {
        Ok(accounts) => accounts,
        Err(err) => {
            eprintln!("failed to load `{}`: {err}", input.display());
            return ExitCode::FAILURE;
        }
    };
    print_summary(&accounts);

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        if let Err(err) = save_accounts(output, &accounts) {
            eprintln!("failed to save `{}`: {err}", output.display());
            return ExitCode::FAILURE;
        }
        info!(
            "event=cli_convert module=cli status=ok accounts={}",
            accounts.len()
        );
        println!("saved {} account(s) to {}", accounts.len(), output.display());
    }
    ExitCode::SUCCESS
}

fn start_logging(matches: &ArgMatches) {
    let Some(log_dir) = matches.get_one::<String>("log-dir") else {
        return;
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or_else(|| default_log_level());
    if let Err(err) = init_logging(level, log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn print_summary(accounts: &Accounts) {
    for account in accounts {
        let tasks: usize = account.task_lists().iter().map(|list| list.len()).sum();
        println!(
            "account={} lists={} tasks={}",
            account.name(),
            account.task_lists().len(),
            tasks
        );
    }
    for issue in accounts.consistency_issues() {
        println!("warning: {issue}");
    }
}
