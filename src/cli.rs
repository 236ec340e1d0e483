use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config;
use crate::projects::{FetchOptions, HttpExecutor, SnapshotAssembler};

#[derive(Debug, PartialEq)]
pub enum Command {
    Fields {
        project_id: String,
        first: Option<u32>,
        filter: Option<String>,
        view: Option<u64>,
    },
    Views {
        project_id: String,
    },
    View {
        project_id: String,
        number: u64,
    },
    Help,
}

/// Parse everything after the binary name.
///
/// Supported forms:
///   project-lens fields <project-id> [--first N] [--filter EXPR] [--view N]
///   project-lens views <project-id>
///   project-lens view <project-id> <number>
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match sub.as_str() {
        "fields" => parse_fields_args(rest),
        "views" => match rest {
            [project_id] => Ok(Command::Views {
                project_id: project_id.clone(),
            }),
            _ => bail!("Usage: project-lens views <project-id>"),
        },
        "view" => match rest {
            [project_id, number] => Ok(Command::View {
                project_id: project_id.clone(),
                number: parse_number(number, "view number")?,
            }),
            _ => bail!("Usage: project-lens view <project-id> <number>"),
        },
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command: {other}. Run `project-lens help` for usage."),
    }
}

fn parse_fields_args(args: &[String]) -> Result<Command> {
    let mut project_id: Option<String> = None;
    let mut first = None;
    let mut filter = None;
    let mut view = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--first" | "--filter" | "--view") => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for {flag}");
                };
                match flag {
                    "--first" => {
                        let n = parse_number(value, "--first")?;
                        first = Some(u32::try_from(n).context("--first is too large")?);
                    }
                    "--filter" => filter = Some(value.clone()),
                    _ => view = Some(parse_number(value, "--view")?),
                }
            }
            other if other.starts_with("--") => bail!("Unknown flag: {other}"),
            other => {
                if project_id.is_some() {
                    bail!("Unexpected argument: {other}");
                }
                project_id = Some(other.to_string());
            }
        }
        i += 1;
    }

    let Some(project_id) = project_id else {
        bail!("Usage: project-lens fields <project-id> [--first N] [--filter EXPR] [--view N]");
    };
    if filter.is_some() && view.is_some() {
        bail!("--filter and --view cannot be combined; a view brings its own filter");
    }

    Ok(Command::Fields {
        project_id,
        first,
        filter,
        view,
    })
}

fn parse_number(value: &str, what: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("Invalid {what}: {value}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command) -> Result<()> {
    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let config = config::load_config()?;
    let token = config::resolve_token(&config).await?;
    let executor = Arc::new(HttpExecutor::new(config.api_url(), token));
    let assembler = SnapshotAssembler::new(executor)
        .with_limits(config.limits)
        .with_failure_policy(config.on_introspection_failure);

    match command {
        Command::Fields {
            project_id,
            first,
            view: Some(number),
            ..
        } => {
            let snapshot = assembler.fetch_view_snapshot(&project_id, number, first).await?;
            print_json(&snapshot)
        }
        Command::Fields {
            project_id,
            first,
            filter,
            view: None,
        } => {
            let options = FetchOptions {
                first,
                view_filter: filter,
            };
            let snapshot = assembler.fetch_project_fields(&project_id, options).await?;
            print_json(&snapshot)
        }
        Command::Views { project_id } => {
            let views = assembler.fetch_project_views(&project_id).await?;
            print_json(&views)
        }
        Command::View { project_id, number } => {
            match assembler.get_project_view_details(&project_id, number).await? {
                Some(detail) => print_json(&detail),
                None => bail!("View {number} not found in project {project_id}"),
            }
        }
        Command::Help => Ok(()),
    }
}

pub fn print_help() {
    println!("project-lens: typed snapshots of GitHub Projects\n");
    println!("USAGE:");
    println!("  project-lens fields <project-id>       Fetch fields and items as JSON");
    println!("  project-lens views <project-id>        List the project's views");
    println!("  project-lens view <project-id> <n>     Show one view's definition");
    println!();
    println!("FIELDS OPTIONS:");
    println!("  --first <n>       Item page size");
    println!("  --filter <expr>   Item filter, passed through verbatim");
    println!("  --view <n>        Scope items and fields to a view");
    println!();
    println!("Set RUST_LOG=project_lens=debug for diagnostics.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn parse_fields_with_options() {
        let cmd = parse_args(&args(&["fields", "PVT_1", "--first", "25", "--filter", "is:open"]))
            .unwrap();
        assert_eq!(
            cmd,
            Command::Fields {
                project_id: "PVT_1".into(),
                first: Some(25),
                filter: Some("is:open".into()),
                view: None,
            }
        );
    }

    #[test]
    fn parse_fields_flags_before_id() {
        let cmd = parse_args(&args(&["fields", "--view", "3", "PVT_1"])).unwrap();
        assert_eq!(
            cmd,
            Command::Fields {
                project_id: "PVT_1".into(),
                first: None,
                filter: None,
                view: Some(3),
            }
        );
    }

    #[test]
    fn parse_fields_requires_project_id() {
        assert!(parse_args(&args(&["fields"])).is_err());
        assert!(parse_args(&args(&["fields", "--first", "5"])).is_err());
    }

    #[test]
    fn parse_missing_flag_value_fails() {
        let err = parse_args(&args(&["fields", "PVT_1", "--first"])).unwrap_err();
        assert!(err.to_string().contains("--first"));
    }

    #[test]
    fn parse_rejects_bad_numbers_and_unknown_flags() {
        assert!(parse_args(&args(&["fields", "PVT_1", "--first", "many"])).is_err());
        assert!(parse_args(&args(&["fields", "PVT_1", "--verbose"])).is_err());
        assert!(parse_args(&args(&["fields", "PVT_1", "PVT_2"])).is_err());
    }

    #[test]
    fn filter_and_view_are_exclusive() {
        assert!(parse_args(&args(&["fields", "PVT_1", "--filter", "x", "--view", "1"])).is_err());
    }

    #[test]
    fn parse_views_and_view() {
        assert_eq!(
            parse_args(&args(&["views", "PVT_1"])).unwrap(),
            Command::Views {
                project_id: "PVT_1".into()
            }
        );
        assert_eq!(
            parse_args(&args(&["view", "PVT_1", "2"])).unwrap(),
            Command::View {
                project_id: "PVT_1".into(),
                number: 2
            }
        );
        assert!(parse_args(&args(&["view", "PVT_1"])).is_err());
    }

    #[test]
    fn filter_keeps_special_characters() {
        let cmd = parse_args(&args(&["fields", "PVT_1", "--filter", "label:\"needs review\""]))
            .unwrap();
        let Command::Fields { filter, .. } = cmd else {
            panic!("expected fields command");
        };
        assert_eq!(filter.as_deref(), Some("label:\"needs review\""));
    }

    #[test]
    fn unknown_command_fails() {
        assert!(parse_args(&args(&["sync"])).is_err());
    }
}
