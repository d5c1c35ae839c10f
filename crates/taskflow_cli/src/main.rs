//! `taskflow` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration from the environment plus flags, open the store,
//!   and start logging before any command runs.
//! - Print command results as JSON on stdout; diagnostics go to the log.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use taskflow_core::config::parse_monitor_interval;
use taskflow_core::{Priority, Role, TaskId, UserId};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Team task manager with least-loaded assignment", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// SQLite database file; omitted means a seeded in-memory store
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; omitted logs to stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Email of the acting user
    #[arg(long = "as", global = true, env = "TASKFLOW_USER")]
    pub actor: Option<String>,

    /// Password of the acting user
    #[arg(long, global = true, env = "TASKFLOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create the default team in an empty store
    Seed,

    /// Register a new account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// lead or member
        #[arg(long, default_value = "member", value_parser = parse_role)]
        role: Role,

        /// Preferred work domain
        #[arg(long)]
        domain: Option<String>,
    },

    /// Verify the acting user's credentials and print the session
    Login,

    /// Work domains
    Domains {
        #[command(subcommand)]
        command: DomainCommand,
    },

    /// Set the acting user's preferred domain
    SetDomain { domain: String },

    /// List users visible to the acting user
    Users {
        /// Only members preferring this domain
        #[arg(long)]
        domain: Option<String>,
    },

    /// Tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Dashboard counters for the acting user
    Stats,

    /// Run one deadline sweep now
    Sweep,

    /// Run deadline sweeps periodically until stdin receives a line or closes
    Monitor {
        /// Seconds between sweeps (1..=3600)
        #[arg(long, value_parser = parse_interval)]
        interval: Option<Duration>,
    },
}

#[derive(Subcommand)]
pub(crate) enum DomainCommand {
    /// List all domains
    List,

    /// Create a domain (leads only)
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum TaskCommand {
    /// Create a task and auto-assign it (leads only)
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(long)]
        domain: String,

        #[arg(short, long)]
        description: Option<String>,

        /// low, medium, high or urgent
        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: Priority,

        /// Absolute deadline in epoch milliseconds
        #[arg(long, conflicts_with = "due_in_hours")]
        deadline: Option<i64>,

        /// Deadline relative to now
        #[arg(long, default_value_t = 24)]
        due_in_hours: i64,
    },

    /// List tasks visible to the acting user
    List {
        #[arg(long)]
        assigned_to: Option<UserId>,

        #[arg(long)]
        domain: Option<String>,
    },

    /// Show one task
    Show { id: TaskId },

    /// Mark a task completed
    Complete { id: TaskId },

    /// Move a task back to pending
    Reopen { id: TaskId },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role `{value}`; expected lead|member"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value)
        .ok_or_else(|| format!("unknown priority `{value}`; expected low|medium|high|urgent"))
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    parse_monitor_interval(value).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, TaskCommand};
    use clap::{CommandFactory, Parser};
    use std::time::Duration;
    use taskflow_core::Priority;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn task_create_defaults() {
        let cli = Cli::parse_from([
            "taskflow", "--as", "lead@example.com", "tasks", "create", "-t", "Audit", "--domain",
            "Research",
        ]);
        assert_eq!(cli.global.actor.as_deref(), Some("lead@example.com"));
        match cli.command {
            Command::Tasks {
                command:
                    TaskCommand::Create {
                        priority,
                        deadline,
                        due_in_hours,
                        ..
                    },
            } => {
                assert_eq!(priority, Priority::Medium);
                assert_eq!(deadline, None);
                assert_eq!(due_in_hours, 24);
            }
            _ => panic!("expected tasks create"),
        }
    }

    #[test]
    fn monitor_interval_is_range_checked() {
        let cli = Cli::try_parse_from(["taskflow", "monitor", "--interval", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Monitor {
                interval: Some(interval)
            } if interval == Duration::from_secs(5)
        ));
        assert!(Cli::try_parse_from(["taskflow", "monitor", "--interval", "0"]).is_err());
    }
}
