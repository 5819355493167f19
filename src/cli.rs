//! Command Line Interface
//!
//! Argument definitions and dispatch. Configuration is resolved before any
//! subcommand runs, so a missing token stops every command, `info` included,
//! before a request is made.

use crate::config::Config;
use crate::env::Environment;
use crate::error::{Result, VarsError};
use crate::gitlab::client::GitlabClient;
use crate::gitlab::variables::{self, Clock, DEFAULT_TIMESTAMP_FORMAT};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Read and update GitLab CI/CD project variables
#[derive(Parser, Debug)]
#[command(name = "gitlab-vars", version, about, long_about = None)]
pub struct Cli {
    /// Log level for debugging (logs go to stderr unless --log-file is set)
    #[arg(long, value_enum, default_value = "off", global = true)]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the token (masked), its type and the API URL
    Info,

    /// Print a variable's value
    #[command(override_usage = "gitlab-vars get [OPTIONS] [PROJECT] <KEY>")]
    Get(TargetArgs),

    /// Create a new variable
    #[command(override_usage = "gitlab-vars create [OPTIONS] [PROJECT] <KEY> <VALUE>")]
    Create(TargetArgs),

    /// Replace an existing variable's value
    #[command(override_usage = "gitlab-vars update [OPTIONS] [PROJECT] <KEY> <VALUE>")]
    Update(TargetArgs),

    /// Add one to an integer variable
    #[command(override_usage = "gitlab-vars incr [OPTIONS] [PROJECT] <KEY>")]
    Incr(TargetArgs),

    /// Subtract one from an integer variable
    #[command(override_usage = "gitlab-vars decr [OPTIONS] [PROJECT] <KEY>")]
    Decr(TargetArgs),

    /// Set a variable to the current local time
    #[command(override_usage = "gitlab-vars timestamp [OPTIONS] [PROJECT] <KEY>")]
    Timestamp(TimestampArgs),
}

/// Project and positional arguments shared by the variable commands
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Project ID or path (default: GITLAB_VARS_PROJECT_ID, then CI_PROJECT_ID)
    #[arg(long)]
    pub project: Option<String>,

    /// [PROJECT] followed by the command's arguments
    #[arg(
        value_name = "ARGS",
        required = true,
        num_args = 1..=3,
        allow_negative_numbers = true
    )]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TimestampArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// strftime format of the stored value
    #[arg(long, default_value = DEFAULT_TIMESTAMP_FORMAT)]
    pub format: String,
}

/// Arguments after project resolution
#[derive(Debug, PartialEq, Eq)]
struct Target<'a> {
    project: Option<&'a str>,
    rest: &'a [String],
}

impl TargetArgs {
    /// Split off the optional leading project argument.
    ///
    /// `arity` is the number of arguments the command takes besides the
    /// project. One extra argument is the project; giving it both ways is an
    /// error.
    fn split(&self, command: &str, arity: usize) -> Result<Target<'_>> {
        let args = self.args.as_slice();
        match args.len() {
            n if n == arity => Ok(Target {
                project: self.project.as_deref(),
                rest: args,
            }),
            n if n == arity + 1 => {
                if self.project.is_some() {
                    return Err(VarsError::usage(format!(
                        "{}: project given both as argument and with --project",
                        command
                    )));
                }
                Ok(Target {
                    project: Some(args[0].as_str()),
                    rest: &args[1..],
                })
            }
            n => Err(VarsError::usage(format!(
                "{}: expected {} or {} arguments, got {}",
                command,
                arity,
                arity + 1,
                n
            ))),
        }
    }
}

/// Variable operation selected by a subcommand
#[derive(Debug, Clone, Copy)]
enum Operation<'a> {
    Get,
    Create,
    Update,
    Incr,
    Decr,
    Timestamp { format: &'a str },
}

/// Run a parsed command and return the lines to print on stdout
pub async fn run<E, C>(cli: &Cli, env: &E, clock: &C) -> Result<Vec<String>>
where
    E: Environment + ?Sized,
    C: Clock,
{
    let config = Config::resolve(env)?;

    let (name, target_args, arity, operation) = match &cli.command {
        Command::Info => return Ok(config.info_lines()),
        Command::Get(args) => ("get", args, 1, Operation::Get),
        Command::Create(args) => ("create", args, 2, Operation::Create),
        Command::Update(args) => ("update", args, 2, Operation::Update),
        Command::Incr(args) => ("incr", args, 1, Operation::Incr),
        Command::Decr(args) => ("decr", args, 1, Operation::Decr),
        Command::Timestamp(args) => (
            "timestamp",
            &args.target,
            1,
            Operation::Timestamp {
                format: &args.format,
            },
        ),
    };

    let target = target_args.split(name, arity)?;
    let project = config.project_for(target.project)?;
    let key = target.rest[0].as_str();
    if key.is_empty() {
        return Err(VarsError::usage(format!("{}: variable key is empty", name)));
    }

    if let Operation::Timestamp { format } = operation {
        variables::validate_timestamp_format(format)?;
    }

    tracing::info!("{} {} in project {}", name, key, project);

    let client = GitlabClient::new(config, cli.timeout.map(Duration::from_secs))?;

    match operation {
        Operation::Get => {
            let value = variables::get_variable(&client, &project, key).await?;
            return Ok(vec![value]);
        }
        Operation::Create => {
            variables::create_variable(&client, &project, key, &target.rest[1]).await?;
        }
        Operation::Update => {
            variables::update_variable(&client, &project, key, &target.rest[1]).await?;
        }
        Operation::Incr => {
            variables::increment_variable(&client, &project, key).await?;
        }
        Operation::Decr => {
            variables::decrement_variable(&client, &project, key).await?;
        }
        Operation::Timestamp { format } => {
            variables::stamp_variable(&client, &project, key, format, clock).await?;
        }
    }

    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gitlab-vars").chain(args.iter().copied())).unwrap()
    }

    fn target(cli: &Cli) -> &TargetArgs {
        match &cli.command {
            Command::Get(a) | Command::Create(a) | Command::Update(a) => a,
            Command::Incr(a) | Command::Decr(a) => a,
            Command::Timestamp(a) => &a.target,
            Command::Info => panic!("info has no target"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_key_only_uses_flag_project() {
        let cli = parse(&["get", "--project", "42", "BUILD"]);
        let split = target(&cli).split("get", 1).unwrap();
        assert_eq!(split.project, Some("42"));
        assert_eq!(split.rest, ["BUILD".to_string()]);
    }

    #[test]
    fn test_positional_project() {
        let cli = parse(&["create", "group/app", "KEY", "VALUE"]);
        let split = target(&cli).split("create", 2).unwrap();
        assert_eq!(split.project, Some("group/app"));
        assert_eq!(split.rest, ["KEY".to_string(), "VALUE".to_string()]);
    }

    #[test]
    fn test_no_project_defers_to_config() {
        let cli = parse(&["incr", "COUNTER"]);
        let split = target(&cli).split("incr", 1).unwrap();
        assert_eq!(split.project, None);
    }

    #[test]
    fn test_project_given_twice_is_rejected() {
        let cli = parse(&["update", "--project", "1", "2", "KEY", "VALUE"]);
        let err = target(&cli).split("update", 2).unwrap_err();
        assert!(matches!(err, VarsError::Usage(_)));
    }

    #[test]
    fn test_wrong_argument_count() {
        let cli = parse(&["get", "a", "b", "c"]);
        assert!(target(&cli).split("get", 1).is_err());

        let cli = parse(&["create", "KEY"]);
        assert!(target(&cli).split("create", 2).is_err());
    }

    #[test]
    fn test_timestamp_default_format() {
        let cli = parse(&["timestamp", "LAST_RUN"]);
        match cli.command {
            Command::Timestamp(args) => assert_eq!(args.format, DEFAULT_TIMESTAMP_FORMAT),
            _ => panic!("expected timestamp"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["get", "KEY", "--timeout", "5", "--log-level", "debug"]);
        assert_eq!(cli.timeout, Some(5));
        assert!(cli.log_level.to_tracing_level().is_some());
    }
}
