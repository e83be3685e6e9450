// rowlink CLI - group CSV rows that share an email or phone number

mod exit_codes;
mod group;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{group_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use rowlink_grouping::GroupError;

#[derive(Parser)]
#[command(name = "rowlink")]
#[command(about = "Assign a shared group id to CSV rows that refer to the same person")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group rows of a CSV file and write it back with a leading UUID column
    #[command(after_help = "\
Examples:
  rowlink group people.csv --match-as email --field Email
  rowlink group people.csv --match-as email --field Email1 --field Email2
  rowlink group people.csv --match-as email_or_phone --field Email=email --field Phone=phone
  rowlink group people.csv --config grouping.toml -o grouped.csv
  rowlink group people.csv --config grouping.toml -o - --quiet | head")]
    Group {
        /// Input CSV file (first row is the header)
        input: PathBuf,

        /// TOML grouping config (match_as + fields)
        #[arg(long, short = 'c', conflicts_with_all = ["match_as", "fields"])]
        config: Option<PathBuf>,

        /// Matcher type: email, phone, or email_or_phone
        #[arg(long, short = 'm', requires = "fields")]
        match_as: Option<String>,

        /// Identifying field, NAME or NAME=TYPE (TYPE required for email_or_phone). Repeatable.
        #[arg(long = "field", short = 'f', value_name = "NAME[=TYPE]")]
        fields: Vec<String>,

        /// Output file, or - for stdout [default: <INPUT>.<suffix>]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Suffix for the default output file name
        #[arg(long)]
        suffix: Option<String>,

        /// Use g000001-style ids instead of random ones
        #[arg(long)]
        sequential_ids: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a grouping config without reading any data
    #[command(after_help = "\
Examples:
  rowlink validate grouping.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Group {
            input,
            config,
            match_as,
            fields,
            output,
            suffix,
            sequential_ids,
            json,
            quiet,
        } => group::cmd_group(group::GroupArgs {
            input,
            config,
            match_as,
            fields,
            output,
            suffix,
            sequential_ids,
            json,
            quiet,
        }),
        Commands::Validate { config } => group::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Log to stderr. `log` records from the engine are bridged in by the
/// subscriber.
fn init_logging(verbose: u8) {
    use std::io::IsTerminal;
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<GroupError> for CliError {
    fn from(err: GroupError) -> Self {
        let hint = match &err {
            GroupError::InvalidConfiguration(_) => {
                Some("valid matcher types are email, phone, email_or_phone".to_string())
            }
            GroupError::MalformedRecord { .. } => {
                Some("every row must be UTF-8 with as many fields as the header".to_string())
            }
            _ => None,
        };
        Self { code: group_exit_code(&err), message: err.to_string(), hint }
    }
}
