mod commands;
mod helpers;

use clap::Parser;
use simresp_core::domain::{ErrorCategory, ResponseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            eprintln!("FATAL EXIT CODE: {}", error.exit_code());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("simresp".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// `RUST_LOG` wins over `--verbose`. Output goes to stderr so stdout stays
/// machine-readable.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "simresp_core={default_level},simresp={default_level}"
            ))
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "simresp",
    version,
    about = "Reduce seismic channel responses to simple oscillator parameters"
)]
struct Cli {
    /// Log intermediate values (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Reduce every channel of a JSON inventory and write a JSON report
    Reduce(commands::ReduceArgs),
    /// Parse equipment identifiers into sensor and logger parts
    Identify(commands::IdentifyArgs),
    /// Look up the clip level for a sensor/logger pair
    Clip(commands::ClipArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Reduce(args) => commands::run_reduce_command(args),
        CliCommand::Identify(args) => commands::run_identify_command(args),
        CliCommand::Clip(args) => commands::run_clip_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(ResponseError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage(_) => ErrorCategory::InputValidationError,
            Self::Compute(error) => error.category(),
            Self::Internal(_) => ErrorCategory::IoSystemError,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Usage(_) => "INPUT.CLI_USAGE",
            Self::Compute(error) => error.placeholder(),
            Self::Internal(_) => "IO.CLI",
        }
    }

    fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    fn diagnostic_line(&self) -> String {
        match self {
            Self::Compute(error) => error.diagnostic_line(),
            Self::Usage(message) => format!("ERROR: [{}] {}", self.placeholder(), message.trim_end()),
            Self::Internal(error) => format!("ERROR: [{}] {error:#}", self.placeholder()),
        }
    }
}

impl From<ResponseError> for CliError {
    fn from(error: ResponseError) -> Self {
        Self::Compute(error)
    }
}
