//! Command-line interface for repl-playground.
//!
//! Uses lexopt to keep the argument parser small.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Options left unset fall through to the environment, the config file and
/// the built-in defaults, in that order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Directory with the front-end assets.
    pub assets: Option<PathBuf>,
    /// Directory for shared snippets.
    pub share_dir: Option<PathBuf>,
    /// Disable the Share action.
    pub no_share: bool,
    /// Idle timeout in seconds.
    pub idle_timeout: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('a') | Long("assets") => {
                result.assets = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("share-dir") => {
                result.share_dir = Some(parser.value()?.parse()?);
            }
            Long("no-share") => {
                result.no_share = true;
            }
            Short('t') | Long("idle-timeout") => {
                let value: String = parser.value()?.parse()?;
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("idle-timeout", value.clone()))?;
                if secs == 0 {
                    return Err(ArgsError::InvalidValue("idle-timeout", value));
                }
                result.idle_timeout = Some(secs);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"repl-playground {version}
Browser-based playground for a small Lisp

USAGE:
    repl-playground [OPTIONS]

OPTIONS:
    -H, --host <ADDR>          Host address to bind [default: 0.0.0.0]
    -p, --port <PORT>          Port to listen on [default: 8000]
    -c, --config <FILE>        Path to configuration file (JSON)
    -a, --assets <DIR>         Front-end asset directory [default: public]
    -s, --share-dir <DIR>      Directory for shared snippets [default: snippets]
        --no-share             Disable the Share button
    -t, --idle-timeout <SECS>  Evict sessions idle this long [default: 300]
    -l, --log-level <LVL>      Log level (error, warn, info, debug, trace)
    -h, --help                 Print help
    -V, --version              Print version

ENVIRONMENT VARIABLES:
    PLAYGROUND_HOST            Host address (overrides config)
    PLAYGROUND_PORT            Port number (overrides config)
    PLAYGROUND_SHARE_DIR       Snippet directory (overrides config)
    PLAYGROUND_IDLE_TIMEOUT    Idle timeout in seconds (overrides config)
    PLAYGROUND_LOG_LEVEL       Log level (overrides config)
    RUST_LOG                   Alternative log level setting

EXAMPLES:
    # Serve ./public on port 8000
    repl-playground

    # Local only, short-lived sessions
    repl-playground -H 127.0.0.1 -t 60

    # Start with config file
    repl-playground -c /etc/repl-playground/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("repl-playground {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
