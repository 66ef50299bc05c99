//! repl-playground binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use repl_playground::{
    api,
    cli::{self, print_help, print_version},
    config::Config,
    logging, AppState,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'repl-playground --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init(Some(config.log_filter()));

    info!("repl-playground v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut state = AppState::new().with_idle_timeout(server_config.gc.idle_timeout);
    match config.snippet_store() {
        Some(snippets) => {
            info!("Sharing snippets in {}", snippets.dir().display());
            state = state.with_snippets(Arc::new(snippets));
        }
        None => info!("Sharing disabled"),
    }

    if let Err(e) = api::serve(server_config, state).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
