use std::process::ExitCode;

use anyhow::Result;
use bpaf::{Args, Parser};
use commands::{RecipesArgs, RecipesCli};
use tracing::debug;
use utils::init::init_logger;
use utils::{display_chain, message};

mod commands;
mod config;
mod utils;

async fn run(args: RecipesArgs) -> Result<()> {
    init_logger(Some(args.verbosity));
    let config = config::Config::parse()?;
    debug!(?config, "parsed config");
    args.handle(config).await
}

fn main() -> ExitCode {
    // initialize logger with "best guess" defaults
    // updating the logger conf is cheap, so we reinitialize whenever we get more information
    init_logger(None);

    // Parse verbosity flags to affect help message/parse errors
    let verbosity = {
        let verbosity_parser = commands::verbosity();
        let other_parser = bpaf::any("_", Some::<String>).many();

        bpaf::construct!(verbosity_parser, other_parser)
            .map(|(v, _)| v)
            .to_options()
            .run_inner(Args::current_args())
            .unwrap_or_default()
    };

    init_logger(Some(verbosity));

    // Pass through Completion "failure"; In completion mode this needs to be printed as is
    // to work with the shell completion frontends
    //
    // Pass through Stdout failure; This represents `--help` and `--version`
    let args = match commands::recipes_cli().run_inner(Args::current_args()) {
        Ok(RecipesCli(args)) => args,
        Err(bpaf::ParseFailure::Stdout(m, _)) => {
            print!("{m:80}");
            return ExitCode::SUCCESS;
        },
        Err(bpaf::ParseFailure::Stderr(m)) => {
            message::error(format!("{m:80}"));
            return ExitCode::from(1);
        },
        Err(bpaf::ParseFailure::Completion(c)) => {
            print!("{c}");
            return ExitCode::SUCCESS;
        },
    };

    // The interactive session multiplexes input and responses on one thread
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            message::error(format!("could not start async runtime: {e}"));
            return ExitCode::from(1);
        },
    };

    // Print errors and exit with status 1 on failure
    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:#}", e);
            message::error(display_chain(&e));
            ExitCode::from(1)
        },
    }
}
