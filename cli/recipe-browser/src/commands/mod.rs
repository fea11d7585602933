mod browse;
mod list;
mod search;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;
use recipe_catalog::{ClientTrait, FetchErrorKind};
use recipe_view::{Mode, Render, View, ViewController};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::utils::render::TerminalRenderer;

static RECIPES_DESCRIPTION: &'_ str = indoc! {"
    Browse and search the recipe catalog.

    Without a command, an interactive browser is started."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, version, descr(RECIPES_DESCRIPTION))]
pub struct RecipesCli(#[bpaf(external(recipes_args))] pub RecipesArgs);

/// Main recipes args parser
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct RecipesArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    /// Base URL of the recipe catalog, overrides the configured one
    #[bpaf(long, argument("URL"))]
    pub catalog_url: Option<String>,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Browse and search recipes interactively (default)
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),

    /// Print one page of the catalog
    #[bpaf(command)]
    List(#[bpaf(external(list::list))] list::List),

    /// Print the recipes matching a search text
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

impl RecipesArgs {
    pub async fn handle(self, mut config: Config) -> Result<()> {
        if let Some(catalog_url) = self.catalog_url {
            debug!(catalog_url, "catalog url set on the command line");
            config.catalog_url = catalog_url;
        }

        match self.command.unwrap_or(Commands::Browse(browse::Browse {})) {
            Commands::Browse(args) => args.handle(config).await,
            Commands::List(args) => args.handle(config).await,
            Commands::Search(args) => args.handle(config).await,
        }
    }
}

/// A one-shot command could not load its records.
#[derive(Debug, Error)]
#[error("could not load recipes while {mode} ({kind}): {message}")]
pub struct FetchFailed {
    pub mode: Mode,
    pub kind: FetchErrorKind,
    pub message: String,
}

/// Wait for the single request of a one-shot command.
async fn settle_once<C: ClientTrait + 'static>(
    controller: &mut ViewController<C>,
) -> Result<(), FetchFailed> {
    let outcomes = controller.settle().await;
    debug!(?outcomes, "one-shot request settled");

    match controller.state().last_error() {
        Some(error) => Err(FetchFailed {
            mode: error.mode.clone(),
            kind: error.kind,
            message: error.message.clone(),
        }),
        None => Ok(()),
    }
}

/// Print the records of a one-shot command to stdout.
fn print_view(view: &View<'_>, json: bool, config: &Config) -> Result<()> {
    let stdout = std::io::stdout().lock();
    if json {
        debug!("printing recipes as JSON");
        serde_json::to_writer_pretty(stdout, view.records)?;
        println!();
    } else {
        debug!("printing recipes as user facing");
        TerminalRenderer::plain(stdout, config.image_base_url.as_str(), textwrap::termwidth())
            .render(view)?;
    }
    Ok(())
}
