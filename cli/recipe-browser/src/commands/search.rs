use std::sync::Arc;

use anyhow::Result;
use bpaf::Bpaf;
use recipe_view::ViewController;
use tracing::{debug, instrument};

use super::{print_view, settle_once};
use crate::config::Config;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

// Search the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display the recipes as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Free text matched against the recipes by the catalog
    #[bpaf(positional("TEXT"))]
    pub text: String,
}

impl Search {
    #[instrument(name = "search", fields(json = self.json, text = self.text), skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        debug!("performing search for text: {}", self.text);

        let client = Arc::new(init_catalog_client(&config)?);
        let mut controller = ViewController::new(client, config.controller_options());

        controller.on_query_changed(self.text);
        settle_once(&mut controller).await?;

        let view = controller.view();
        if view.records.is_empty() && !self.json {
            message::plain(format!("No recipes matched '{}'.", view.query));
            return Ok(());
        }
        print_view(&view, self.json, &config)
    }
}
