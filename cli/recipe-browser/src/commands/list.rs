use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Result;
use bpaf::Bpaf;
use recipe_catalog::FIRST_PAGE;
use recipe_view::ViewController;
use tracing::instrument;

use super::{print_view, settle_once};
use crate::config::Config;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

// Print one page of the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Page to print, starting at 1
    #[bpaf(long, short, argument("PAGE"), fallback(FIRST_PAGE), display_fallback)]
    pub page: NonZeroU32,

    /// Display the recipes as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl List {
    #[instrument(name = "list", fields(page = self.page.get(), json = self.json), skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = Arc::new(init_catalog_client(&config)?);
        let mut controller = ViewController::new(client, config.controller_options());

        controller.on_page_changed(self.page);
        settle_once(&mut controller).await?;

        let view = controller.view();
        if view.page.get() > view.total_pages {
            message::warning(format!(
                "Page {} is past the last page ({}).",
                view.page, view.total_pages
            ));
        }
        print_view(&view, self.json, &config)
    }
}
