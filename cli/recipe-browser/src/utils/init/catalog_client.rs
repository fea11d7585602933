use std::time::Duration;

use anyhow::Context;
use recipe_catalog::{CatalogClient, CatalogClientConfig};
use tracing::debug;

use crate::config::Config;

pub const USER_AGENT: &str = concat!("recipes/", env!("CARGO_PKG_VERSION"));

/// Initialize the catalog client from the user's configuration
pub fn init_catalog_client(config: &Config) -> Result<CatalogClient, anyhow::Error> {
    let client_config = catalog_client_config(config);
    debug!("using catalog client with url: {}", client_config.catalog_url);

    CatalogClient::new(client_config).context("could not create catalog client")
}

fn catalog_client_config(config: &Config) -> CatalogClientConfig {
    CatalogClientConfig {
        catalog_url: config.catalog_url.clone(),
        user_agent: Some(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| USER_AGENT.to_string()),
        ),
        request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        ..Default::default()
    }
}
