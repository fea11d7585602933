use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use recipe_catalog::DEFAULT_CATALOG_URL;
use recipe_view::ControllerOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of recipes managed directories (config, cache)
const RECIPES_DIR_NAME: &str = "recipes";
const RECIPES_CONFIG_DIR_VAR: &str = "RECIPES_CONFIG_DIR";
const RECIPES_ENV_PREFIX: &str = "RECIPES";
pub const RECIPES_CONFIG_FILE: &str = "recipes.toml";
const RECIPES_LOG_FILE: &str = "recipes.log";

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://cdn.dummyjson.com/recipe-images";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// The URL of the recipe catalog to use
    // Kept as a String, parsing it as a URL would append a trailing slash.
    pub catalog_url: String,

    /// Base URL that recipe images are served from,
    /// an image is expected at `{image_base_url}/{id}.webp`
    pub image_base_url: String,

    /// `User-Agent` sent to the catalog (default: `recipes/<version>`)
    pub user_agent: Option<String>,

    /// Upper bound in seconds for a single catalog request.
    /// Requests are only bounded while connecting if unset.
    pub request_timeout_secs: Option<u64>,

    /// Whether clearing the search text goes back to the first page
    /// instead of searching for the empty string
    pub reset_on_clear: bool,

    /// Where the interactive session writes its logs
    /// (default: `$XDG_CACHE_HOME/recipes/recipes.log`)
    pub log_file: PathBuf,

    /// Directory the user configuration file is read from (default:
    /// `$XDG_CONFIG_HOME/recipes`)
    pub config_dir: PathBuf,
}

impl Config {
    /// Creates a [Config] from defaults, config files and the environment
    ///
    /// Later sources override earlier ones:
    ///
    /// 1. built-in defaults
    /// 2. `/etc/recipes/recipes.toml`
    /// 3. `recipes.toml` in the user's config directory
    /// 4. `$RECIPES_CONFIG_DIR/recipes.toml`
    /// 5. `RECIPES_*` environment variables, e.g. `RECIPES_CATALOG_URL`
    pub fn parse() -> Result<Config> {
        let user_config_dir = dirs::config_dir().map(|dir| dir.join(RECIPES_DIR_NAME));
        let cache_dir = dirs::cache_dir()
            .map(|dir| dir.join(RECIPES_DIR_NAME))
            .context("could not determine cache directory")?;

        let config_dir = match env::var(RECIPES_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${RECIPES_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = user_config_dir
                    .clone()
                    .context("could not determine config directory")?;
                debug!("`${RECIPES_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };

        let mut builder = HierarchicalConfig::builder()
            .set_default("catalog_url", DEFAULT_CATALOG_URL)?
            .set_default("image_base_url", DEFAULT_IMAGE_BASE_URL)?
            .set_default("reset_on_clear", true)?
            .set_default("log_file", path_value(&cache_dir.join(RECIPES_LOG_FILE))?)?
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", path_value(&config_dir)?)?;

        // read from /etc
        builder = builder.add_source(toml_file(
            &PathBuf::from("/etc")
                .join(RECIPES_DIR_NAME)
                .join(RECIPES_CONFIG_FILE),
        ));

        if let Some(user_config_dir) = user_config_dir.filter(|dir| *dir != config_dir) {
            builder = builder.add_source(toml_file(&user_config_dir.join(RECIPES_CONFIG_FILE)));
        }

        // Add explicit RECIPES_CONFIG_DIR file last
        builder = builder.add_source(toml_file(&config_dir.join(RECIPES_CONFIG_FILE)));

        // override via env variables
        let builder = builder.add_source(
            Environment::with_prefix(RECIPES_ENV_PREFIX).try_parsing(true),
        );

        let config = builder
            .build()?
            .try_deserialize()
            .context("Could not parse config")?;
        Ok(config)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            reset_on_clear: self.reset_on_clear,
        }
    }

    /// A config with built-in defaults that does not depend on the environment.
    #[cfg(test)]
    pub fn test_default() -> Config {
        Config {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            user_agent: None,
            request_timeout_secs: None,
            reset_on_clear: true,
            log_file: PathBuf::from(RECIPES_LOG_FILE),
            config_dir: PathBuf::from("."),
        }
    }
}

fn toml_file(path: &Path) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(path)
        .format(config::FileFormat::Toml)
        .required(false)
}

fn path_value(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid unicode: {path:?}"))
}
