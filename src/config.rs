use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::comparison::ViewOptions;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub tables: TableNames,
    pub view: ViewOptions,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Backend {
    /// Project URL; "/rest/v1" is appended per request.
    pub url: Option<String>,
    /// Environment variable holding the anon API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            url: None,
            api_key_env: "SUPABASE_ANON_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Backend {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("Environment variable {} is not set", self.api_key_env))
    }
}

/// Names of the four backend tables.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TableNames {
    pub applicants: String,
    pub reference_products: String,
    pub products: String,
    pub presentations: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            applicants: "applicants".to_string(),
            reference_products: "reference_products_master".to_string(),
            products: "products".to_string(),
            presentations: "product_details".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}
