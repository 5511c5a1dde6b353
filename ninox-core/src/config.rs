use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::ships::Ship;

/// Ship descriptions from the `[ships]` table. Empty when there is no config.
pub type DescriptionMap = BTreeMap<Ship, String>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenAiTokens {
    pub open: String,
    pub closed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokensConfig {
    pub openai: OpenAiTokens,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    tokens: Option<TokensConfig>,
    #[serde(default)]
    ships: BTreeMap<String, String>,
}

/// Validated ninox configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub tokens: Option<TokensConfig>,
    pub descriptions: DescriptionMap,
}

impl Config {
    /// Parse a TOML document. Unknown ship codes in `[ships]` are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut descriptions = DescriptionMap::new();
        for (code, description) in raw.ships {
            let ship = Ship::from_code(&code).ok_or(ConfigError::UnknownShipCode(code))?;
            descriptions.insert(ship, description);
        }

        Ok(Config {
            tokens: raw.tokens,
            descriptions,
        })
    }

    /// The OpenAI API key, required by the commit assistant.
    pub fn openai_key(&self) -> Result<&str, ConfigError> {
        self.tokens
            .as_ref()
            .map(|tokens| tokens.openai.open.as_str())
            .ok_or(ConfigError::MissingTokens)
    }

    pub fn trace_loaded(&self) {
        info!(
            has_tokens = self.tokens.is_some(),
            ship_descriptions = self.descriptions.len(),
            "Loaded Config"
        );
        debug!(ships = ?self.descriptions.keys().collect::<Vec<_>>(), "Config ship descriptions");
    }
}
