//! Environment-driven configuration.
//!
//! Credentials and overrides are read once at process start; nothing in the
//! request path touches the environment. Provider clients receive their
//! [`ProviderConfig`] explicitly instead of discovering credentials
//! ambiently, so tests can substitute doubles.

use thiserror::Error;
use url::Url;

/// Environment variable for the Gemini API key (required).
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable for the OpenAI API key (required).
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable for a custom Gemini base URL.
const GEMINI_URL_ENV: &str = "TOURPLAN_GEMINI_URL";
/// Environment variable for a custom OpenAI-compatible base URL.
const OPENAI_URL_ENV: &str = "TOURPLAN_OPENAI_URL";
/// Environment variable for the server port.
const PORT_ENV: &str = "TOURPLAN_PORT";
/// Environment variable for the `SQLite` database path.
const DB_PATH_ENV: &str = "TOURPLAN_DB_PATH";
/// Environment variable for the stage-1 (refine) model id.
const REFINE_MODEL_ENV: &str = "TOURPLAN_REFINE_MODEL";
/// Environment variable for the stage-2 (draft) model id.
const DRAFT_MODEL_ENV: &str = "TOURPLAN_DRAFT_MODEL";
/// Environment variable for the ensemble member list (comma separated).
const ENSEMBLE_MODELS_ENV: &str = "TOURPLAN_ENSEMBLE_MODELS";

/// Default stage-1 model: strong enough to write a well-specified prompt.
const DEFAULT_REFINE_MODEL: &str = "gemini-2.5-flash";
/// Default stage-2 model: cheaper, does the bulk free-text generation.
const DEFAULT_DRAFT_MODEL: &str = "gemini-2.5-flash-lite";
/// Default ensemble members.
const DEFAULT_ENSEMBLE_MODELS: [&str; 3] = ["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini"];
/// Default database path.
const DEFAULT_DB_PATH: &str = "tour_plan.db";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    /// A value is out of range or otherwise unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A base-URL override does not parse.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Top-level agent configuration.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// HTTP server port.
    pub port: u16,
    /// `SQLite` database path.
    pub db_path: String,
    /// Gemini credentials and endpoint (prompt chain).
    pub gemini: ProviderConfig,
    /// OpenAI credentials and endpoint (budget ensemble).
    pub openai: ProviderConfig,
    /// Prompt chain model ids.
    pub chain: ChainConfig,
    /// Budget ensemble member list.
    pub ensemble: EnsembleConfig,
}

/// Credentials and endpoint for one provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// API key.
    pub api_key: String,
    /// Base-URL override; the provider's public endpoint when `None`.
    pub base_url: Option<String>,
}

/// Model ids for the two chain stages.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Stage-1 model: trip fields -> refined prompt.
    pub refine_model: String,
    /// Stage-2 model: refined prompt -> plan text.
    pub draft_model: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            refine_model: DEFAULT_REFINE_MODEL.to_string(),
            draft_model: DEFAULT_DRAFT_MODEL.to_string(),
        }
    }
}

/// Budget ensemble member list.
#[derive(Clone, Debug)]
pub struct EnsembleConfig {
    /// Member model ids, one fan-out call each.
    pub models: Vec<String>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_ENSEMBLE_MODELS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }
}

impl AgentConfig {
    /// Read the configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if a required credential is missing or a value fails
    /// validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini = ProviderConfig {
            api_key: require_env(GEMINI_API_KEY_ENV)?,
            base_url: std::env::var(GEMINI_URL_ENV).ok(),
        };
        let openai = ProviderConfig {
            api_key: require_env(OPENAI_API_KEY_ENV)?,
            base_url: std::env::var(OPENAI_URL_ENV).ok(),
        };

        let chain = ChainConfig {
            refine_model: std::env::var(REFINE_MODEL_ENV)
                .unwrap_or_else(|_| DEFAULT_REFINE_MODEL.to_string()),
            draft_model: std::env::var(DRAFT_MODEL_ENV)
                .unwrap_or_else(|_| DEFAULT_DRAFT_MODEL.to_string()),
        };

        let ensemble = std::env::var(ENSEMBLE_MODELS_ENV)
            .map(|csv| EnsembleConfig {
                models: csv
                    .split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect(),
            })
            .unwrap_or_default();

        let config = Self {
            port: std::env::var(PORT_ENV)
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(crate::server::DEFAULT_PORT),
            db_path: std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            gemini,
            openai,
            chain,
            ensemble,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.refine_model.is_empty() || self.chain.draft_model.is_empty() {
            return Err(ConfigError::Invalid(
                "chain model ids must not be empty".to_string(),
            ));
        }

        if self.ensemble.models.is_empty() {
            return Err(ConfigError::Invalid(
                "ensemble.models must list at least one member".to_string(),
            ));
        }

        if let Some(base_url) = &self.gemini.base_url {
            Url::parse(base_url)?;
        }
        if let Some(base_url) = &self.openai.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig {
            port: crate::server::DEFAULT_PORT,
            db_path: DEFAULT_DB_PATH.to_string(),
            gemini: ProviderConfig {
                api_key: "k1".to_string(),
                base_url: None,
            },
            openai: ProviderConfig {
                api_key: "k2".to_string(),
                base_url: None,
            },
            chain: ChainConfig::default(),
            ensemble: EnsembleConfig::default(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(config().validate().is_ok());
        assert_eq!(EnsembleConfig::default().models.len(), 3);
    }

    #[test]
    fn test_empty_ensemble_is_rejected() {
        let mut config = config();
        config.ensemble.models.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = config();
        config.openai.base_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
    }
}
