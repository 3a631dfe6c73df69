//! Engine configuration
//!
//! Everything the navigation engine needs that is not part of the flow documents:
//! the root node, exit tokens, reserved node keys for date branches and forms, and
//! the bot's canned messages. Every field has a default so a partial JSON file works.

use crate::flow::FormDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_FLOW_FILE: &str = "flows.json";

/// Errors reading the optional configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-level settings taken from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Flow documents, merged in this order
    pub flow_files: Vec<PathBuf>,
    /// Optional JSON file deserialized into [`EngineConfig`]
    pub config_file: Option<PathBuf>,
    /// Overrides `follow_up_delay_ms` from the config file
    pub follow_up_delay_ms: Option<u64>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("FLOW_FILES").ok(),
            std::env::var("FLOW_CONFIG").ok(),
            std::env::var("FLOW_FOLLOW_UP_MS").ok(),
        )
    }

    fn from_vars(
        flow_files: Option<String>,
        config_file: Option<String>,
        follow_up_ms: Option<String>,
    ) -> Self {
        let mut files: Vec<PathBuf> = flow_files
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        if files.is_empty() {
            files.push(PathBuf::from(DEFAULT_FLOW_FILE));
        }

        Self {
            flow_files: files,
            config_file: config_file.filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            follow_up_delay_ms: follow_up_ms.and_then(|ms| ms.trim().parse().ok()),
        }
    }

    /// Load the engine config named by these settings, applying env overrides
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(ms) = self.follow_up_delay_ms {
            config.follow_up_delay_ms = ms;
        }
        Ok(config)
    }
}

/// Navigation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Main-menu node; every recovery path lands here
    pub root: String,
    /// Exit token that abandons a form and returns to the root
    pub menu_token: String,
    /// Exit token that abandons a form and returns to the form's back target
    pub back_token: String,
    /// Delay before a node's `followUp` message is emitted
    pub follow_up_delay_ms: u64,
    pub date_branches: DateBranchConfig,
    /// Form definitions keyed by reserved node key
    pub forms: HashMap<String, FormDefinition>,
    pub messages: Messages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: "menuPrincipal".to_string(),
            menu_token: "MENU".to_string(),
            back_token: "VOLVER".to_string(),
            follow_up_delay_ms: 1500,
            date_branches: DateBranchConfig::default(),
            forms: HashMap::new(),
            messages: Messages::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }
}

/// Reserved date-collection nodes and where they branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateBranchConfig {
    /// Target for dates at most `early_threshold_days` old (dead-on-arrival window)
    pub early_target: String,
    pub early_threshold_days: i64,
    /// Date-collection node key -> its own late target
    pub nodes: HashMap<String, String>,
}

impl Default for DateBranchConfig {
    fn default() -> Self {
        Self {
            early_target: "cambioDOA".to_string(),
            early_threshold_days: 10,
            nodes: HashMap::from([
                ("fechaCompraTienda".to_string(), "garantiaTienda".to_string()),
                ("fechaCompraOnline".to_string(), "garantiaOnline".to_string()),
            ]),
        }
    }
}

/// Canned bot messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub load_failure: String,
    /// Free-text terminal node answered
    pub acknowledgment: String,
    /// Current node has no `options` at all
    pub no_options: String,
    pub not_understood: String,
    pub flow_not_found: String,
    pub invalid_date: String,
    /// Used when a form does not define its own completion message
    pub form_completed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            load_failure: "Lo siento, hubo un error al cargar el flujo de conversación."
                .to_string(),
            acknowledgment: "Gracias por la información. Regresando al Menú Principal..."
                .to_string(),
            no_options: "No hay opciones para este flujo. Volvemos al Menú Principal..."
                .to_string(),
            not_understood: "No entendí esa opción. Por favor, intenta de nuevo.".to_string(),
            flow_not_found: "No encontré ese flujo. Regresando al Menú Principal...".to_string(),
            invalid_date: "Fecha inválida. Escríbela con el formato DD/MM/AAAA.".to_string(),
            form_completed: "¡Gracias! Registramos tus datos.".to_string(),
        }
    }
}
