//! Help configuration
//!
//! Trigger symbols and page layout defaults, loadable from YAML. Every field
//! has a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::{
    Presentation, DEFAULT_EXIT_TRIGGER, DEFAULT_LINK_TRIGGERS, DEFAULT_PARENT_TRIGGER,
    DEFAULT_ROOT_TRIGGER,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HelpConfig {
    #[serde(default)]
    pub triggers: TriggerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Reserved and default reaction symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Reaction that leaves the help from any page
    #[serde(default = "default_exit")]
    pub exit: String,
    /// Reaction for parent shortcuts
    #[serde(default = "default_parent")]
    pub parent: String,
    /// Reaction for root shortcuts
    #[serde(default = "default_root")]
    pub root: String,
    /// Ordered pool for links declared without a trigger
    #[serde(default = "default_pool")]
    pub defaults: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            exit: default_exit(),
            parent: default_parent(),
            root: default_root(),
            defaults: default_pool(),
        }
    }
}

/// Rendering defaults applied to pages that do not override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Between the page content and the link listing
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Between two link lines
    #[serde(default = "default_link_separator")]
    pub link_separator: String,
    #[serde(default)]
    pub presentation: Presentation,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            link_separator: default_link_separator(),
            presentation: Presentation::default(),
        }
    }
}

fn default_exit() -> String {
    DEFAULT_EXIT_TRIGGER.to_string()
}

fn default_parent() -> String {
    DEFAULT_PARENT_TRIGGER.to_string()
}

fn default_root() -> String {
    DEFAULT_ROOT_TRIGGER.to_string()
}

fn default_pool() -> Vec<String> {
    DEFAULT_LINK_TRIGGERS.iter().map(|s| s.to_string()).collect()
}

fn default_separator() -> String {
    "\n\n".to_string()
}

fn default_link_separator() -> String {
    "\n".to_string()
}

impl HelpConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: HelpConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that reserved symbols never collide with each other or with the pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.triggers;
        if t.exit.is_empty() || t.parent.is_empty() || t.root.is_empty() {
            return Err(ConfigError::Invalid(
                "trigger symbols must not be empty".to_string(),
            ));
        }
        if t.exit == t.parent || t.exit == t.root {
            return Err(ConfigError::Invalid(format!(
                "exit trigger {:?} is also a shortcut trigger",
                t.exit
            )));
        }
        if t.parent == t.root {
            return Err(ConfigError::Invalid(format!(
                "parent and root shortcuts share trigger {:?}",
                t.parent
            )));
        }
        if t.defaults.is_empty() {
            return Err(ConfigError::Invalid(
                "default trigger pool must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for symbol in &t.defaults {
            if symbol.is_empty() {
                return Err(ConfigError::Invalid(
                    "default trigger pool contains an empty symbol".to_string(),
                ));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "default trigger {symbol:?} appears twice"
                )));
            }
            if *symbol == t.exit || *symbol == t.parent || *symbol == t.root {
                return Err(ConfigError::Invalid(format!(
                    "default trigger {symbol:?} collides with a reserved trigger"
                )));
            }
        }
        Ok(())
    }
}
