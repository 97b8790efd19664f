//! Per-route execution plan.
//!
//! The plan is supplied by the host configuration layer on every request and
//! is never cached here. Nested extension configs stay opaque
//! [`serde_json::Value`]s; only the plan's own shape is checked.
//!
//! ```json
//! {
//!   "tag_execute_steps": [
//!     {
//!       "target_tag": "beta",
//!       "name": "beta-limits",
//!       "plugins": [{ "name": "rate-limit", "config": { "limit": 5 } }]
//!     }
//!   ]
//! }
//! ```

use crate::{error::ConfigError, route::Route};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Configuration of the orchestrator attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagExecutorConfig {
    /// The execution plan: ordered steps.
    #[serde(default)]
    pub tag_execute_steps: Vec<Step>,
}

impl TagExecutorConfig {
    /// Create a plan from steps.
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            tag_execute_steps: steps.into_iter().collect(),
        }
    }

    /// Parse and validate a plan from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a plan from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks: every step and every referenced extension is named.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, step) in self.tag_execute_steps.iter().enumerate() {
            if step.name.is_empty() {
                return Err(ConfigError::EmptyStepName { index });
            }
            if step.plugins.iter().any(|p| p.name.is_empty()) {
                return Err(ConfigError::EmptyPluginName {
                    step: step.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// The ordered steps.
    pub fn steps(&self) -> &[Step] {
        &self.tag_execute_steps
    }
}

/// A single entry of an execution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Activation tag. `None` (or `""` on the wire) means always active.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_tag: Option<String>,
    /// Step name, used for logging only.
    pub name: String,
    /// Extensions to run, each with its own config.
    #[serde(default)]
    pub plugins: Vec<PluginOptions>,
}

impl Step {
    /// Create an always-active step.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            target_tag: None,
            name: name.into(),
            plugins: Vec::new(),
        }
    }

    /// Restrict the step to routes carrying `tag`. An empty tag clears it.
    pub fn with_target_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.target_tag = (!tag.is_empty()).then_some(tag);
        self
    }

    /// Append an extension entry.
    pub fn with_plugin(mut self, name: impl Into<String>, config: Value) -> Self {
        self.plugins.push(PluginOptions::new(name, config));
        self
    }

    /// The activation tag, if any.
    pub fn target_tag(&self) -> Option<&str> {
        self.target_tag.as_deref().filter(|tag| !tag.is_empty())
    }

    /// Whether the step runs for `route`.
    pub fn is_active(&self, route: &Route) -> bool {
        match self.target_tag() {
            None => true,
            Some(tag) => route.has_tag(tag),
        }
    }

    /// The first entry naming `extension`.
    pub fn plugin(&self, extension: &str) -> Option<&PluginOptions> {
        self.plugins.iter().find(|p| p.name == extension)
    }
}

/// An extension reference inside a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Name of the extension to invoke.
    pub name: String,
    /// Step-scoped configuration handed to the extension.
    #[serde(default = "empty_object")]
    pub config: Value,
}

impl PluginOptions {
    /// Create an entry.
    pub fn new(name: impl Into<String>, config: Value) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.filter(|t| !t.is_empty()))
}
