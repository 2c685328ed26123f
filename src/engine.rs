// ABOUTME: Template engine wrapping a Handlebars registry with the helper groups registered
// ABOUTME: Applies configured strictness, escaping and helper prefix before rendering

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;

use crate::config::{EscapeMode, HelperConfig};
use crate::error::{HelperError, Result};
use crate::helpers;

#[derive(Clone)]
pub struct HelperEngine {
    handlebars: Handlebars<'static>,
}

impl HelperEngine {
    /// Create an engine with every helper group and default settings
    pub fn new() -> Result<Self> {
        Self::with_config(&HelperConfig::default())
    }

    pub fn with_config(config: &HelperConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(config.strict_mode);
        handlebars.set_dev_mode(false);

        if config.escape == EscapeMode::None {
            handlebars.register_escape_fn(handlebars::no_escape);
        }

        helpers::register_groups(&mut handlebars, &config.groups, config.prefix())?;
        debug!(
            "Helper engine ready: groups={:?} strict={} escape={}",
            config.groups, config.strict_mode, config.escape
        );

        Ok(Self { handlebars })
    }

    /// Create an engine from a single YAML config file.
    ///
    /// Unlike `HelperConfig::load`, the file must exist and no environment
    /// overrides are applied.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = if contents.trim().is_empty() {
            HelperConfig::default()
        } else {
            serde_yaml::from_str(&contents)?
        };
        debug!("Loaded engine configuration from {}", path.display());
        Self::with_config(&config)
    }

    /// Render a template string with the given context
    pub fn render_template(&self, template: &str, context: &JsonValue) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(HelperError::HandlebarsError)
    }

    /// Render a template string with any serializable context
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(HelperError::HandlebarsError)
    }

    /// Register a named template for later use with `render_named` or as a partial
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.handlebars.register_template_string(name, source)?;
        debug!("Registered template {}", name);
        Ok(())
    }

    pub fn render_named(&self, name: &str, context: &JsonValue) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(HelperError::HandlebarsError)
    }

    /// Validate template syntax without rendering
    pub fn validate_template(&self, template: &str) -> Result<()> {
        match handlebars::Template::compile(template) {
            Ok(_) => Ok(()),
            Err(e) => Err(HelperError::SyntaxError(e.to_string())),
        }
    }

    /// Register a custom helper function
    pub fn register_helper<F>(&mut self, name: &str, helper: F) -> Result<()>
    where
        F: handlebars::HelperDef + Send + Sync + 'static,
    {
        self.handlebars.register_helper(name, Box::new(helper));
        Ok(())
    }

    /// Create an engine with additional helpers registered by `register_fn`
    pub fn with_custom_helpers<F>(mut self, register_fn: F) -> Result<Self>
    where
        F: FnOnce(&mut Handlebars<'static>) -> Result<()>,
    {
        register_fn(&mut self.handlebars)?;
        Ok(self)
    }

    /// The underlying registry
    pub fn registry(&self) -> &Handlebars<'static> {
        &self.handlebars
    }
}
