// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides engine construction, config file builders and temporary directories

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use hbs_helpers::{HelperConfig, HelperEngine, HelperGroup};

pub fn create_test_engine() -> HelperEngine {
    HelperEngine::new().expect("Failed to create helper engine")
}

pub fn render(template: &str, context: &serde_json::Value) -> String {
    create_test_engine()
        .render_template(template, context)
        .expect("Failed to render template")
}

/// Builds the YAML text of a helper configuration file.
pub struct TestConfigBuilder {
    groups: Option<Vec<HelperGroup>>,
    strict_mode: Option<bool>,
    escape: Option<String>,
    prefix: Option<String>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            groups: None,
            strict_mode: None,
            escape: None,
            prefix: None,
        }
    }

    pub fn with_groups(mut self, groups: &[HelperGroup]) -> Self {
        self.groups = Some(groups.to_vec());
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_mode = Some(true);
        self
    }

    pub fn with_escape(mut self, escape: &str) -> Self {
        self.escape = Some(escape.to_string());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn generate_yaml(&self) -> String {
        let mut yaml = String::new();
        if let Some(groups) = &self.groups {
            let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
            yaml.push_str(&format!("groups: [{}]\n", names.join(", ")));
        }
        if let Some(strict) = self.strict_mode {
            yaml.push_str(&format!("strict_mode: {}\n", strict));
        }
        if let Some(escape) = &self.escape {
            yaml.push_str(&format!("escape: {}\n", escape));
        }
        if let Some(prefix) = &self.prefix {
            yaml.push_str(&format!("prefix: \"{}\"\n", prefix));
        }
        yaml
    }

    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.generate_yaml())
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_file(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}.yaml", name))
    }

    pub fn create_config_file(&self, name: &str, builder: &TestConfigBuilder) -> PathBuf {
        let config_file = self.config_file(name);
        builder
            .write_to_file(&config_file)
            .expect("Failed to write config file");
        config_file
    }

    pub fn load_engine(&self, name: &str, builder: &TestConfigBuilder) -> HelperEngine {
        let path = self.create_config_file(name, builder);
        let config = HelperConfig::load(Some(path)).expect("Failed to load config");
        HelperEngine::with_config(&config).expect("Failed to create helper engine")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let yaml = TestConfigBuilder::new()
            .with_groups(&[HelperGroup::Array, HelperGroup::Match])
            .strict()
            .with_prefix("h_")
            .generate_yaml();

        assert!(yaml.contains("groups: [array, match]"));
        assert!(yaml.contains("strict_mode: true"));
        assert!(yaml.contains("prefix: \"h_\""));
    }

    #[test]
    fn test_environment_setup() {
        let env = TestEnvironment::new();
        assert!(env.path().exists());

        let config_file = env.config_file("test");
        assert!(config_file.to_string_lossy().contains("test.yaml"));
    }
}
