//! Configuration loading and parsing

use anyhow::{Context, Result};
use diag_log_analyzer::{AnalyzerConfig, StaticReference};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// Reference tables: module names, dependency edges, critical set.
///
/// Addresses are written as hex strings ("7E0") the way session logs print
/// them. The builtin table is used as a base unless disabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_true")]
    pub use_builtin: bool,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            use_builtin: true,
            modules: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleEntry {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DependencyEntry {
    pub module: String,
    pub requires: Vec<String>,
}

/// Optional enrichment collaborator configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// External command fed the JSON analysis on stdin; absent means the
    /// collaborator is unavailable and enrichment is skipped
    pub command: Option<String>,
}

/// Load and parse a configuration file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}

fn parse_address(text: &str) -> Result<u16> {
    u16::from_str_radix(text.trim(), 16)
        .with_context(|| format!("Invalid module address in config: {:?}", text))
}

impl ReferenceConfig {
    /// Build the immutable reference table shared by all pipelines
    pub fn build(&self) -> Result<StaticReference> {
        let mut table = if self.use_builtin {
            StaticReference::builtin()
        } else {
            StaticReference::new()
        };

        for module in &self.modules {
            table.add_module(
                parse_address(&module.address)?,
                module.name.clone(),
                module.critical,
            );
        }
        for dependency in &self.dependencies {
            let address = parse_address(&dependency.module)?;
            let required = dependency
                .requires
                .iter()
                .map(|peer| parse_address(peer))
                .collect::<Result<Vec<u16>>>()?;
            table.add_dependency(address, required);
        }

        log::debug!("Reference table ready: {} modules", table.module_count());
        Ok(table)
    }
}
