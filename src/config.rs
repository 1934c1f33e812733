use serde::Deserialize;

use crate::input::ReadOptions;
use crate::rules::DEFAULT_SECTION;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rules: RulesConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Path of the JSON rule document.
    pub path: String,
    /// Top-level key of the rule document that holds the per-object rules.
    #[serde(default = "default_section")]
    pub section: String,
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub path: String,
    /// Lenient mode: log and skip malformed lines. Off by default; any bad line aborts the run.
    #[serde(default)]
    pub skip_malformed_lines: bool,
}

impl InputConfig {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            skip_malformed_lines: self.skip_malformed_lines,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Append the object/counter/instance dictionaries after the sample lines.
    #[serde(default = "default_print_dictionaries")]
    pub print_dictionaries: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            print_dictionaries: default_print_dictionaries(),
        }
    }
}

fn default_print_dictionaries() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.rules.path.is_empty(), "rules.path must be non-empty");
        anyhow::ensure!(
            !self.rules.section.is_empty(),
            "rules.section must be non-empty"
        );
        anyhow::ensure!(!self.input.path.is_empty(), "input.path must be non-empty");
        Ok(())
    }
}
