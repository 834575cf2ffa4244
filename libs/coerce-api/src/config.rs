//! Optional config files for [`FormatContext`] profiles.
//!
//! Only [`ConfigLoader::load`] reads the filesystem. The coercer never
//! calls into this module; callers load a config once and pass the
//! resulting context to `convert_or_default_in`.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::format::FormatContext;

/// Root configuration: the default format context plus named profiles.
///
/// ```toml
/// [format]
/// decimal_separator = ","
/// group_separator = "."
///
/// [[profiles]]
/// name = "swiss"
/// group_separator = "'"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoerceConfig {
    #[serde(default)]
    pub format: FormatContext,

    #[serde(default)]
    pub profiles: Vec<FormatProfile>,
}

/// Named format context. Unset fields take invariant defaults, not the
/// root `format` values.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatProfile {
    pub name: String,
    #[serde(flatten)]
    pub format: FormatContext,
}

impl CoerceConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::new().load(path)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        TomlParser.parse(toml_str)
    }

    pub fn profile(&self, name: &str) -> Option<&FormatContext> {
        self.profiles.iter().find(|p| p.name == name).map(|p| &p.format)
    }

    /// Named profile, or the root format when `name` is `None` or unknown.
    pub fn context(&self, name: Option<&str>) -> &FormatContext {
        name.and_then(|n| self.profile(n)).unwrap_or(&self.format)
    }
}

/// Front-end for one config file syntax.
pub trait ConfigParser: Send + Sync {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<CoerceConfig, ConfigError>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<CoerceConfig, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Picks a [`ConfigParser`] by file extension. TOML is always registered.
pub struct ConfigLoader {
    parsers: Vec<Box<dyn ConfigParser>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { parsers: vec![Box::new(TomlParser)] }
    }

    pub fn with_parser(mut self, parser: impl ConfigParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    pub fn parser_for(&self, extension: &str) -> Option<&dyn ConfigParser> {
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&extension))
            .map(|p| p.as_ref())
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<CoerceConfig, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let parser = self
            .parser_for(extension)
            .ok_or_else(|| ConfigError::UnsupportedExtension(shown.clone()))?;

        let content = std::fs::read_to_string(path)?;
        let config = parser.parse(&content).map_err(|e| e.with_context(&shown))?;
        tracing::debug!(path = %shown, profiles = config.profiles.len(), "loaded coercion config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [format]
        decimal_separator = ","
        group_separator = "."

        [[profiles]]
        name = "swiss"
        group_separator = "'"

        [[profiles]]
        name = "minus"
        negative_sign = "−"
    "#;

    #[test]
    fn parse_sample() {
        let config = CoerceConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.format.decimal_separator, ',');
        assert_eq!(config.format.group_separator, Some('.'));
        assert_eq!(config.format.nan_symbol, "NaN");

        let swiss = config.profile("swiss").unwrap();
        assert_eq!(swiss.group_separator, Some('\''));
        assert_eq!(swiss.decimal_separator, '.');
        assert_eq!(config.profile("minus").unwrap().negative_sign, "\u{2212}");
    }

    #[test]
    fn context_falls_back_to_root() {
        let config = CoerceConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.context(Some("nope")), &config.format);
        assert_eq!(config.context(None), &config.format);
        assert_eq!(config.context(Some("swiss")).group_separator, Some('\''));
    }

    #[test]
    fn empty_config_is_invariant() {
        let config = CoerceConfig::parse("").unwrap();
        assert_eq!(&config.format, FormatContext::invariant());
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = CoerceConfig::parse("[format\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ConfigLoader::new().load("coerce.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedExtension(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("coerce-missing-{}.toml", std::process::id()));
        assert!(matches!(CoerceConfig::load(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("coerce-config-{}.toml", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();
        let config = CoerceConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().profiles.len(), 2);
    }
}
