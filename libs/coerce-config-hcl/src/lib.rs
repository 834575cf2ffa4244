//! HCL front-end for coercion config files.
//!
//! ```hcl
//! format {
//!   decimal_separator = ","
//!   group_separator   = "."
//! }
//!
//! profiles = [
//!   { name = "swiss", group_separator = "'" },
//! ]
//! ```

use coerce_api::config::{CoerceConfig, ConfigLoader, ConfigParser};
use coerce_api::error::ConfigError;

pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<CoerceConfig, ConfigError> {
        hcl::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Loader that understands both `.toml` and `.hcl`.
pub fn loader() -> ConfigLoader {
    tracing::trace!("registering hcl config parser");
    ConfigLoader::new().with_parser(HclParser)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        format {
          decimal_separator = ","
          group_separator   = "."
        }

        profiles = [
          { name = "swiss", group_separator = "'" },
          { name = "plain", negative_sign = "~" },
        ]
    "#;

    #[test]
    fn parse_sample() {
        let config = HclParser.parse(SAMPLE).unwrap();
        assert_eq!(config.format.decimal_separator, ',');
        assert_eq!(config.format.group_separator, Some('.'));
        assert_eq!(config.profile("swiss").unwrap().group_separator, Some('\''));
        assert_eq!(config.profile("plain").unwrap().negative_sign, "~");
    }

    #[test]
    fn empty_body_is_invariant() {
        let config = HclParser.parse("").unwrap();
        assert_eq!(&config.format, coerce_api::FormatContext::invariant());
    }

    #[test]
    fn bad_hcl_is_parse_error() {
        let err = HclParser.parse("format {").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loader_dispatches_by_extension() {
        let loader = loader();
        assert!(loader.parser_for("hcl").is_some());
        assert!(loader.parser_for("toml").is_some());
        assert!(loader.parser_for("json").is_none());
    }

    #[test]
    fn load_hcl_file() {
        let path = std::env::temp_dir().join(format!("coerce-config-{}.hcl", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();
        let config = loader().load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().profiles.len(), 2);
    }
}
