use crate::env_resolver::EnvResolver;
use crate::error::{ConfigError, ConfigResult};
use crate::schema::DocgateConfig;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Supported file formats for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// Parses configuration files, expanding `${VAR}` references before deserializing
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    resolver: EnvResolver,
}

impl ConfigLoader {
    pub fn new(resolver: EnvResolver) -> Self {
        Self { resolver }
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<DocgateConfig> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), ?format, "loading configuration");
        self.parse_content(&content, format)
    }

    /// Parse configuration content directly
    pub fn parse_content(&self, content: &str, format: FileFormat) -> ConfigResult<DocgateConfig> {
        let raw: JsonValue = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };

        // an empty YAML document parses as null
        let raw = match raw {
            JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
            JsonValue::Object(_) => raw,
            _ => {
                return Err(ConfigError::Validation(
                    "Configuration root must be a mapping".to_string(),
                ))
            }
        };

        let resolved = self.resolver.resolve(&raw)?;
        let config: DocgateConfig = serde_json::from_value(resolved)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Transport;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(FileFormat::from_path("a.yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("a.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("a.json").unwrap(), FileFormat::Json);
        assert!(matches!(FileFormat::from_path("a.toml"), Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(FileFormat::from_path("config"), Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = ConfigLoader::default().parse_content("", FileFormat::Yaml).unwrap();
        assert_eq!(config, DocgateConfig::default());
    }

    #[test]
    fn parses_partial_yaml() {
        let yaml = r#"
store:
  url: memory
server:
  transport: http
governance:
  deny: ["delete_*"]
"#;
        let config = ConfigLoader::default().parse_content(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.store.url, "memory");
        assert_eq!(config.server.transport, Transport::Http);
        assert_eq!(config.server.http_addr, "127.0.0.1:8787");
        assert_eq!(config.governance.deny, vec!["delete_*"]);
        assert_eq!(config.governance.max_concurrency, 10);
    }

    #[test]
    fn rejects_unknown_fields_and_non_mapping_root() {
        let loader = ConfigLoader::default();
        assert!(matches!(
            loader.parse_content(r#"{"stor": {}}"#, FileFormat::Json),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            loader.parse_content("[1, 2]", FileFormat::Json),
            Err(ConfigError::Validation(_))
        ));
    }
}
