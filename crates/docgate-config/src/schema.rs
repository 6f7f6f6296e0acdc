use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocgateConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub governance: GovernanceSettings,
}

/// Which document store backs the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// `memory` or `sqlite://<path>`
    pub url: String,
    #[serde(deserialize_with = "optional_number_or_text")]
    pub max_connections: Option<u32>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { url: "sqlite://./data/docgate.db".to_string(), max_connections: None }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub transport: Transport,
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { transport: Transport::Stdio, http_addr: "127.0.0.1:8787".to_string() }
    }
}

/// Tool exposure and concurrency limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GovernanceSettings {
    /// Tool name patterns to expose; empty exposes all
    pub allow: Vec<String>,
    /// Tool name patterns to hide; wins over `allow`
    pub deny: Vec<String>,
    #[serde(deserialize_with = "number_or_text")]
    pub max_concurrency: usize,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self { allow: Vec::new(), deny: Vec::new(), max_concurrency: 10 }
    }
}

/// A number written either as a number or as text, as `${VAR}` references
/// always expand to text
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

impl<T> NumberOrText<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn into_number<E: serde::de::Error>(self) -> Result<T, E> {
        match self {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(text) => text
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("invalid number '{}': {}", text, e))),
        }
    }
}

fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    NumberOrText::<T>::deserialize(deserializer)?.into_number()
}

fn optional_number_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    Option::<NumberOrText<T>>::deserialize(deserializer)?
        .map(NumberOrText::into_number)
        .transpose()
}

impl DocgateConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.store.url.as_str();
        if url != "memory" && !url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(format!(
                "Unsupported store url '{}': expected 'memory' or 'sqlite://<path>'",
                url
            )));
        }
        if self.store.max_connections == Some(0) {
            return Err(ConfigError::Validation("store.max_connections must be at least 1".to_string()));
        }
        if self.governance.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "governance.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.server.http_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.http_addr '{}' is not a socket address",
                self.server.http_addr
            )));
        }
        for pattern in self.governance.allow.iter().chain(&self.governance.deny) {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Validation("Empty tool pattern in governance".to_string()));
            }
        }
        Ok(())
    }
}
