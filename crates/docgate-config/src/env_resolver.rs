//! Environment variable interpolation with a prefix whitelist and defaults

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::env;
use thiserror::Error;

/// Matches `${VAR}` or `${VAR:default}`
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("valid variable pattern"));

#[derive(Debug, Error)]
pub enum EnvResolverError {
    #[error("Environment variable '{0}' not found and no default provided")]
    VarNotFound(String),
    #[error("Environment variable '{0}' is not in whitelist. Allowed prefixes: {1:?}")]
    VarNotWhitelisted(String, Vec<String>),
    #[error("Variable expansion in '{0}' did not settle after {1} passes")]
    TooDeep(String, usize),
}

/// Resolves `${VAR}` references inside configuration values
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Allowed variable name prefixes; empty means unrestricted
    allowed_prefixes: Vec<String>,
    max_depth: usize,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self {
            allowed_prefixes: vec![
                "DOCGATE_".to_string(),
                "APP_".to_string(),
                "DB_".to_string(),
                "LOG_".to_string(),
            ],
            max_depth: 10,
        }
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self { allowed_prefixes, max_depth: 10 }
    }

    /// Allow every variable
    pub fn unrestricted() -> Self {
        Self::new(vec![])
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Resolve every string in a JSON tree
    pub fn resolve(&self, value: &JsonValue) -> Result<JsonValue, EnvResolverError> {
        match value {
            JsonValue::String(s) => self.resolve_string(s),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::new();
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve(val)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(arr) => arr
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }

    /// Expand references in one string. The result is always a string; typed
    /// config fields parse it themselves.
    fn resolve_string(&self, input: &str) -> Result<JsonValue, EnvResolverError> {
        if !input.contains("${") {
            return Ok(JsonValue::String(input.to_string()));
        }

        let mut result = input.to_string();
        let mut passes = 0;
        while VAR_PATTERN.is_match(&result) {
            if passes >= self.max_depth {
                return Err(EnvResolverError::TooDeep(input.to_string(), self.max_depth));
            }
            passes += 1;

            let mut expanded = String::with_capacity(result.len());
            let mut last = 0;
            for caps in VAR_PATTERN.captures_iter(&result) {
                let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
                let var_name = &caps[1];
                self.validate_var_name(var_name)?;

                let value = match env::var(var_name) {
                    Ok(value) => value,
                    Err(_) => match caps.get(2) {
                        Some(default) => default.as_str().to_string(),
                        None => return Err(EnvResolverError::VarNotFound(var_name.to_string())),
                    },
                };
                expanded.push_str(&result[last..whole.start]);
                expanded.push_str(&value);
                last = whole.end;
            }
            expanded.push_str(&result[last..]);
            result = expanded;
        }

        Ok(JsonValue::String(result))
    }

    fn validate_var_name(&self, var_name: &str) -> Result<(), EnvResolverError> {
        if self.allowed_prefixes.is_empty()
            || self.allowed_prefixes.iter().any(|prefix| var_name.starts_with(prefix))
        {
            return Ok(());
        }
        Err(EnvResolverError::VarNotWhitelisted(
            var_name.to_string(),
            self.allowed_prefixes.clone(),
        ))
    }
}
