//! Rule configuration.
//!
//! The convention the rule enforces is described by five names. All of them
//! can be changed; [`RuleConfig::default`] gives the stock convention.

use thiserror::Error;

use crate::parser::tokenize;

/// Errors produced while loading or validating a [`RuleConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },

    #[error("`{field}` is not a valid identifier: '{value}'")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("`{field}` is not a valid qualified name: '{value}'")]
    InvalidQualifiedName { field: &'static str, value: String },

    #[cfg(feature = "serde")]
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Names describing the enforced convention.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct RuleConfig {
    /// Simple name of the methods the rule checks
    pub method_name: String,
    /// Prefix the enclosing namespace's written name must start with
    pub namespace_prefix: String,
    /// Qualified name of the interface the called member must come from
    pub interface_name: String,
    /// Simple name of the member that must be called
    pub member_name: String,
    /// Name of the parameter the fix adds
    pub parameter_name: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            method_name: "Run".to_string(),
            namespace_prefix: "SpecificNamespace".to_string(),
            interface_name: "SpecificNamespace.ISpecificInterface".to_string(),
            member_name: "Process".to_string(),
            parameter_name: "specificInterface".to_string(),
        }
    }
}

impl RuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = name.into();
        self
    }

    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    pub fn with_interface_name(mut self, name: impl Into<String>) -> Self {
        self.interface_name = name.into();
        self
    }

    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = name.into();
        self
    }

    pub fn with_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter_name = name.into();
        self
    }

    /// Last segment of the interface name, as shown in messages.
    pub fn interface_simple_name(&self) -> &str {
        self.interface_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.interface_name)
    }

    /// Check that every name is usable in generated code and lookups.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_identifier("method_name", &self.method_name)?;
        check_identifier("member_name", &self.member_name)?;
        check_identifier("parameter_name", &self.parameter_name)?;

        if self.interface_name.is_empty() {
            return Err(ConfigError::Empty {
                field: "interface_name",
            });
        }
        if !self.interface_name.split('.').all(is_identifier) {
            return Err(ConfigError::InvalidQualifiedName {
                field: "interface_name",
                value: self.interface_name.clone(),
            });
        }

        // A prefix may stop in the middle of a segment, so only the
        // characters are checked.
        if self.namespace_prefix.is_empty() {
            return Err(ConfigError::Empty {
                field: "namespace_prefix",
            });
        }
        let prefix_ok = self
            .namespace_prefix
            .chars()
            .all(|c| c == '.' || unicode_ident::is_xid_continue(c));
        if !prefix_ok {
            return Err(ConfigError::InvalidQualifiedName {
                field: "namespace_prefix",
                value: self.namespace_prefix.clone(),
            });
        }
        Ok(())
    }

    /// Load a configuration from JSON. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    if !is_identifier(value) {
        return Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A non-keyword identifier
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || unicode_ident::is_xid_start(first)) {
        return false;
    }
    if !chars.all(unicode_ident::is_xid_continue) {
        return false;
    }
    let tokens = tokenize(text);
    !(tokens.len() == 1 && tokens[0].kind.is_keyword())
}
