//! Instantiation settings.

use serde::{Deserialize, Serialize};

/// Settings for building an [`Assembly`](crate::Assembly). Every field has
/// a default; `AssemblyConfig::default()` reproduces `Assembly::new`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Prepended to every qualified component name. Empty by default.
    ///
    /// Useful when several assemblies share one log stream.
    #[serde(default)]
    pub prefix: String,
}

impl AssemblyConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the qualified-name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AssemblyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AssemblyConfig::default());
    }

    #[test]
    fn prefix_round_trips() {
        let config = AssemblyConfig::new().with_prefix("rank0_");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"prefix":"rank0_"}"#);
        let back: AssemblyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.prefix, "rank0_");
    }
}
