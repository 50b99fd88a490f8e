//! Export configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Spelling of the power operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerSyntax {
    /// `x^2`
    #[default]
    Caret,
    /// `x**2`
    DoubleStar,
}

impl PowerSyntax {
    /// The operator text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PowerSyntax::Caret => "^",
            PowerSyntax::DoubleStar => "**",
        }
    }
}

/// How exported expressions are spelled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Power operator.
    pub power: PowerSyntax,
    /// Symbol renames applied after derived names are resolved, e.g.
    /// `dmass_1.angle -> mass_1.angular_velocity`.
    pub renames: BTreeMap<String, String>,
    /// Name written for the natural logarithm.
    pub log_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            power: PowerSyntax::Caret,
            renames: BTreeMap::new(),
            log_name: "log".to_string(),
        }
    }
}

impl ExportConfig {
    /// Replaces the power syntax.
    #[must_use]
    pub fn with_power(mut self, power: PowerSyntax) -> Self {
        self.power = power;
        self
    }

    /// Adds one rename.
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.power, PowerSyntax::Caret);
        assert_eq!(config.log_name, "log");
        assert!(config.renames.is_empty());
    }

    #[test]
    fn test_serde_partial() {
        let config: ExportConfig =
            serde_json::from_str(r#"{ "power": "double-star", "renames": { "dx": "vx" } }"#)
                .unwrap();
        assert_eq!(config.power, PowerSyntax::DoubleStar);
        assert_eq!(config.renames["dx"], "vx");
        assert_eq!(config.log_name, "log");
    }
}
