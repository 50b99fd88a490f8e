use anyhow::{Context, Result};
use lagrange::prelude::{DeriveOptions, ExportConfig, NamingConvention, SimplifierConfig};
use lagrange::SystemDefinition;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// A system file: the system itself plus optional stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Coordinates, parameters, energies and forces
    pub system: SystemDefinition,

    /// Velocity and acceleration naming
    #[serde(default)]
    pub naming: NamingConvention,

    /// Simplifier limits
    #[serde(default)]
    pub simplify: SimplifierConfig,

    /// Output spelling
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load a system file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read system file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Parse a system file from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse system file as TOML")
    }

    /// Parse a system file from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse system file as JSON")
    }

    /// Checks the shape of the file before anything is parsed
    pub fn validate(&self) -> Result<()> {
        if self.system.coordinates.is_empty() {
            anyhow::bail!("system.coordinates cannot be empty");
        }
        if let Some(forces) = &self.system.forces {
            if forces.len() != self.system.coordinates.len() {
                anyhow::bail!(
                    "system.forces has {} entries but there are {} coordinates",
                    forces.len(),
                    self.system.coordinates.len()
                );
            }
        }
        if self.export.log_name.is_empty() {
            anyhow::bail!("export.log_name cannot be empty");
        }
        Ok(())
    }

    pub fn options(&self) -> DeriveOptions {
        DeriveOptions {
            naming: self.naming.clone(),
            simplifier: self.simplify.clone(),
            export: self.export.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagrange::prelude::PowerSyntax;

    const PENDULUM: &str = r#"
[system]
name = "pendulum"
coordinates = ["theta"]
parameters = ["m", "l", "g"]
kinetic = "m*l^2*dtheta^2/2"
potential = "-m*g*l*cos(theta)"
"#;

    #[test]
    fn test_parse_minimal() {
        let config = Config::from_toml(PENDULUM).unwrap();
        assert_eq!(config.system.coordinates, ["theta"]);
        assert_eq!(config.naming, NamingConvention::default());
        assert_eq!(config.export.power, PowerSyntax::Caret);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_all_tables() {
        let toml = format!(
            r#"{PENDULUM}
[naming]
velocity = {{ suffix = "_dot" }}
acceleration = {{ suffix = "_ddot" }}

[simplify]
expand_limit = 4

[export]
power = "double-star"
log_name = "ln"

[export.renames]
theta_dot = "omega"
"#
        );
        let config = Config::from_toml(&toml).unwrap();
        assert_eq!(config.simplify.expand_limit, 4);
        assert!(config.simplify.trig);
        assert_eq!(config.export.power, PowerSyntax::DoubleStar);
        assert_eq!(config.export.renames["theta_dot"], "omega");
        let options = config.options();
        assert_eq!(options.naming, config.naming);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "system": {
                "coordinates": ["x"],
                "kinetic": "dx^2/2",
                "potential": "x^2/2"
            }
        }"#;
        let config = Config::from_json(json).unwrap();
        assert!(config.system.parameters.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = Config::from_toml(PENDULUM).unwrap();
        config.system.forces = Some(vec!["0".to_string(), "0".to_string()]);
        assert!(config.validate().is_err());

        config.system.forces = None;
        config.system.coordinates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_system_table() {
        assert!(Config::from_toml("[export]\npower = \"caret\"\n").is_err());
    }
}
