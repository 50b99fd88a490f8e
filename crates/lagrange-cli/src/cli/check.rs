use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Path to the system file (TOML or JSON).
    pub system: PathBuf,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.system)?;
        config.validate()?;
        let label = config.system.label().to_string();

        config
            .system
            .check(&config.options())
            .with_context(|| format!("system `{label}` is invalid"))?;

        tracing::info!(system = %label, "system definition is valid");
        println!("{label}: ok");
        Ok(())
    }
}
