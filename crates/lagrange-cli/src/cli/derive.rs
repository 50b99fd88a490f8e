use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use lagrange::prelude::{ExportedExpression, Exporter, PowerSyntax};
use lagrange::DerivedSystem;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args)]
pub struct DeriveArgs {
    /// Path to the system file (TOML or JSON).
    pub system: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Power operator, overriding `export.power`.
    #[arg(long, value_enum)]
    pub power: Option<Power>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One `acceleration = expression` line per coordinate
    Text,
    /// A JSON array with text and tokens
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Power {
    /// x^2
    Caret,
    /// x**2
    DoubleStar,
}

impl From<Power> for PowerSyntax {
    fn from(power: Power) -> Self {
        match power {
            Power::Caret => PowerSyntax::Caret,
            Power::DoubleStar => PowerSyntax::DoubleStar,
        }
    }
}

/// One output row.
#[derive(Debug, Serialize)]
struct Row<'a> {
    coordinate: &'a str,
    acceleration: String,
    expression: &'a ExportedExpression,
}

impl DeriveArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.system)?;
        config.validate()?;
        let label = config.system.label().to_string();

        let mut options = config.options();
        if let Some(power) = self.power {
            options.export.power = power.into();
        }

        let derived = config
            .system
            .derive(&options)
            .with_context(|| format!("failed to derive `{label}`"))?;
        let output = render(&derived, &Exporter::with_config(options.export), self.format)
            .with_context(|| format!("derived `{label}` but could not export it"))?;

        tracing::info!(system = %label, coordinates = derived.registry().coordinates().len(), "done");
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

fn render(derived: &DerivedSystem, exporter: &Exporter, format: Format) -> Result<String> {
    let registry = derived.registry();
    let exported = exporter.export_derivation(registry, derived.derivation())?;
    let rows: Vec<Row<'_>> = exported
        .iter()
        .zip(registry.coordinates())
        .map(|((coordinate, expression), coord)| Row {
            coordinate,
            acceleration: exporter.exported_name(coord.acceleration()),
            expression,
        })
        .collect();

    Ok(match format {
        Format::Text => rows
            .iter()
            .map(|row| format!("{} = {}\n", row.acceleration, row.expression))
            .collect(),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&rows)?;
            json.push('\n');
            json
        }
    })
}
