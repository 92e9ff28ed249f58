//! Config command - inspect and edit the parser and PDF settings.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use serde_json::Value;

use folio_core::FolioConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration, or one section of it
    Show {
        #[arg(value_enum)]
        section: Option<Section>,
    },

    /// Write the default configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, e.g. "parser.lookahead_window" or "parser.openers.0"
    Get { key: String },

    /// Change one value; the value is JSON, or a bare string
    Set { key: String, value: String },

    /// Restore one value to its default
    Reset { key: String },
}

/// Top-level sections of the configuration file.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Section {
    Parser,
    Pdf,
}

impl Section {
    const ALL: [Section; 2] = [Section::Parser, Section::Pdf];

    fn name(self) -> &'static str {
        match self {
            Section::Parser => "parser",
            Section::Pdf => "pdf",
        }
    }

    fn named(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show { section } => show(&path, section),
        ConfigCommand::Init { force } => init(&path, force),
        ConfigCommand::Get { key } => get(&path, &key),
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            update(&path, &key, value)
        }
        ConfigCommand::Reset { key } => {
            let defaults = serde_json::to_value(FolioConfig::default())?;
            let value = defaults
                .pointer(&pointer(&key)?)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            update(&path, &key, value)
        }
    }
}

/// JSON pointer for a dotted key whose first segment names a section.
fn pointer(key: &str) -> anyhow::Result<String> {
    let parts: Vec<&str> = key.split('.').collect();
    if Section::named(parts[0]).is_none() {
        let known: Vec<&str> = Section::ALL.iter().map(|s| s.name()).collect();
        anyhow::bail!(
            "Unknown config section '{}' (expected one of: {})",
            parts[0],
            known.join(", ")
        );
    }
    Ok(format!("/{}", parts.join("/")))
}

/// The config file as JSON, falling back to defaults when it is absent.
fn load(path: &Path) -> anyhow::Result<Value> {
    let config = if path.exists() {
        FolioConfig::from_file(path)?
    } else {
        FolioConfig::default()
    };
    Ok(serde_json::to_value(config)?)
}

fn show(path: &Path, section: Option<Section>) -> anyhow::Result<()> {
    if path.exists() {
        eprintln!("{} Using {}", style("ℹ").blue(), path.display());
    } else {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    let json = load(path)?;
    let shown = match section {
        Some(section) => &json[section.name()],
        None => &json,
    };
    println!("{}", serde_json::to_string_pretty(shown)?);

    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    FolioConfig::default().save(path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

fn get(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = load(path)?;
    let value = json
        .pointer(&pointer(key)?)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

/// Replace one existing value and save, keeping only what the typed
/// configuration accepts.
fn update(path: &Path, key: &str, value: Value) -> anyhow::Result<()> {
    let mut json = load(path)?;
    let slot = json
        .pointer_mut(&pointer(key)?)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value.clone();

    let config: FolioConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );

    Ok(())
}
