use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vite_assets::{AssetLoader, Attrs, HashedStorage, PrefixedStorage, ViteConfig};

/// Render the tags needed to load Vite assets.
#[derive(Debug, Parser)]
#[command(name = "vite-assets", version, about)]
struct Cli {
  /// Explicit configuration file.
  #[arg(long, global = true, conflicts_with = "dir")]
  config: Option<PathBuf>,
  /// Directory searched for `vite-assets.json`.
  #[arg(long, global = true, default_value = ".")]
  dir: PathBuf,
  /// Force development mode regardless of the configuration.
  #[arg(long, global = true)]
  dev: bool,
  /// `staticfiles.json` mapping output files to versioned names.
  #[arg(long, global = true)]
  static_manifest: Option<PathBuf>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Stylesheets, module script and preload hints for an entry.
  Asset {
    path: String,
    /// Extra script attribute, `name=value`.
    #[arg(short = 'a', long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, String)>,
  },
  /// URL of an entry's own output file.
  Url { path: String },
  /// Preload hints for an entry and its dependencies.
  Preload { path: String },
  /// `nomodule` script for a legacy entry.
  Legacy {
    path: String,
    #[arg(short = 'a', long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, String)>,
  },
  /// `nomodule` script for the legacy polyfills.
  Polyfills {
    #[arg(short = 'a', long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, String)>,
  },
  /// Dev server hot-reload client.
  HmrClient {
    #[arg(short = 'a', long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, String)>,
  },
  /// React fast-refresh preamble.
  ReactRefresh,
  /// Stylesheets required by an entry, one per line.
  Css { path: String },
}

fn parse_attr(raw: &str) -> Result<(String, String), String> {
  match raw.split_once('=') {
    Some((name, _)) if name.is_empty() => Err(format!("missing attribute name in `{raw}`")),
    Some((name, value)) => Ok((name.to_string(), value.to_string())),
    None => Ok((raw.to_string(), String::new())),
  }
}

fn load_config(cli: &Cli) -> Result<ViteConfig> {
  let mut config = match &cli.config {
    Some(path) => ViteConfig::from_path(path)?,
    None => ViteConfig::discover(&cli.dir)?,
  };
  if cli.dev {
    config.dev_mode = true;
  }
  Ok(config)
}

fn build_loader(config: &ViteConfig, static_manifest: Option<&Path>) -> Result<AssetLoader> {
  let loader = AssetLoader::from_config(config);
  let loader = match static_manifest {
    Some(path) => {
      let storage = HashedStorage::load(config.static_url.clone(), path)
        .with_context(|| format!("failed to load static files map {}", path.display()))?;
      loader.with_storage(Arc::new(storage))
    }
    None => loader.with_storage(Arc::new(PrefixedStorage::new(config.static_url.clone()))),
  };
  Ok(loader)
}

fn run(cli: Cli) -> Result<String> {
  let config = load_config(&cli)?;
  let loader = build_loader(&config, cli.static_manifest.as_deref())?;
  tracing::debug!(mode = ?loader.mode(), manifest = %config.manifest_path().display(), "loader ready");

  let output = match cli.command {
    Command::Asset { path, attrs } => loader.resolve_asset(&path, &Attrs::from_iter(attrs))?,
    Command::Url { path } => loader.resolve_asset_url(&path)?,
    Command::Preload { path } => loader.preload_asset(&path)?,
    Command::Legacy { path, attrs } => {
      loader.resolve_legacy_asset(&path, &Attrs::from_iter(attrs))?
    }
    Command::Polyfills { attrs } => loader.resolve_legacy_polyfills(&Attrs::from_iter(attrs))?,
    Command::HmrClient { attrs } => loader.resolve_dev_client(&Attrs::from_iter(attrs)),
    Command::ReactRefresh => loader.resolve_react_refresh_preamble(),
    Command::Css { path } => loader.stylesheets(&path)?.join("\n"),
  };
  Ok(output)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let output = run(cli)?;
  if !output.is_empty() {
    println!("{output}");
  }
  Ok(())
}
