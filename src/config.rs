//! Settings consumed by the asset loader.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::url::join_url;

/// Configuration file looked up by [`ViteConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "vite-assets.json";

/// Whether assets come from the dev server or from the build manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Assets are served live by the Vite dev server.
  Development,
  /// Assets are resolved through the generated manifest.
  Production,
}

/// Loader settings. Read once at startup and treated as immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViteConfig {
  /// Serve assets from the dev server instead of the manifest.
  pub dev_mode: bool,
  /// Dev server protocol, `http` or `https`.
  pub dev_server_protocol: String,
  /// Dev server host name.
  pub dev_server_host: String,
  /// Dev server port.
  pub dev_server_port: u16,
  /// Path of the hot-reload client served by the dev server.
  pub ws_client_url: String,
  /// Path of the React fast-refresh runtime served by the dev server.
  pub react_refresh_url: String,
  /// Directory holding the compiled assets (and the manifest in dev mode).
  pub assets_path: PathBuf,
  /// Base URL static files are served from.
  pub static_url: String,
  /// Prefix of the compiled assets below `static_url`.
  pub static_url_prefix: String,
  /// Directory static files are collected into for production.
  pub static_root: PathBuf,
  /// Explicit manifest location; derived from the other paths when unset.
  pub manifest_path: Option<PathBuf>,
  /// Substring identifying the legacy polyfills chunk in the manifest.
  pub legacy_polyfills_motif: String,
}

impl Default for ViteConfig {
  fn default() -> Self {
    Self {
      dev_mode: false,
      dev_server_protocol: "http".into(),
      dev_server_host: "localhost".into(),
      dev_server_port: 3000,
      ws_client_url: "@vite/client".into(),
      react_refresh_url: "@react-refresh".into(),
      assets_path: PathBuf::from("assets"),
      static_url: "/static/".into(),
      static_url_prefix: String::new(),
      static_root: PathBuf::from("staticfiles"),
      manifest_path: None,
      legacy_polyfills_motif: "legacy-polyfills".into(),
    }
  }
}

impl ViteConfig {
  /// Load `vite-assets.json` from `dir`, falling back to defaults when it does not exist.
  pub fn discover(dir: &Path) -> Result<Self> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match fs::read_to_string(&candidate) {
      Ok(content) => Self::parse(&candidate, &content),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
      Err(err) => {
        Err(err).with_context(|| format!("failed to read config at {}", candidate.display()))
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("config not found at {}", path.display()))?;
    Self::parse(path, &content)
  }

  fn parse(path: &Path, content: &str) -> Result<Self> {
    serde_json::from_str(content)
      .with_context(|| format!("failed to parse config JSON at {}", path.display()))
  }

  /// Active mode.
  pub fn mode(&self) -> Mode {
    if self.dev_mode {
      Mode::Development
    } else {
      Mode::Production
    }
  }

  /// `{protocol}://{host}:{port}` of the dev server.
  pub fn dev_server_origin(&self) -> String {
    format!(
      "{}://{}:{}",
      self.dev_server_protocol, self.dev_server_host, self.dev_server_port
    )
  }

  /// `static_url` joined with `static_url_prefix`, always ending in `/`.
  pub fn static_base_url(&self) -> String {
    let mut url = join_url(&self.static_url, &self.static_url_prefix);
    if !url.ends_with('/') {
      url.push('/');
    }
    url
  }

  /// Prefix joined with manifest `file` values in production.
  pub fn production_prefix(&self) -> String {
    let mut prefix = self.static_url_prefix.clone();
    if !prefix.ends_with('/') {
      prefix.push('/');
    }
    prefix
  }

  /// Manifest location: explicit, or `manifest.json` under the asset root for the active mode.
  pub fn manifest_path(&self) -> PathBuf {
    if let Some(path) = &self.manifest_path {
      return path.clone();
    }

    let root = match self.mode() {
      Mode::Development => self.assets_path.clone(),
      Mode::Production => self.static_root.join(&self.static_url_prefix),
    };
    root.join("manifest.json")
  }
}
