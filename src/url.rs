//! URL construction for dev-server and production assets.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use url::{ParseError, Position, Url};

use crate::config::ViteConfig;
use crate::error::{AssetError, AssetResult};

// Stand-in origin for resolving path-only bases; never part of the output.
const PLACEHOLDER_ORIGIN: &str = "http://x/";

/// Resolve `reference` against `base` the way a browser resolves a relative link.
///
/// Absolute references are returned as is, references starting with `/` replace the
/// path of `base`, anything else is resolved against its directory with `.` and `..`
/// segments removed. A base without scheme yields a path, relative if `base` was.
pub fn join_url(base: &str, reference: &str) -> String {
  match try_join(base, reference) {
    Ok(joined) => joined,
    Err(err) => {
      tracing::warn!(base, reference, %err, "cannot resolve URL, concatenating");
      format!("{base}{reference}")
    }
  }
}

fn try_join(base: &str, reference: &str) -> Result<String, ParseError> {
  if let Ok(absolute) = Url::parse(reference) {
    return Ok(absolute.to_string());
  }

  match Url::parse(base) {
    Ok(base_url) => Ok(base_url.join(reference)?.to_string()),
    Err(ParseError::RelativeUrlWithoutBase) => {
      let joined = Url::parse(PLACEHOLDER_ORIGIN)?.join(base)?.join(reference)?;
      let path = &joined[Position::BeforePath..];
      if base.starts_with('/') || reference.starts_with('/') {
        Ok(path.to_string())
      } else {
        Ok(path.trim_start_matches('/').to_string())
      }
    }
    Err(err) => Err(err),
  }
}

/// External lookup mapping a static file name to its public (possibly versioned) URL.
pub trait StaticStorage: Send + Sync {
  /// Public URL for `name`.
  fn url(&self, name: &str) -> String;
}

/// Serves every file below a fixed base URL.
#[derive(Debug, Clone)]
pub struct PrefixedStorage {
  base_url: String,
}

impl PrefixedStorage {
  /// Storage rooted at `base_url`.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
    }
  }
}

impl StaticStorage for PrefixedStorage {
  fn url(&self, name: &str) -> String {
    join_url(&self.base_url, name.trim_start_matches('/'))
  }
}

#[derive(Debug, Default, Deserialize)]
struct StaticFilesManifest {
  #[serde(default)]
  paths: HashMap<String, String>,
}

/// Storage backed by a `staticfiles.json` map of file names to content-hashed names.
#[derive(Debug, Clone)]
pub struct HashedStorage {
  base_url: String,
  paths: HashMap<String, String>,
}

impl HashedStorage {
  /// Storage with an explicit name mapping.
  pub fn new(base_url: impl Into<String>, paths: HashMap<String, String>) -> Self {
    Self {
      base_url: base_url.into(),
      paths,
    }
  }

  /// Read the hashed-name mapping from a `staticfiles.json` document.
  pub fn load(base_url: impl Into<String>, path: &Path) -> AssetResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| AssetError::unreadable(path, err))?;
    let manifest: StaticFilesManifest =
      serde_json::from_str(&content).map_err(|err| AssetError::unreadable(path, err))?;
    Ok(Self::new(base_url, manifest.paths))
  }
}

impl StaticStorage for HashedStorage {
  fn url(&self, name: &str) -> String {
    let name = name.trim_start_matches('/');
    let hashed = match self.paths.get(name) {
      Some(hashed) => hashed.as_str(),
      None => {
        tracing::warn!(name, "no hashed name for static file, serving it unversioned");
        name
      }
    };
    join_url(&self.base_url, hashed)
  }
}

/// Builds the URLs emitted in tags for both modes.
#[derive(Clone)]
pub struct UrlResolver {
  dev_origin: String,
  static_base_url: String,
  production_prefix: String,
  storage: Option<Arc<dyn StaticStorage>>,
}

impl UrlResolver {
  /// Resolver using the URL settings of `config` and no storage collaborator.
  pub fn from_config(config: &ViteConfig) -> Self {
    Self {
      dev_origin: config.dev_server_origin(),
      static_base_url: config.static_base_url(),
      production_prefix: config.production_prefix(),
      storage: None,
    }
  }

  /// Route production URLs through `storage`.
  pub fn with_storage(mut self, storage: Arc<dyn StaticStorage>) -> Self {
    self.storage = Some(storage);
    self
  }

  /// URL of `path` on the dev server.
  pub fn dev_server_url(&self, path: &str) -> String {
    join_url(&self.dev_origin, &join_url(&self.static_base_url, path))
  }

  /// Public URL of a compiled output file.
  pub fn production_url(&self, file: &str) -> String {
    let joined = join_url(&self.production_prefix, file);
    match &self.storage {
      Some(storage) => storage.url(&joined),
      None => joined,
    }
  }
}

impl std::fmt::Debug for UrlResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("UrlResolver")
      .field("dev_origin", &self.dev_origin)
      .field("static_base_url", &self.static_base_url)
      .field("production_prefix", &self.production_prefix)
      .field("storage", &self.storage.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn joins_relative_references_onto_directory() {
    assert_eq!(join_url("/static/", "src/main.ts"), "/static/src/main.ts");
    assert_eq!(join_url("/static/app.js", "main.ts"), "/static/main.ts");
    assert_eq!(join_url("", "main.ts"), "main.ts");
  }

  #[test]
  fn absolute_path_replaces_base_path() {
    assert_eq!(
      join_url("http://localhost:3000", "/static/src/main.ts"),
      "http://localhost:3000/static/src/main.ts"
    );
    assert_eq!(join_url("https://cdn.test/a/b", "/c"), "https://cdn.test/c");
    assert_eq!(join_url("/static/", "/other.js"), "/other.js");
  }

  #[test]
  fn origin_without_path_gets_root_slash() {
    assert_eq!(join_url("http://localhost:3000", "main.ts"), "http://localhost:3000/main.ts");
  }

  #[test]
  fn dot_segments_are_removed() {
    assert_eq!(join_url("/static/", "../x.js"), "/x.js");
    assert_eq!(join_url("/static/dist/", "./a/../b.js"), "/static/dist/b.js");
    assert_eq!(
      join_url("http://localhost:3000/static/", "../../vite/legacy-polyfills-legacy"),
      "http://localhost:3000/vite/legacy-polyfills-legacy"
    );
  }

  #[test]
  fn relative_bases_stay_relative() {
    assert_eq!(join_url("bundler/", "assets/main.js"), "bundler/assets/main.js");
    assert_eq!(join_url("bundler/", "../main.js"), "main.js");
    assert_eq!(join_url("bundler/", "/main.js"), "/main.js");
  }

  #[test]
  fn keeps_query_and_fragment() {
    assert_eq!(join_url("/static/", "a.js?v=2#top"), "/static/a.js?v=2#top");
  }

  #[test]
  fn absolute_references_win() {
    assert_eq!(join_url("/static/", "https://cdn.test/x.js"), "https://cdn.test/x.js");
    assert_eq!(join_url("/static/", ""), "/static/");
  }

  #[test]
  fn dev_server_urls_include_static_base() {
    let urls = UrlResolver::from_config(&ViteConfig::default());
    assert_eq!(
      urls.dev_server_url("src/main.ts"),
      "http://localhost:3000/static/src/main.ts"
    );
    assert_eq!(
      urls.dev_server_url("@vite/client"),
      "http://localhost:3000/static/@vite/client"
    );
    assert_eq!(
      urls.dev_server_url("../../vite/legacy-polyfills-legacy"),
      "http://localhost:3000/vite/legacy-polyfills-legacy"
    );
  }

  #[test]
  fn production_urls_without_storage_are_prefix_joined() {
    let urls = UrlResolver::from_config(&ViteConfig::default());
    assert_eq!(urls.production_url("assets/main.js"), "/assets/main.js");
  }

  #[test]
  fn production_urls_go_through_storage() {
    let urls = UrlResolver::from_config(&ViteConfig::default())
      .with_storage(Arc::new(PrefixedStorage::new("/static/")));
    assert_eq!(urls.production_url("assets/main.js"), "/static/assets/main.js");
  }

  #[test]
  fn hashed_storage_versions_known_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("staticfiles.json");
    fs::write(
      &path,
      r#"{"version": "1.1", "paths": {"assets/main.js": "assets/main.3f2a.js"}}"#,
    )
    .unwrap();

    let storage = HashedStorage::load("/static/", &path).unwrap();
    assert_eq!(storage.url("/assets/main.js"), "/static/assets/main.3f2a.js");
    assert_eq!(storage.url("assets/other.js"), "/static/assets/other.js");
  }

  #[test]
  fn hashed_storage_reports_unreadable_mapping() {
    let dir = tempdir().unwrap();
    let err = HashedStorage::load("/static/", &dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, AssetError::ManifestUnreadable { .. }));
  }
}
