use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, AssetResult};
use crate::manifest::Manifest;

/// Somewhere a manifest can be read from.
///
/// The store calls [`ManifestSource::read`] at most once per successful load, so
/// implementations do not need to cache anything themselves.
pub trait ManifestSource: Send + Sync {
  /// Produce the parsed manifest.
  fn read(&self) -> AssetResult<Manifest>;

  /// Location reported in error messages.
  fn location(&self) -> &Path;
}

/// Manifest read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileManifest {
  path: PathBuf,
}

impl FileManifest {
  /// Source reading the manifest at `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl ManifestSource for FileManifest {
  fn read(&self) -> AssetResult<Manifest> {
    let content =
      fs::read_to_string(&self.path).map_err(|err| AssetError::unreadable(&self.path, err))?;
    let manifest = Manifest::from_json(&self.path, &content)?;
    tracing::info!(
      path = %self.path.display(),
      entries = manifest.len(),
      "loaded Vite manifest"
    );
    Ok(manifest)
  }

  fn location(&self) -> &Path {
    &self.path
  }
}

/// Source handing out a manifest that is already in memory.
#[derive(Debug, Clone)]
pub struct StaticManifest(pub Manifest);

impl ManifestSource for StaticManifest {
  fn read(&self) -> AssetResult<Manifest> {
    Ok(self.0.clone())
  }

  fn location(&self) -> &Path {
    self.0.location()
  }
}
