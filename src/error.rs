//! Failure taxonomy for manifest-backed asset resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving assets in production mode.
///
/// None of these are recovered internally. They describe a mismatch between the
/// build output and the page asking for it, so callers should surface them loudly.
#[derive(Debug, Error)]
pub enum AssetError {
  /// The manifest file could not be opened or is not valid JSON.
  #[error("cannot read Vite manifest file at {}: {source}", path.display())]
  ManifestUnreadable {
    /// Location the manifest was read from.
    path: PathBuf,
    /// Underlying read or parse failure.
    #[source]
    source: ManifestFault,
  },

  /// The requested entry is not a key of the loaded manifest.
  #[error("cannot find {asset} in Vite manifest at {}", manifest.display())]
  UnknownAsset {
    /// Entry path that was requested.
    asset: String,
    /// Manifest the lookup ran against.
    manifest: PathBuf,
  },

  /// No manifest key contains the legacy polyfills marker.
  #[error("Vite legacy polyfills ({motif}) not found in manifest at {}", manifest.display())]
  PolyfillsNotFound {
    /// Marker substring that was searched for.
    motif: String,
    /// Manifest the scan ran against.
    manifest: PathBuf,
  },

  /// The import graph loops back onto an entry that is still being walked.
  #[error("import cycle in Vite manifest at {}: {}", manifest.display(), chain.join(" -> "))]
  CyclicManifest {
    /// Keys along the cycle, starting and ending with the repeated key.
    chain: Vec<String>,
    /// Manifest the walk ran against.
    manifest: PathBuf,
  },

  /// An entry that has to be rendered carries no `file` field.
  #[error("entry {asset} in Vite manifest at {} has no output file", manifest.display())]
  MissingOutputFile {
    /// Entry key without an output file.
    asset: String,
    /// Manifest the entry belongs to.
    manifest: PathBuf,
  },
}

/// Low-level reason a manifest could not be loaded.
#[derive(Debug, Error)]
pub enum ManifestFault {
  /// The file could not be opened or read.
  #[error(transparent)]
  Io(#[from] std::io::Error),
  /// The content is not a valid manifest document.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl AssetError {
  pub(crate) fn unreadable(path: impl Into<PathBuf>, source: impl Into<ManifestFault>) -> Self {
    Self::ManifestUnreadable {
      path: path.into(),
      source: source.into(),
    }
  }
}

/// Result alias used throughout the resolution pipeline.
pub type AssetResult<T> = Result<T, AssetError>;
