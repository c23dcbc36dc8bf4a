//! Serde model of the manifest file written by `vite build`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{AssetError, AssetResult};

/// A single chunk recorded in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
  /// Output path of the chunk, relative to the asset root.
  #[serde(default)]
  pub file: Option<String>,
  /// Manifest keys this chunk statically imports.
  #[serde(default)]
  pub imports: Vec<String>,
  /// Output stylesheets this chunk requires directly.
  #[serde(default)]
  pub css: Vec<String>,
}

/// Parsed manifest keyed by source entry path, in document order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
  location: PathBuf,
  entries: IndexMap<String, ManifestEntry>,
}

impl Manifest {
  fn new(location: impl Into<PathBuf>, entries: IndexMap<String, ManifestEntry>) -> Self {
    Self {
      location: location.into(),
      entries,
    }
  }

  /// Parse a manifest document.
  pub fn from_json(location: impl Into<PathBuf>, content: &str) -> AssetResult<Self> {
    let location = location.into();
    match serde_json::from_str(content) {
      Ok(entries) => Ok(Self::new(location, entries)),
      Err(err) => Err(AssetError::unreadable(location, err)),
    }
  }

  /// Where the manifest was loaded from.
  pub fn location(&self) -> &Path {
    &self.location
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  /// Iterate entries in document order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
    self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
  }

  /// Look up an entry, failing with [`AssetError::UnknownAsset`] when absent.
  pub fn lookup(&self, key: &str) -> AssetResult<&ManifestEntry> {
    self.lookup_keyed(key).map(|(_, entry)| entry)
  }

  /// Look up an entry and return the manifest-owned key alongside it.
  pub(crate) fn lookup_keyed(&self, key: &str) -> AssetResult<(&str, &ManifestEntry)> {
    self
      .entries
      .get_key_value(key)
      .map(|(key, entry)| (key.as_str(), entry))
      .ok_or_else(|| AssetError::UnknownAsset {
        asset: key.to_string(),
        manifest: self.location.clone(),
      })
  }

  /// Output file of the entry stored under `key`.
  pub fn output_file<'m>(&'m self, key: &str, entry: &'m ManifestEntry) -> AssetResult<&'m str> {
    entry
      .file
      .as_deref()
      .ok_or_else(|| AssetError::MissingOutputFile {
        asset: key.to_string(),
        manifest: self.location.clone(),
      })
  }

  /// First entry whose key contains `motif`, in document order.
  pub fn find_by_motif(&self, motif: &str) -> Option<(&str, &ManifestEntry)> {
    self.iter().find(|(key, _)| key.contains(motif))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Manifest {
    let content = r#"{
      "src/main.ts": {
        "file": "assets/main.4889e940.js",
        "src": "src/main.ts",
        "isEntry": true,
        "imports": ["_vendor.js"],
        "dynamicImports": ["src/lazy.ts"],
        "css": ["assets/main.b82dbe22.css"]
      },
      "_vendor.js": { "file": "assets/vendor.3b127d5f.js" },
      "src/lazy.ts": { "src": "src/lazy.ts" }
    }"#;
    Manifest::from_json("dist/manifest.json", content).unwrap()
  }

  #[test]
  fn parses_bundler_field_names() {
    let manifest = sample();
    let entry = manifest.lookup("src/main.ts").unwrap();

    assert_eq!(entry.file.as_deref(), Some("assets/main.4889e940.js"));
    assert_eq!(entry.imports, vec!["_vendor.js".to_string()]);
    assert_eq!(entry.css, vec!["assets/main.b82dbe22.css".to_string()]);
  }

  #[test]
  fn optional_fields_default_to_empty() {
    let manifest = sample();
    let vendor = manifest.lookup("_vendor.js").unwrap();
    assert!(vendor.imports.is_empty());
    assert!(vendor.css.is_empty());
    assert_eq!(manifest.lookup("src/lazy.ts").unwrap().file, None);
  }

  #[test]
  fn keeps_document_order() {
    let manifest = sample();
    let keys: Vec<&str> = manifest.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["src/main.ts", "_vendor.js", "src/lazy.ts"]);
  }

  #[test]
  fn motif_search_returns_first_match_in_document_order() {
    let manifest = Manifest::from_json(
      "dist/manifest.json",
      r#"{
        "src/main.ts": { "file": "assets/main.js" },
        "z-polyfills-legacy": { "file": "assets/z.js" },
        "a-polyfills-legacy": { "file": "assets/a.js" }
      }"#,
    )
    .unwrap();

    let (key, entry) = manifest.find_by_motif("polyfills").unwrap();
    assert_eq!(key, "z-polyfills-legacy");
    assert_eq!(entry.file.as_deref(), Some("assets/z.js"));
    assert!(manifest.find_by_motif("missing").is_none());
  }

  #[test]
  fn lookup_of_missing_key_is_unknown_asset() {
    let err = sample().lookup("src/other.ts").unwrap_err();
    assert!(matches!(err, AssetError::UnknownAsset { ref asset, .. } if asset == "src/other.ts"));
  }

  #[test]
  fn entry_without_file_reports_missing_output() {
    let manifest = sample();
    let lazy = manifest.lookup("src/lazy.ts").unwrap();
    let err = manifest.output_file("src/lazy.ts", lazy).unwrap_err();
    assert!(matches!(err, AssetError::MissingOutputFile { .. }));
  }

  #[test]
  fn rejects_malformed_documents() {
    let err = Manifest::from_json("bad.json", "{ not json").unwrap_err();
    assert!(matches!(err, AssetError::ManifestUnreadable { .. }));
  }
}
