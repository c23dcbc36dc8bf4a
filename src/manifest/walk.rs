//! Traversal of the manifest import graph.

use std::collections::HashSet;

use crate::error::{AssetError, AssetResult};
use crate::manifest::{Manifest, ManifestEntry};

/// Collect every stylesheet required by `key` and its static imports.
///
/// Imports are walked depth-first before the entry's own `css`, so dependency
/// stylesheets come first. Each path is emitted once, at its first encounter.
/// An import chain that re-enters itself fails with [`AssetError::CyclicManifest`].
pub fn collect_css(manifest: &Manifest, key: &str) -> AssetResult<Vec<String>> {
  let mut walk = CssWalk::new(manifest);
  walk.visit(key)?;
  Ok(walk.collected)
}

/// Entries statically imported by `key`, one level deep, in manifest order.
pub fn direct_imports<'m>(
  manifest: &'m Manifest,
  key: &str,
) -> AssetResult<Vec<(&'m str, &'m ManifestEntry)>> {
  let entry = manifest.lookup(key)?;
  entry
    .imports
    .iter()
    .map(|import| manifest.lookup_keyed(import))
    .collect()
}

struct CssWalk<'m> {
  manifest: &'m Manifest,
  active: Vec<&'m str>,
  finished: HashSet<&'m str>,
  seen_css: HashSet<&'m str>,
  collected: Vec<String>,
}

impl<'m> CssWalk<'m> {
  fn new(manifest: &'m Manifest) -> Self {
    Self {
      manifest,
      active: Vec::new(),
      finished: HashSet::new(),
      seen_css: HashSet::new(),
      collected: Vec::new(),
    }
  }

  fn visit(&mut self, key: &str) -> AssetResult<()> {
    let (key, entry) = self.manifest.lookup_keyed(key)?;

    if let Some(start) = self.active.iter().position(|active| *active == key) {
      let mut chain: Vec<String> = self.active[start..].iter().map(|k| k.to_string()).collect();
      chain.push(key.to_string());
      return Err(AssetError::CyclicManifest {
        chain,
        manifest: self.manifest.location().to_path_buf(),
      });
    }

    // A fully walked subtree can only contribute stylesheets already collected.
    if self.finished.contains(key) {
      return Ok(());
    }

    self.active.push(key);
    for import in &entry.imports {
      self.visit(import)?;
    }
    self.active.pop();

    for css in &entry.css {
      if self.seen_css.insert(css.as_str()) {
        self.collected.push(css.clone());
      }
    }

    self.finished.insert(key);
    Ok(())
  }
}
