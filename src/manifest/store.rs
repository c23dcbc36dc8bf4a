//! Process-wide manifest cache.

use std::fmt;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::error::AssetResult;
use crate::manifest::{Manifest, ManifestEntry, ManifestSource};

/// Lazily loads a manifest once and serves it read-only afterwards.
///
/// Concurrent first access runs a single read; the other callers block until it
/// finishes. A failed read is not cached, so every later call reports it again.
pub struct ManifestStore {
  source: Box<dyn ManifestSource>,
  cell: OnceCell<Manifest>,
}

impl ManifestStore {
  /// Store reading from `source` on first use.
  pub fn new(source: impl ManifestSource + 'static) -> Self {
    Self {
      source: Box::new(source),
      cell: OnceCell::new(),
    }
  }

  /// The cached manifest, loading it if this is the first access.
  pub fn load(&self) -> AssetResult<&Manifest> {
    self.cell.get_or_try_init(|| self.source.read())
  }

  /// Look up `key` in the (lazily loaded) manifest.
  pub fn lookup(&self, key: &str) -> AssetResult<&ManifestEntry> {
    self.load()?.lookup(key)
  }

  /// Whether the manifest has been loaded yet.
  pub fn is_loaded(&self) -> bool {
    self.cell.get().is_some()
  }

  /// Location of the underlying source.
  pub fn location(&self) -> &Path {
    self.source.location()
  }
}

impl fmt::Debug for ManifestStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManifestStore")
      .field("location", &self.location())
      .field("loaded", &self.is_loaded())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::AssetError;
  use std::path::PathBuf;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::thread;

  struct CountingSource {
    reads: Arc<AtomicUsize>,
    fail: bool,
    location: PathBuf,
  }

  impl ManifestSource for CountingSource {
    fn read(&self) -> AssetResult<Manifest> {
      self.reads.fetch_add(1, Ordering::SeqCst);
      if self.fail {
        return Err(AssetError::unreadable(
          &self.location,
          std::io::Error::new(std::io::ErrorKind::NotFound, "no manifest"),
        ));
      }
      Manifest::from_json(&self.location, r#"{"src/main.ts": {"file": "assets/main.js"}}"#)
    }

    fn location(&self) -> &Path {
      &self.location
    }
  }

  fn counting(fail: bool) -> (ManifestStore, Arc<AtomicUsize>) {
    let reads = Arc::new(AtomicUsize::new(0));
    let store = ManifestStore::new(CountingSource {
      reads: Arc::clone(&reads),
      fail,
      location: PathBuf::from("manifest.json"),
    });
    (store, reads)
  }

  #[test]
  fn loads_lazily_and_once() {
    let (store, reads) = counting(false);
    assert!(!store.is_loaded());
    assert_eq!(reads.load(Ordering::SeqCst), 0);

    store.lookup("src/main.ts").unwrap();
    store.lookup("src/main.ts").unwrap();
    assert!(store.is_loaded());
    assert_eq!(reads.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn concurrent_first_access_reads_once() {
    let (store, reads) = counting(false);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let store = Arc::clone(&store);
        thread::spawn(move || store.load().map(|manifest| manifest.len()).unwrap())
      })
      .collect();

    for handle in handles {
      assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(reads.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn failed_loads_surface_every_time() {
    let (store, reads) = counting(true);
    assert!(matches!(store.load(), Err(AssetError::ManifestUnreadable { .. })));
    assert!(matches!(
      store.lookup("src/main.ts"),
      Err(AssetError::ManifestUnreadable { .. })
    ));
    assert!(!store.is_loaded());
    assert_eq!(reads.load(Ordering::SeqCst), 2);
  }
}
