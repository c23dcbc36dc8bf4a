//! Entry point turning Vite asset paths into page markup.

use std::sync::Arc;

use crate::config::{Mode, ViteConfig};
use crate::error::{AssetError, AssetResult};
use crate::manifest::{
  FileManifest, Manifest, ManifestSource, ManifestStore, collect_css, direct_imports,
};
use crate::tags::{
  Attrs, modulepreload_attrs, preload_tag, script_tag, stylesheet_preload_tag, stylesheet_tag,
};
use crate::url::{StaticStorage, UrlResolver};

/// Resolves entry points into tags for the configured [`Mode`].
///
/// In development every operation answers from the dev server URL alone and the
/// manifest is never touched. In production the manifest is loaded on first use
/// and shared by all callers for the rest of the process.
#[derive(Debug)]
pub struct AssetLoader {
  mode: Mode,
  urls: UrlResolver,
  manifest: ManifestStore,
  ws_client_url: String,
  react_refresh_url: String,
  legacy_polyfills_motif: String,
}

impl AssetLoader {
  /// Loader reading the manifest from the path derived from `config`.
  pub fn from_config(config: &ViteConfig) -> Self {
    Self::with_source(config, FileManifest::new(config.manifest_path()))
  }

  /// Loader reading the manifest from a custom source.
  pub fn with_source(config: &ViteConfig, source: impl ManifestSource + 'static) -> Self {
    Self {
      mode: config.mode(),
      urls: UrlResolver::from_config(config),
      manifest: ManifestStore::new(source),
      ws_client_url: config.ws_client_url.clone(),
      react_refresh_url: config.react_refresh_url.clone(),
      legacy_polyfills_motif: config.legacy_polyfills_motif.clone(),
    }
  }

  /// Route production URLs through a static file storage.
  pub fn with_storage(mut self, storage: Arc<dyn StaticStorage>) -> Self {
    self.urls = self.urls.with_storage(storage);
    self
  }

  /// Active mode.
  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// The manifest cache backing production lookups.
  pub fn manifest(&self) -> &ManifestStore {
    &self.manifest
  }

  /// Stylesheet links, the module script, then `modulepreload` hints for direct imports.
  pub fn resolve_asset(&self, path: &str, extra_attrs: &Attrs) -> AssetResult<String> {
    if self.mode == Mode::Development {
      let attrs = Attrs::from([("type", "module")]).merged(extra_attrs);
      return Ok(script_tag(&self.urls.dev_server_url(path), &attrs));
    }

    let manifest = self.manifest.load()?;
    let entry = manifest.lookup(path)?;
    let file = manifest.output_file(path, entry)?;

    let mut tags: Vec<String> = collect_css(manifest, path)?
      .iter()
      .map(|css| stylesheet_tag(&self.urls.production_url(css)))
      .collect();

    let attrs = module_script_attrs().merged(extra_attrs);
    tags.push(script_tag(&self.urls.production_url(file), &attrs));
    tags.extend(self.import_preloads(manifest, path)?);

    tracing::debug!(asset = path, tags = tags.len(), "resolved Vite asset");
    Ok(tags.join("\n"))
  }

  /// URL of the entry's own output, without any dependencies.
  pub fn resolve_asset_url(&self, path: &str) -> AssetResult<String> {
    if self.mode == Mode::Development {
      return Ok(self.urls.dev_server_url(path));
    }

    let manifest = self.manifest.load()?;
    let entry = manifest.lookup(path)?;
    Ok(self.urls.production_url(manifest.output_file(path, entry)?))
  }

  /// `modulepreload` for the entry, `preload` for its stylesheets, `modulepreload` for
  /// its direct imports. Empty in development.
  pub fn preload_asset(&self, path: &str) -> AssetResult<String> {
    if self.mode == Mode::Development {
      return Ok(String::new());
    }

    let manifest = self.manifest.load()?;
    let entry = manifest.lookup(path)?;
    let file = manifest.output_file(path, entry)?;

    let mut tags = vec![preload_tag(&self.urls.production_url(file), &modulepreload_attrs())];
    tags.extend(
      collect_css(manifest, path)?
        .iter()
        .map(|css| stylesheet_preload_tag(&self.urls.production_url(css))),
    );
    tags.extend(self.import_preloads(manifest, path)?);

    tracing::debug!(asset = path, tags = tags.len(), "preloaded Vite asset");
    Ok(tags.join("\n"))
  }

  /// `nomodule` script for a legacy chunk. Empty in development.
  pub fn resolve_legacy_asset(&self, path: &str, extra_attrs: &Attrs) -> AssetResult<String> {
    if self.mode == Mode::Development {
      return Ok(String::new());
    }

    let manifest = self.manifest.load()?;
    let entry = manifest.lookup(path)?;
    let file = manifest.output_file(path, entry)?;
    let attrs = legacy_script_attrs().merged(extra_attrs);
    Ok(script_tag(&self.urls.production_url(file), &attrs))
  }

  /// `nomodule` script for the legacy polyfills chunk. Empty in development.
  pub fn resolve_legacy_polyfills(&self, extra_attrs: &Attrs) -> AssetResult<String> {
    if self.mode == Mode::Development {
      return Ok(String::new());
    }

    let manifest = self.manifest.load()?;
    let (key, entry) = manifest
      .find_by_motif(&self.legacy_polyfills_motif)
      .ok_or_else(|| AssetError::PolyfillsNotFound {
        motif: self.legacy_polyfills_motif.clone(),
        manifest: manifest.location().to_path_buf(),
      })?;
    let file = manifest.output_file(key, entry)?;
    let attrs = legacy_script_attrs().merged(extra_attrs);
    Ok(script_tag(&self.urls.production_url(file), &attrs))
  }

  /// Module script for the dev server's hot-reload client. Empty in production.
  pub fn resolve_dev_client(&self, extra_attrs: &Attrs) -> String {
    if self.mode == Mode::Production {
      return String::new();
    }

    let attrs = Attrs::from([("type", "module")]).merged(extra_attrs);
    script_tag(&self.urls.dev_server_url(&self.ws_client_url), &attrs)
  }

  /// Inline preamble installing the React fast-refresh hooks. Empty in production.
  pub fn resolve_react_refresh_preamble(&self) -> String {
    if self.mode == Mode::Production {
      return String::new();
    }

    format!(
      r#"<script type="module">
  import RefreshRuntime from '{url}'
  RefreshRuntime.injectIntoGlobalHook(window)
  window.$RefreshReg$ = () => {{}}
  window.$RefreshSig$ = () => (type) => type
  window.__vite_plugin_react_preamble_installed__ = true
</script>"#,
      url = self.urls.dev_server_url(&self.react_refresh_url)
    )
  }

  /// Output stylesheets required by `path`, in emission order. Empty in development.
  pub fn stylesheets(&self, path: &str) -> AssetResult<Vec<String>> {
    if self.mode == Mode::Development {
      return Ok(Vec::new());
    }

    collect_css(self.manifest.load()?, path)
  }

  fn import_preloads(&self, manifest: &Manifest, path: &str) -> AssetResult<Vec<String>> {
    let attrs = modulepreload_attrs();
    direct_imports(manifest, path)?
      .into_iter()
      .map(|(key, import)| -> AssetResult<String> {
        let file = manifest.output_file(key, import)?;
        Ok(preload_tag(&self.urls.production_url(file), &attrs))
      })
      .collect()
  }
}

fn module_script_attrs() -> Attrs {
  Attrs::from([("type", "module"), ("crossorigin", "")])
}

fn legacy_script_attrs() -> Attrs {
  Attrs::from([("nomodule", ""), ("crossorigin", "")])
}
