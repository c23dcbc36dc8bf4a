//! Loading, caching and walking the manifest produced by `vite build`.

mod model;
mod source;
mod store;
mod walk;

pub use model::{Manifest, ManifestEntry};
pub use source::{FileManifest, ManifestSource, StaticManifest};
pub use store::ManifestStore;
pub use walk::{collect_css, direct_imports};
