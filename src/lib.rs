#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod tags;
pub mod url;

pub use config::{Mode, ViteConfig};
pub use error::{AssetError, AssetResult};
pub use loader::AssetLoader;
pub use manifest::{Manifest, ManifestEntry, ManifestSource, ManifestStore};
pub use tags::Attrs;
pub use url::{HashedStorage, PrefixedStorage, StaticStorage};
