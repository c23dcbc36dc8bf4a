//! Pure HTML fragment generation.

mod attrs;
mod render;

pub use attrs::Attrs;
pub use render::{
  modulepreload_attrs, preload_tag, script_tag, stylesheet_preload_tag, stylesheet_tag,
};
