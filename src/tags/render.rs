//! Markup fragments for scripts, stylesheets and preload hints.

use crate::tags::Attrs;

/// Attributes carried by every `modulepreload` hint.
pub fn modulepreload_attrs() -> Attrs {
  Attrs::from([
    ("type", "text/javascript"),
    ("crossorigin", "anonymous"),
    ("rel", "modulepreload"),
    ("as", "script"),
  ])
}

/// `<script ... src="..."></script>` with `attrs` rendered before `src`.
pub fn script_tag(src: &str, attrs: &Attrs) -> String {
  let mut tag = String::from("<script");
  push_attrs(&mut tag, attrs);
  tag.push_str(&format!(" src=\"{}\"></script>", escape_attr(src)));
  tag
}

/// `<link rel="stylesheet">` for a CSS file.
pub fn stylesheet_tag(href: &str) -> String {
  format!("<link rel=\"stylesheet\" href=\"{}\" />", escape_attr(href))
}

/// `<link rel="preload" as="style">` for a CSS file.
pub fn stylesheet_preload_tag(href: &str) -> String {
  format!("<link rel=\"preload\" href=\"{}\" as=\"style\" />", escape_attr(href))
}

/// `<link href="..." ...>` preload hint with `attrs` rendered after `href`.
pub fn preload_tag(href: &str, attrs: &Attrs) -> String {
  let mut tag = format!("<link href=\"{}\"", escape_attr(href));
  push_attrs(&mut tag, attrs);
  tag.push_str(" />");
  tag
}

fn push_attrs(tag: &mut String, attrs: &Attrs) {
  for (name, value) in attrs.iter() {
    tag.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
  }
}

fn escape_attr(value: &str) -> String {
  if !value.contains(['&', '"', '<', '>']) {
    return value.to_string();
  }

  let mut escaped = String::with_capacity(value.len() + 8);
  for c in value.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '"' => escaped.push_str("&quot;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      _ => escaped.push(c),
    }
  }
  escaped
}
