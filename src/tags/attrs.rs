//! Ordered attribute sets for generated tags.

use indexmap::IndexMap;

/// Insertion-ordered mapping of attribute names to values.
///
/// Rendering walks the attributes in insertion order, so identical inputs always
/// produce identical markup. Overriding an existing key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(IndexMap<String, String>);

impl Attrs {
  /// Empty attribute set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(name, value);
    self
  }

  /// Insert or override `name`.
  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  /// Iterate attributes in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
  }

  /// Defaults overridden by `overrides`.
  ///
  /// Keys from `overrides` replace same-named defaults in place; new keys are
  /// appended after the defaults in the order they were supplied.
  pub fn merged(&self, overrides: &Attrs) -> Attrs {
    let mut merged = self.clone();
    for (name, value) in overrides.iter() {
      merged.insert(name, value);
    }
    merged
  }
}

impl<K, V> FromIterator<(K, V)> for Attrs
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut attrs = Attrs::new();
    for (name, value) in iter {
      attrs.insert(name, value);
    }
    attrs
  }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attrs
where
  K: Into<String>,
  V: Into<String>,
{
  fn from(pairs: [(K, V); N]) -> Self {
    pairs.into_iter().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn override_keeps_default_position() {
    let defaults = Attrs::from([("type", "module"), ("crossorigin", "")]);
    let extra = Attrs::from([("defer", ""), ("type", "text/javascript")]);

    let merged = defaults.merged(&extra);
    let pairs: Vec<_> = merged.iter().collect();
    assert_eq!(pairs, vec![
      ("type", "text/javascript"),
      ("crossorigin", ""),
      ("defer", ""),
    ]);
  }

  #[test]
  fn merging_empty_overrides_is_identity() {
    let defaults = Attrs::new().with("nomodule", "").with("crossorigin", "");
    assert_eq!(defaults.merged(&Attrs::new()), defaults);
  }
}
