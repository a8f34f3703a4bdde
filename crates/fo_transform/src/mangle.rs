use std::collections::HashMap;

/// Collision-free name mangling.
///
/// The suffix for an argument tuple maps every character outside
/// `[A-Za-z0-9_]` to `_` and joins the rendered arguments with `__`.
/// That mapping is lossy (`**string` and `[]string` both become
/// `__string`), so a per-package collision map remembers, for every
/// (base name, suffix) pair, which argument tuples were registered and
/// in what order: the first keeps the bare suffix, later ones append
/// `_0`, `_1`, ... Registration follows the registry's deterministic
/// usage order, and usage sites resolve through the same map, so
/// declarations and references always agree.
#[derive(Debug, Default)]
pub struct NameMangler {
  /// (base, raw tuple key) -> position among colliders of its suffix
  assigned: HashMap<(String, String), usize>,
  /// (base, suffix) -> number of tuples registered so far
  counts: HashMap<(String, String), usize>,
}

impl NameMangler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(
    &mut self,
    base: &str,
    tuple: &[String],
  ) {
    let key = (base.to_string(), tuple.join(","));
    if self.assigned.contains_key(&key) {
      return;
    }
    let suffix = suffix_of(tuple);
    let count = self.counts.entry((base.to_string(), suffix)).or_insert(0);
    self.assigned.insert(key, *count);
    *count += 1;
  }

  /// The final identifier for `base` applied to `tuple`.
  pub fn mangled(
    &self,
    base: &str,
    tuple: &[String],
  ) -> String {
    if tuple.is_empty() {
      return base.to_string();
    }
    let suffix = suffix_of(tuple);
    let key = (base.to_string(), tuple.join(","));
    match self.assigned.get(&key) {
      None | Some(0) => format!("{}__{}", base, suffix),
      Some(i) => format!("{}__{}_{}", base, suffix, i - 1),
    }
  }
}

fn suffix_of(tuple: &[String]) -> String {
  tuple.iter().map(|arg| safe_string(arg)).collect::<Vec<_>>().join("__")
}

fn safe_string(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simple_suffixes() {
    let mut mangler = NameMangler::new();
    mangler.register("Box", &["int".to_string()]);
    mangler.register("Box", &["string".to_string()]);
    assert_eq!(mangler.mangled("Box", &["int".to_string()]), "Box__int");
    assert_eq!(mangler.mangled("Box", &["string".to_string()]), "Box__string");
  }

  #[test]
  fn multiple_arguments_join_with_double_underscore() {
    let mut mangler = NameMangler::new();
    mangler.register("Tuple", &["string".to_string(), "int".to_string()]);
    assert_eq!(
      mangler.mangled("Tuple", &["string".to_string(), "int".to_string()]),
      "Tuple__string__int"
    );
  }

  #[test]
  fn unsafe_characters_are_mapped() {
    let mut mangler = NameMangler::new();
    mangler.register("A", &["map[string]int".to_string()]);
    assert_eq!(mangler.mangled("A", &["map[string]int".to_string()]), "A__map_string_int");
  }

  #[test]
  fn collisions_get_stable_indices() {
    let mut mangler = NameMangler::new();
    // registration order decides: bare, then _0, _1, ...
    mangler.register("Box", &["**string".to_string()]);
    mangler.register("Box", &["[]string".to_string()]);
    mangler.register("Box", &["****string".to_string()]);
    mangler.register("Box", &["[][]string".to_string()]);

    assert_eq!(mangler.mangled("Box", &["**string".to_string()]), "Box____string");
    assert_eq!(mangler.mangled("Box", &["[]string".to_string()]), "Box____string_0");
    assert_eq!(mangler.mangled("Box", &["****string".to_string()]), "Box______string");
    assert_eq!(mangler.mangled("Box", &["[][]string".to_string()]), "Box______string_0");
  }

  #[test]
  fn registration_is_idempotent() {
    let mut mangler = NameMangler::new();
    mangler.register("Box", &["**string".to_string()]);
    mangler.register("Box", &["**string".to_string()]);
    mangler.register("Box", &["[]string".to_string()]);
    assert_eq!(mangler.mangled("Box", &["[]string".to_string()]), "Box____string_0");
  }
}
