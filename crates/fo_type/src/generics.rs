use std::collections::{BTreeMap, HashMap};

use crate::types::{Type, TypeId, TypeMap, TypeStore};

/// One binding of a generic declaration's parameters to concrete types.
#[derive(Debug, Clone)]
pub struct GenericUsage {
  pub type_map: TypeMap,
  pub typ: TypeId,
}

/// Registry record for a generic declaration. Methods are keyed as
/// `ReceiverTypeName.MethodName`; for those, `type_params` lists the
/// receiver's parameters first, then the method's own.
#[derive(Debug, Clone)]
pub struct GenericDecl {
  pub name: String,
  pub typ: TypeId,
  pub type_params: Vec<String>,
  pub usages: BTreeMap<String, GenericUsage>,
  /// Partial instantiations discovered inside this declaration's body.
  /// They inherit this declaration's type parameters; each recorded
  /// concrete usage re-substitutes them so nested usages get registered.
  pub dependents: Vec<TypeId>,
}

/// Per-package table of generic declarations and their recorded concrete
/// usages. Write-append-only; duplicate usages under the same key are
/// silently merged. Usage iteration is lexicographic by usage key, which
/// is what makes emitted output byte-identical across runs.
#[derive(Debug, Clone, Default)]
pub struct GenericRegistry {
  decls: HashMap<String, GenericDecl>,
  origins: HashMap<TypeId, String>,
}

impl GenericRegistry {
  pub fn new() -> Self {
    Self {
      decls: HashMap::new(),
      origins: HashMap::new(),
    }
  }

  /// Idempotently insert a generic declaration record.
  pub fn register_decl(
    &mut self,
    name: &str,
    typ: TypeId,
    type_params: Vec<String>,
  ) {
    self.origins.entry(typ).or_insert_with(|| name.to_string());
    self.decls.entry(name.to_string()).or_insert_with(|| GenericDecl {
      name: name.to_string(),
      typ,
      type_params,
      usages: BTreeMap::new(),
      dependents: Vec::new(),
    });
  }

  /// Registry key of the declaration whose type is `origin`, if any.
  pub fn origin_name(
    &self,
    origin: TypeId,
  ) -> Option<&str> {
    self.origins.get(&origin).map(|s| s.as_str())
  }

  pub fn add_dependent(
    &mut self,
    name: &str,
    typ: TypeId,
  ) {
    if let Some(decl) = self.decls.get_mut(name) {
      if !decl.dependents.contains(&typ) {
        decl.dependents.push(typ);
      }
    }
  }

  /// Record a usage of `name` under the key derived from `type_map`.
  ///
  /// A map that still binds any parameter to another type parameter is a
  /// partial instantiation inherited from an enclosing generic; those are
  /// not usages and are skipped. Returns whether a usage was newly
  /// recorded (duplicates merge and report `false`).
  ///
  /// # Panics
  /// Panics if no declaration was registered for `name`; discovery always
  /// registers declarations before usages.
  pub fn record_usage(
    &mut self,
    store: &TypeStore,
    name: &str,
    typ: TypeId,
    type_map: TypeMap,
  ) -> bool {
    for value in type_map.values() {
      if matches!(store.get(value), Type::TypeParam(_)) {
        return false;
      }
    }

    let decl = self
      .decls
      .get_mut(name)
      .unwrap_or_else(|| panic!("no generic declaration registered for {}", name));
    let key = usage_key(store, &type_map, &decl.type_params);
    decl.usages.insert(key, GenericUsage { type_map, typ }).is_none()
  }

  pub fn lookup(
    &self,
    name: &str,
  ) -> Option<&GenericDecl> {
    self.decls.get(name)
  }

  pub fn contains(
    &self,
    name: &str,
  ) -> bool {
    self.decls.contains_key(name)
  }

  /// Declaration names in sorted order, for deterministic walks.
  pub fn decl_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.decls.keys().map(|s| s.as_str()).collect();
    names.sort_unstable();
    names
  }
}

/// Deterministic key for a usage: the string forms of the bound types in
/// declaration parameter order, comma-joined. Two usages with identical
/// argument tuples collide to one record.
///
/// # Panics
/// Panics if the map does not cover every declared parameter; concrete
/// usage maps always have the full domain.
pub fn usage_key(
  store: &TypeStore,
  type_map: &TypeMap,
  type_params: &[String],
) -> String {
  type_params
    .iter()
    .map(|p| {
      let typ = type_map
        .get(p)
        .unwrap_or_else(|| panic!("usage map missing binding for type parameter {}", p));
      store.type_string(*typ)
    })
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{BasicKind, NamedGenerics};

  fn setup() -> (TypeStore, GenericRegistry, TypeId) {
    let mut store = TypeStore::new();
    let registry = GenericRegistry::new();
    let decl = store.named(
      "Box",
      None,
      NamedGenerics::Generic {
        type_params: vec!["T".into()],
      },
    );
    (store, registry, decl)
  }

  #[test]
  fn duplicate_usages_merge() {
    let (mut store, mut registry, decl) = setup();
    registry.register_decl("Box", decl, vec!["T".into()]);

    let int = store.basic(BasicKind::Int);
    let concrete = store.named("Box", None, NamedGenerics::Concrete {
      origin: decl,
      type_map: TypeMap::from([("T".to_string(), int)]),
    });

    let map = TypeMap::from([("T".to_string(), int)]);
    assert!(registry.record_usage(&store, "Box", concrete, map.clone()));
    assert!(!registry.record_usage(&store, "Box", concrete, map));

    assert_eq!(registry.lookup("Box").unwrap().usages.len(), 1);
  }

  #[test]
  fn partial_maps_are_not_recorded() {
    let (mut store, mut registry, decl) = setup();
    registry.register_decl("Box", decl, vec!["T".into()]);

    let param = store.type_param("U");
    let map = TypeMap::from([("T".to_string(), param)]);
    assert!(!registry.record_usage(&store, "Box", decl, map));
    assert!(registry.lookup("Box").unwrap().usages.is_empty());
  }

  #[test]
  fn usage_iteration_is_sorted_by_key() {
    let (mut store, mut registry, decl) = setup();
    registry.register_decl("Box", decl, vec!["T".into()]);

    let string_ = store.basic(BasicKind::Str);
    let int = store.basic(BasicKind::Int);
    for typ in [string_, int] {
      let map = TypeMap::from([("T".to_string(), typ)]);
      registry.record_usage(&store, "Box", decl, map);
    }

    let keys: Vec<_> = registry.lookup("Box").unwrap().usages.keys().cloned().collect();
    assert_eq!(keys, vec!["int".to_string(), "string".to_string()]);
  }
}
