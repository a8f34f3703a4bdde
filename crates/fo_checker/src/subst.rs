use std::collections::HashMap;

use fo_type::generics::GenericRegistry;
use fo_type::types::{
  Field, Method, NamedGenerics, Param, SignatureGenerics, SignatureType, Type, TypeId, TypeMap, TypeStore,
};

/// Structural substitution of type parameters.
///
/// Named types are instantiated in two phases: a fresh shell is allocated
/// and memoized under (origin, argument key) before its underlying is
/// substituted, so self- and mutually-referential types resolve their
/// back-references to the shell instead of recursing forever. The same
/// memo is threaded through method materialization.
///
/// Every concrete instantiation of a registered generic records a usage;
/// newly recorded usages re-substitute the declaration's dependents so
/// usages inherited through function bodies surface too.
pub struct Substituter<'a> {
  pub store: &'a mut TypeStore,
  pub registry: &'a mut GenericRegistry,
  memo: HashMap<(TypeId, String), TypeId>,
}

impl<'a> Substituter<'a> {
  pub fn new(
    store: &'a mut TypeStore,
    registry: &'a mut GenericRegistry,
  ) -> Self {
    Self {
      store,
      registry,
      memo: HashMap::new(),
    }
  }

  /// Replace every type-parameter leaf of `root` that `map` binds to a
  /// non-parameter type. Parameters absent from the map, or mapped to
  /// another parameter, are left for a more-outer instantiation.
  pub fn apply(
    &mut self,
    root: TypeId,
    map: &TypeMap,
  ) -> TypeId {
    match self.store.get(&root).clone() {
      Type::TypeParam(name) => match map.get(&name) {
        Some(&bound) if !self.store.is_type_param(bound) => bound,
        _ => root,
      },
      Type::Basic(_) => root,
      Type::Pointer { base } => {
        let base = self.apply(base, map);
        self.store.pointer(base)
      },
      Type::Slice { elem } => {
        let elem = self.apply(elem, map);
        self.store.slice(elem)
      },
      Type::Array { len, elem } => {
        let elem = self.apply(elem, map);
        self.store.array(len, elem)
      },
      Type::Map { key, elem } => {
        let key = self.apply(key, map);
        let elem = self.apply(elem, map);
        self.store.map(key, elem)
      },
      Type::Chan { dir, elem } => {
        let elem = self.apply(elem, map);
        self.store.chan(dir, elem)
      },
      Type::Struct(st) => {
        let fields = st
          .fields
          .iter()
          .map(|f| Field {
            name: f.name.clone(),
            typ: self.apply(f.typ, map),
            tag: f.tag.clone(),
            anonymous: f.anonymous,
          })
          .collect();
        self.store.struct_type(fields)
      },
      Type::Interface(iface) => {
        let methods = iface
          .methods
          .iter()
          .map(|m| Method {
            name: m.name.clone(),
            sig: self.apply(m.sig, map),
          })
          .collect();
        let embeddeds = iface.embeddeds.iter().map(|e| self.apply(*e, map)).collect();
        self.store.interface(methods, embeddeds)
      },
      Type::Signature(sig) => self.apply_signature(&sig, map),
      Type::Named(named) => match &named.generics {
        NamedGenerics::None => root,
        NamedGenerics::Generic { type_params } => {
          // a bare generic (as in an argument-free method receiver) can
          // be instantiated when the map happens to cover its parameters
          let sub_map: TypeMap = type_params
            .iter()
            .filter_map(|p| map.get(p).map(|t| (p.clone(), *t)))
            .collect();
          if sub_map.len() == type_params.len() {
            self.instantiate_named(root, sub_map)
          } else {
            root
          }
        },
        NamedGenerics::Concrete { origin, type_map } | NamedGenerics::Partial { origin, type_map } => {
          let new_map = self.rewrite_map(type_map, map);
          self.instantiate_named(*origin, new_map)
        },
      },
    }
  }

  fn apply_signature(
    &mut self,
    sig: &SignatureType,
    map: &TypeMap,
  ) -> TypeId {
    match &sig.generics {
      SignatureGenerics::Concrete { origin, type_map } | SignatureGenerics::Partial { origin, type_map } => {
        let new_map = self.rewrite_map(type_map, map);
        self.instantiate_signature(*origin, new_map)
      },
      _ => {
        let recv = sig.recv.as_ref().map(|r| Param {
          name: r.name.clone(),
          typ: self.apply(r.typ, map),
        });
        let params = sig
          .params
          .iter()
          .map(|p| Param {
            name: p.name.clone(),
            typ: self.apply(p.typ, map),
          })
          .collect();
        let results = sig
          .results
          .iter()
          .map(|r| Param {
            name: r.name.clone(),
            typ: self.apply(r.typ, map),
          })
          .collect();
        // the copy is detached from any lexical scope; generic shape is
        // preserved so a still-generic method stays applicable
        self
          .store
          .signature(recv, params, results, sig.variadic, sig.generics.clone())
      },
    }
  }

  /// The inner map of an already-instantiated type, rewritten by an outer
  /// one: entries bound to a type parameter that the outer map resolves
  /// are replaced; everything else is kept.
  fn rewrite_map(
    &self,
    inner: &TypeMap,
    outer: &TypeMap,
  ) -> TypeMap {
    inner
      .iter()
      .map(|(name, value)| {
        if let Type::TypeParam(q) = self.store.get(value) {
          if let Some(&bound) = outer.get(q) {
            if !self.store.is_type_param(bound) {
              return (name.clone(), bound);
            }
          }
        }
        (name.clone(), *value)
      })
      .collect()
  }

  /// Instantiate a generic named type under `map`, producing a concrete
  /// (or partial) named shell with substituted underlying and
  /// materialized methods. Records the usage when the map is fully
  /// concrete.
  pub fn instantiate_named(
    &mut self,
    origin: TypeId,
    map: TypeMap,
  ) -> TypeId {
    let params = self.store.generic_param_order(origin);
    let key = self.memo_key(&map, &params);
    if let Some(&existing) = self.memo.get(&(origin, key.clone())) {
      return existing;
    }

    let origin_named = self
      .store
      .named_type(origin)
      .unwrap_or_else(|| panic!("instantiate_named on non-named type"))
      .clone();

    let partial = !self.map_is_concrete(&map, &params);
    let generics = if partial {
      NamedGenerics::Partial {
        origin,
        type_map: map.clone(),
      }
    } else {
      NamedGenerics::Concrete {
        origin,
        type_map: map.clone(),
      }
    };

    let shell = self.store.named(&origin_named.name, origin_named.pkg.clone(), generics);
    self.memo.insert((origin, key), shell);

    let underlying = self.apply(origin_named.underlying, &map);
    self.store.set_underlying(shell, underlying);

    let methods = origin_named
      .methods
      .iter()
      .map(|m| {
        let merged = self.method_map(m.sig, &map);
        Method {
          name: m.name.clone(),
          sig: self.apply(m.sig, &merged),
        }
      })
      .collect();
    self.store.set_methods(shell, methods);

    if !partial {
      self.record(origin, shell, map);
    }
    shell
  }

  /// Instantiate a generic signature under `map`. Used for generic
  /// function and method applications and for dependents resolution.
  pub fn instantiate_signature(
    &mut self,
    origin: TypeId,
    map: TypeMap,
  ) -> TypeId {
    let params = self.store.generic_param_order(origin);
    let sig = match self.store.get(&origin) {
      Type::Signature(sig) => sig.clone(),
      other => panic!("instantiate_signature on non-signature type {:?}", other),
    };

    let recv = sig.recv.as_ref().map(|r| Param {
      name: r.name.clone(),
      typ: self.apply(r.typ, &map),
    });
    let param_vars = sig
      .params
      .iter()
      .map(|p| Param {
        name: p.name.clone(),
        typ: self.apply(p.typ, &map),
      })
      .collect();
    let results = sig
      .results
      .iter()
      .map(|r| Param {
        name: r.name.clone(),
        typ: self.apply(r.typ, &map),
      })
      .collect();

    let partial = !self.map_is_concrete(&map, &params);
    let generics = if partial {
      SignatureGenerics::Partial {
        origin,
        type_map: map.clone(),
      }
    } else {
      SignatureGenerics::Concrete {
        origin,
        type_map: map.clone(),
      }
    };
    let new_sig = self.store.signature(recv, param_vars, results, sig.variadic, generics);

    if !partial {
      self.record(origin, new_sig, map);
    }
    new_sig
  }

  /// Record a concrete usage for a registered origin and, when it is new,
  /// re-substitute the declaration's dependents under the usage map.
  fn record(
    &mut self,
    origin: TypeId,
    typ: TypeId,
    map: TypeMap,
  ) {
    let Some(name) = self.registry.origin_name(origin).map(|s| s.to_string()) else {
      return;
    };
    let newly = self.registry.record_usage(self.store, &name, typ, map.clone());
    if !newly {
      return;
    }

    let dependents = self
      .registry
      .lookup(&name)
      .map(|decl| decl.dependents.clone())
      .unwrap_or_default();
    for dependent in dependents {
      self.apply(dependent, &map);
    }
  }

  /// Merged map for materializing an attached method: start from the
  /// receiver instantiation map and rebind every receiver-bracket
  /// parameter to the corresponding outer argument.
  fn method_map(
    &self,
    method_sig: TypeId,
    outer: &TypeMap,
  ) -> TypeMap {
    let recv_typ = match self.store.get(&method_sig) {
      Type::Signature(sig) => match &sig.recv {
        Some(recv) => recv.typ,
        None => return outer.clone(),
      },
      _ => return outer.clone(),
    };

    let recv_typ = match self.store.get(&recv_typ) {
      Type::Pointer { base } => *base,
      _ => recv_typ,
    };

    let recv_map = match self.store.get(&recv_typ) {
      Type::Named(named) => match &named.generics {
        NamedGenerics::Concrete { type_map, .. } | NamedGenerics::Partial { type_map, .. } => type_map.clone(),
        _ => return outer.clone(),
      },
      _ => return outer.clone(),
    };

    let mut merged = outer.clone();
    for (origin_param, value) in &recv_map {
      if let Type::TypeParam(recv_param) = self.store.get(value) {
        if let Some(&bound) = outer.get(origin_param) {
          merged.insert(recv_param.clone(), bound);
        }
      }
    }
    merged
  }

  fn memo_key(
    &self,
    map: &TypeMap,
    params: &[String],
  ) -> String {
    params
      .iter()
      .map(|p| {
        map
          .get(p)
          .map(|t| self.store.type_string(*t))
          .unwrap_or_else(|| p.clone())
      })
      .collect::<Vec<_>>()
      .join(",")
  }

  fn map_is_concrete(
    &self,
    map: &TypeMap,
    params: &[String],
  ) -> bool {
    params.iter().all(|p| match map.get(p) {
      Some(t) => !self.store.is_type_param(*t),
      None => false,
    })
  }
}
