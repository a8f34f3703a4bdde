use std::collections::{BTreeMap, HashSet};

use ahash::AHashMap;

/// Index of a type node in the [`TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

/// Map of type-parameter name to bound type. Ordered so that every
/// iteration that can reach output is deterministic.
pub type TypeMap = BTreeMap<String, TypeId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
  Invalid,

  Bool,
  Int,
  Int8,
  Int16,
  Int32,
  Int64,
  Uint,
  Uint8,
  Uint16,
  Uint32,
  Uint64,
  Uintptr,
  Float32,
  Float64,
  Complex64,
  Complex128,
  Str,
  UnsafePointer,

  UntypedBool,
  UntypedInt,
  UntypedRune,
  UntypedFloat,
  UntypedComplex,
  UntypedString,
  UntypedNil,
}

impl BasicKind {
  pub fn name(&self) -> &'static str {
    match self {
      BasicKind::Invalid => "invalid type",
      BasicKind::Bool => "bool",
      BasicKind::Int => "int",
      BasicKind::Int8 => "int8",
      BasicKind::Int16 => "int16",
      BasicKind::Int32 => "int32",
      BasicKind::Int64 => "int64",
      BasicKind::Uint => "uint",
      BasicKind::Uint8 => "uint8",
      BasicKind::Uint16 => "uint16",
      BasicKind::Uint32 => "uint32",
      BasicKind::Uint64 => "uint64",
      BasicKind::Uintptr => "uintptr",
      BasicKind::Float32 => "float32",
      BasicKind::Float64 => "float64",
      BasicKind::Complex64 => "complex64",
      BasicKind::Complex128 => "complex128",
      BasicKind::Str => "string",
      BasicKind::UnsafePointer => "unsafe.Pointer",
      BasicKind::UntypedBool => "untyped bool",
      BasicKind::UntypedInt => "untyped int",
      BasicKind::UntypedRune => "untyped rune",
      BasicKind::UntypedFloat => "untyped float",
      BasicKind::UntypedComplex => "untyped complex",
      BasicKind::UntypedString => "untyped string",
      BasicKind::UntypedNil => "untyped nil",
    }
  }

  pub fn is_untyped(&self) -> bool {
    matches!(
      self,
      BasicKind::UntypedBool
        | BasicKind::UntypedInt
        | BasicKind::UntypedRune
        | BasicKind::UntypedFloat
        | BasicKind::UntypedComplex
        | BasicKind::UntypedString
        | BasicKind::UntypedNil
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
  SendRecv,
  SendOnly,
  RecvOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
  pub name: String,
  pub typ: TypeId,
  pub tag: String,
  pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
  pub name: String,
  pub typ: TypeId,
}

impl Param {
  pub fn new(
    name: impl Into<String>,
    typ: TypeId,
  ) -> Self {
    Self { name: name.into(), typ }
  }
}

/// A method attached to a named type or declared on an interface.
/// `sig` always points at a `Type::Signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
  pub name: String,
  pub sig: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
  pub fields: Vec<Field>,
}

/// Generic shape of a signature.
///
/// `Generic` carries the declaration's own type parameters plus the type
/// parameters introduced by a generic receiver (methods only). `Concrete`
/// and `Partial` both record the originating generic and the parameter map
/// that produced them; `Partial` means at least one map value is itself a
/// type parameter inherited from an enclosing generic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignatureGenerics {
  #[default]
  None,
  Generic {
    type_params: Vec<String>,
    recv_type_params: Vec<String>,
  },
  Concrete {
    origin: TypeId,
    type_map: TypeMap,
  },
  Partial {
    origin: TypeId,
    type_map: TypeMap,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureType {
  pub recv: Option<Param>,
  pub params: Vec<Param>,
  pub results: Vec<Param>,
  pub variadic: bool,
  pub generics: SignatureGenerics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
  pub methods: Vec<Method>,
  pub embeddeds: Vec<TypeId>,
}

/// Generic shape of a named type. Mirrors [`SignatureGenerics`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamedGenerics {
  #[default]
  None,
  Generic {
    type_params: Vec<String>,
  },
  Concrete {
    origin: TypeId,
    type_map: TypeMap,
  },
  Partial {
    origin: TypeId,
    type_map: TypeMap,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
  pub name: String,
  /// Qualifier for imported names (`bytes` in `bytes.Buffer`); `None` for
  /// package-local declarations.
  pub pkg: Option<String>,
  /// Possibly `Invalid` while the declaration is still being set up; never
  /// another named type once set.
  pub underlying: TypeId,
  pub methods: Vec<Method>,
  pub generics: NamedGenerics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
  Basic(BasicKind),
  Array { len: i64, elem: TypeId },
  Slice { elem: TypeId },
  Pointer { base: TypeId },
  Map { key: TypeId, elem: TypeId },
  Chan { dir: ChanDir, elem: TypeId },
  Struct(StructType),
  Signature(SignatureType),
  Interface(InterfaceType),
  Named(NamedType),
  TypeParam(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ArrayKey {
  len: i64,
  elem: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MapKey {
  key: TypeId,
  elem: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ChanKey {
  dir: ChanDir,
  elem: TypeId,
}

/// The type nodes of one package, flat in allocation order. Simple
/// compound shapes are interned; structs, signatures, interfaces and
/// named types always allocate fresh nodes so substitution can patch
/// them in place during declaration setup.
#[derive(Debug, Clone)]
pub struct TypeStore {
  types: Vec<Type>,
  primitives: AHashMap<BasicKind, TypeId>,
  pointers: AHashMap<TypeId, TypeId>,
  slices: AHashMap<TypeId, TypeId>,
  arrays: AHashMap<ArrayKey, TypeId>,
  maps: AHashMap<MapKey, TypeId>,
  chans: AHashMap<ChanKey, TypeId>,
  type_params: AHashMap<String, TypeId>,
  iface_complete: AHashMap<TypeId, Vec<Method>>,
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = Self {
      types: Vec::new(),
      primitives: AHashMap::new(),
      pointers: AHashMap::new(),
      slices: AHashMap::new(),
      arrays: AHashMap::new(),
      maps: AHashMap::new(),
      chans: AHashMap::new(),
      type_params: AHashMap::new(),
      iface_complete: AHashMap::new(),
    };
    store.init_primitives();
    store
  }

  fn alloc(
    &mut self,
    node: Type,
  ) -> TypeId {
    let id = TypeId(self.types.len() as u32);
    self.types.push(node);
    id
  }

  fn node_mut(
    &mut self,
    id: TypeId,
  ) -> &mut Type {
    &mut self.types[id.0 as usize]
  }

  fn init_primitives(&mut self) {
    let primitives = [
      BasicKind::Invalid,
      BasicKind::Bool,
      BasicKind::Int,
      BasicKind::Int8,
      BasicKind::Int16,
      BasicKind::Int32,
      BasicKind::Int64,
      BasicKind::Uint,
      BasicKind::Uint8,
      BasicKind::Uint16,
      BasicKind::Uint32,
      BasicKind::Uint64,
      BasicKind::Uintptr,
      BasicKind::Float32,
      BasicKind::Float64,
      BasicKind::Complex64,
      BasicKind::Complex128,
      BasicKind::Str,
      BasicKind::UnsafePointer,
      BasicKind::UntypedBool,
      BasicKind::UntypedInt,
      BasicKind::UntypedRune,
      BasicKind::UntypedFloat,
      BasicKind::UntypedComplex,
      BasicKind::UntypedString,
      BasicKind::UntypedNil,
    ];

    for kind in primitives {
      let id = self.alloc(Type::Basic(kind));
      self.primitives.insert(kind, id);
    }
  }

  pub fn get(
    &self,
    id: &TypeId,
  ) -> &Type {
    &self.types[id.0 as usize]
  }

  pub fn basic(
    &self,
    kind: BasicKind,
  ) -> TypeId {
    self.primitives[&kind]
  }

  pub fn invalid(&self) -> TypeId {
    self.basic(BasicKind::Invalid)
  }

  pub fn is_invalid(
    &self,
    id: TypeId,
  ) -> bool {
    matches!(self.get(&id), Type::Basic(BasicKind::Invalid))
  }

  pub fn is_type_param(
    &self,
    id: TypeId,
  ) -> bool {
    matches!(self.get(&id), Type::TypeParam(_))
  }

  pub fn pointer(
    &mut self,
    base: TypeId,
  ) -> TypeId {
    if let Some(&id) = self.pointers.get(&base) {
      return id;
    }
    let id = self.alloc(Type::Pointer { base });
    self.pointers.insert(base, id);
    id
  }

  pub fn slice(
    &mut self,
    elem: TypeId,
  ) -> TypeId {
    if let Some(&id) = self.slices.get(&elem) {
      return id;
    }
    let id = self.alloc(Type::Slice { elem });
    self.slices.insert(elem, id);
    id
  }

  pub fn array(
    &mut self,
    len: i64,
    elem: TypeId,
  ) -> TypeId {
    let key = ArrayKey { len, elem };
    if let Some(&id) = self.arrays.get(&key) {
      return id;
    }
    let id = self.alloc(Type::Array { len, elem });
    self.arrays.insert(key, id);
    id
  }

  pub fn map(
    &mut self,
    key: TypeId,
    elem: TypeId,
  ) -> TypeId {
    let k = MapKey { key, elem };
    if let Some(&id) = self.maps.get(&k) {
      return id;
    }
    let id = self.alloc(Type::Map { key, elem });
    self.maps.insert(k, id);
    id
  }

  pub fn chan(
    &mut self,
    dir: ChanDir,
    elem: TypeId,
  ) -> TypeId {
    let key = ChanKey { dir, elem };
    if let Some(&id) = self.chans.get(&key) {
      return id;
    }
    let id = self.alloc(Type::Chan { dir, elem });
    self.chans.insert(key, id);
    id
  }

  pub fn type_param(
    &mut self,
    name: &str,
  ) -> TypeId {
    if let Some(&id) = self.type_params.get(name) {
      return id;
    }
    let id = self.alloc(Type::TypeParam(name.to_string()));
    self.type_params.insert(name.to_string(), id);
    id
  }

  /// # Panics
  /// Panics if two non-blank fields share a name (invariant of the source
  /// language, not a user error at this level).
  pub fn struct_type(
    &mut self,
    fields: Vec<Field>,
  ) -> TypeId {
    let mut seen = HashSet::new();
    for field in &fields {
      if field.name != "_" && !seen.insert(field.name.clone()) {
        panic!("struct has multiple fields named {}", field.name);
      }
    }
    self.alloc(Type::Struct(StructType { fields }))
  }

  /// # Panics
  /// Panics if `variadic` is set without a trailing slice parameter, or if
  /// two type parameters share a name.
  pub fn signature(
    &mut self,
    recv: Option<Param>,
    params: Vec<Param>,
    results: Vec<Param>,
    variadic: bool,
    generics: SignatureGenerics,
  ) -> TypeId {
    if variadic {
      let last = params
        .last()
        .unwrap_or_else(|| panic!("variadic signature must have at least one parameter"));
      if !matches!(self.get(&last.typ), Type::Slice { .. }) {
        panic!("variadic parameter must have a slice type");
      }
    }

    if let SignatureGenerics::Generic {
      type_params,
      recv_type_params,
    } = &generics
    {
      let mut seen = HashSet::new();
      for name in type_params.iter().chain(recv_type_params.iter()) {
        if !seen.insert(name.clone()) {
          panic!("signature has multiple type parameters named {}", name);
        }
      }
    }

    self.alloc(Type::Signature(SignatureType {
      recv,
      params,
      results,
      variadic,
      generics,
    }))
  }

  /// # Panics
  /// Panics if two methods share a name.
  pub fn interface(
    &mut self,
    mut methods: Vec<Method>,
    embeddeds: Vec<TypeId>,
  ) -> TypeId {
    let mut seen = HashSet::new();
    for m in &methods {
      if !seen.insert(m.name.clone()) {
        panic!("interface has multiple methods named {}", m.name);
      }
    }
    methods.sort_by(|a, b| a.name.cmp(&b.name));
    self.alloc(Type::Interface(InterfaceType { methods, embeddeds }))
  }

  /// Allocate a named type shell. The underlying starts out `Invalid` and
  /// is patched with [`TypeStore::set_underlying`] once the declaration's
  /// body has been resolved; this is what lets self-referential types be
  /// built without chasing their own tails.
  pub fn named(
    &mut self,
    name: &str,
    pkg: Option<String>,
    generics: NamedGenerics,
  ) -> TypeId {
    if let NamedGenerics::Generic { type_params } = &generics {
      let mut seen = HashSet::new();
      for p in type_params {
        if !seen.insert(p.clone()) {
          panic!("named type has multiple type parameters named {}", p);
        }
      }
    }

    let invalid = self.invalid();
    self.alloc(Type::Named(NamedType {
      name: name.to_string(),
      pkg,
      underlying: invalid,
      methods: Vec::new(),
      generics,
    }))
  }

  /// Patch a named shell's underlying type, resolving forward chains so a
  /// named type never has another named type as its underlying.
  pub fn set_underlying(
    &mut self,
    id: TypeId,
    underlying: TypeId,
  ) {
    let resolved = self.resolve_underlying(underlying);
    match self.node_mut(id) {
      Type::Named(named) => named.underlying = resolved,
      other => panic!("set_underlying on non-named type {:?}", other),
    }
  }

  /// Follow a chain of named types to the first non-named underlying.
  /// Incomplete links resolve to `Invalid`; cycles are cut the same way
  /// (the checker reports them separately).
  fn resolve_underlying(
    &self,
    mut id: TypeId,
  ) -> TypeId {
    let mut visited = HashSet::new();
    loop {
      match self.get(&id) {
        Type::Named(named) => {
          if !visited.insert(id) {
            return self.invalid();
          }
          id = named.underlying;
        },
        _ => return id,
      }
    }
  }

  pub fn add_method(
    &mut self,
    id: TypeId,
    method: Method,
  ) {
    match self.node_mut(id) {
      Type::Named(named) => {
        if !named.methods.iter().any(|m| m.name == method.name) {
          named.methods.push(method);
        }
      },
      other => panic!("add_method on non-named type {:?}", other),
    }
  }

  pub fn set_methods(
    &mut self,
    id: TypeId,
    methods: Vec<Method>,
  ) {
    match self.node_mut(id) {
      Type::Named(named) => named.methods = methods,
      other => panic!("set_methods on non-named type {:?}", other),
    }
  }

  /// Underlying-type projection: named types project through their
  /// underlying, everything else (including type parameters, which carry
  /// the empty capability set) is its own underlying.
  pub fn underlying(
    &self,
    id: TypeId,
  ) -> TypeId {
    match self.get(&id) {
      Type::Named(named) => named.underlying,
      _ => id,
    }
  }

  pub fn named_type(
    &self,
    id: TypeId,
  ) -> Option<&NamedType> {
    match self.get(&id) {
      Type::Named(named) => Some(named),
      _ => None,
    }
  }

  /// Full method set of an interface: explicit methods plus the
  /// recursively-completed method sets of embedded interfaces, sorted by
  /// name. Memoized per interface node.
  pub fn interface_method_set(
    &mut self,
    id: TypeId,
  ) -> Vec<Method> {
    if let Some(cached) = self.iface_complete.get(&id) {
      return cached.clone();
    }

    let (methods, embeddeds) = match self.get(&id) {
      Type::Interface(iface) => (iface.methods.clone(), iface.embeddeds.clone()),
      other => panic!("interface_method_set on non-interface type {:?}", other),
    };

    let mut all = methods;
    for embedded in embeddeds {
      let under = match self.get(&embedded) {
        Type::Named(named) => named.underlying,
        _ => embedded,
      };
      if matches!(self.get(&under), Type::Interface(_)) {
        for m in self.interface_method_set(under) {
          if !all.iter().any(|existing| existing.name == m.name) {
            all.push(m);
          }
        }
      }
    }
    all.sort_by(|a, b| a.name.cmp(&b.name));

    self.iface_complete.insert(id, all.clone());
    all
  }

  /// Stable string projection used for diagnostics, usage keys and as
  /// mangling input.
  pub fn type_string(
    &self,
    id: TypeId,
  ) -> String {
    match self.get(&id) {
      Type::Basic(kind) => kind.name().to_string(),
      Type::Array { len, elem } => format!("[{}]{}", len, self.type_string(*elem)),
      Type::Slice { elem } => format!("[]{}", self.type_string(*elem)),
      Type::Pointer { base } => format!("*{}", self.type_string(*base)),
      Type::Map { key, elem } => format!("map[{}]{}", self.type_string(*key), self.type_string(*elem)),
      Type::Chan { dir, elem } => match dir {
        ChanDir::SendRecv => format!("chan {}", self.type_string(*elem)),
        ChanDir::SendOnly => format!("chan<- {}", self.type_string(*elem)),
        ChanDir::RecvOnly => format!("<-chan {}", self.type_string(*elem)),
      },
      Type::Struct(st) => {
        let fields = st
          .fields
          .iter()
          .map(|f| {
            let mut s = if f.anonymous {
              self.type_string(f.typ)
            } else {
              format!("{} {}", f.name, self.type_string(f.typ))
            };
            if !f.tag.is_empty() {
              s.push_str(&format!(" {:?}", f.tag));
            }
            s
          })
          .collect::<Vec<_>>()
          .join("; ");
        format!("struct{{{}}}", fields)
      },
      Type::Signature(sig) => format!("func{}", self.signature_string(sig)),
      Type::Interface(iface) => {
        let methods = iface
          .methods
          .iter()
          .map(|m| {
            let sig = match self.get(&m.sig) {
              Type::Signature(s) => self.signature_string(s),
              _ => String::from("()"),
            };
            format!("{}{}", m.name, sig)
          })
          .collect::<Vec<_>>()
          .join("; ");
        format!("interface{{{}}}", methods)
      },
      Type::Named(named) => {
        let base = match &named.pkg {
          Some(pkg) => format!("{}.{}", pkg, named.name),
          None => named.name.clone(),
        };
        match &named.generics {
          NamedGenerics::Concrete { origin, type_map } | NamedGenerics::Partial { origin, type_map } => {
            let args = self
              .generic_param_order(*origin)
              .iter()
              .map(|p| type_map.get(p).map(|t| self.type_string(*t)).unwrap_or_else(|| p.clone()))
              .collect::<Vec<_>>()
              .join(",");
            format!("{}[{}]", base, args)
          },
          _ => base,
        }
      },
      Type::TypeParam(name) => name.clone(),
    }
  }

  fn signature_string(
    &self,
    sig: &SignatureType,
  ) -> String {
    let params = sig
      .params
      .iter()
      .enumerate()
      .map(|(i, p)| {
        if sig.variadic && i == sig.params.len() - 1 {
          match self.get(&p.typ) {
            Type::Slice { elem } => format!("...{}", self.type_string(*elem)),
            _ => self.type_string(p.typ),
          }
        } else {
          self.type_string(p.typ)
        }
      })
      .collect::<Vec<_>>()
      .join(", ");

    match sig.results.len() {
      0 => format!("({})", params),
      1 => format!("({}) {}", params, self.type_string(sig.results[0].typ)),
      _ => {
        let results = sig
          .results
          .iter()
          .map(|r| self.type_string(r.typ))
          .collect::<Vec<_>>()
          .join(", ");
        format!("({}) ({})", params, results)
      },
    }
  }

  /// Type-parameter order of a generic named type or signature.
  pub fn generic_param_order(
    &self,
    id: TypeId,
  ) -> Vec<String> {
    match self.get(&id) {
      Type::Named(named) => match &named.generics {
        NamedGenerics::Generic { type_params } => type_params.clone(),
        _ => Vec::new(),
      },
      Type::Signature(sig) => match &sig.generics {
        SignatureGenerics::Generic {
          type_params,
          recv_type_params,
        } => {
          let mut all = recv_type_params.clone();
          all.extend(type_params.iter().cloned());
          all
        },
        _ => Vec::new(),
      },
      _ => Vec::new(),
    }
  }

  /// Deep structural equality modulo alpha-renaming of type parameters.
  /// Named types compare nominally; assumed-equal pairs cut cycles.
  pub fn identical(
    &self,
    a: TypeId,
    b: TypeId,
  ) -> bool {
    let mut assumed = HashSet::new();
    let mut renaming = Vec::new();
    self.identical_inner(a, b, &mut assumed, &mut renaming)
  }

  fn identical_inner(
    &self,
    a: TypeId,
    b: TypeId,
    assumed: &mut HashSet<(TypeId, TypeId)>,
    renaming: &mut Vec<(String, String)>,
  ) -> bool {
    if a == b {
      return true;
    }
    if !assumed.insert((a, b)) {
      return true;
    }

    match (self.get(&a), self.get(&b)) {
      (Type::Basic(x), Type::Basic(y)) => x == y,
      (Type::Array { len: l1, elem: e1 }, Type::Array { len: l2, elem: e2 }) => {
        l1 == l2 && self.identical_inner(*e1, *e2, assumed, renaming)
      },
      (Type::Slice { elem: e1 }, Type::Slice { elem: e2 }) => self.identical_inner(*e1, *e2, assumed, renaming),
      (Type::Pointer { base: b1 }, Type::Pointer { base: b2 }) => self.identical_inner(*b1, *b2, assumed, renaming),
      (Type::Map { key: k1, elem: e1 }, Type::Map { key: k2, elem: e2 }) => {
        self.identical_inner(*k1, *k2, assumed, renaming) && self.identical_inner(*e1, *e2, assumed, renaming)
      },
      (Type::Chan { dir: d1, elem: e1 }, Type::Chan { dir: d2, elem: e2 }) => {
        d1 == d2 && self.identical_inner(*e1, *e2, assumed, renaming)
      },
      (Type::Struct(s1), Type::Struct(s2)) => {
        s1.fields.len() == s2.fields.len()
          && s1.fields.iter().zip(&s2.fields).all(|(f1, f2)| {
            f1.name == f2.name
              && f1.tag == f2.tag
              && f1.anonymous == f2.anonymous
              && self.identical_inner(f1.typ, f2.typ, assumed, renaming)
          })
      },
      (Type::Signature(s1), Type::Signature(s2)) => {
        s1.variadic == s2.variadic
          && s1.params.len() == s2.params.len()
          && s1.results.len() == s2.results.len()
          && s1
            .params
            .iter()
            .zip(&s2.params)
            .all(|(p1, p2)| self.identical_inner(p1.typ, p2.typ, assumed, renaming))
          && s1
            .results
            .iter()
            .zip(&s2.results)
            .all(|(r1, r2)| self.identical_inner(r1.typ, r2.typ, assumed, renaming))
      },
      (Type::Interface(i1), Type::Interface(i2)) => {
        i1.methods.len() == i2.methods.len()
          && i1
            .methods
            .iter()
            .zip(&i2.methods)
            .all(|(m1, m2)| m1.name == m2.name && self.identical_inner(m1.sig, m2.sig, assumed, renaming))
      },
      (Type::Named(n1), Type::Named(n2)) => {
        n1.name == n2.name && n1.pkg == n2.pkg && self.identical_inner(n1.underlying, n2.underlying, assumed, renaming)
      },
      (Type::TypeParam(p1), Type::TypeParam(p2)) => {
        for (x, y) in renaming.iter() {
          if x == p1 || y == p2 {
            return x == p1 && y == p2;
          }
        }
        renaming.push((p1.clone(), p2.clone()));
        true
      },
      _ => false,
    }
  }
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compound_types_are_interned() {
    let mut store = TypeStore::new();
    let int = store.basic(BasicKind::Int);
    let a = store.slice(int);
    let b = store.slice(int);
    assert_eq!(a, b);

    let p1 = store.pointer(a);
    let p2 = store.pointer(b);
    assert_eq!(p1, p2);
  }

  #[test]
  fn type_strings_are_stable() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::Str);
    let slice = store.slice(s);
    let ptr = store.pointer(s);
    let ptr_ptr = store.pointer(ptr);
    let m = store.map(s, slice);

    assert_eq!(store.type_string(slice), "[]string");
    assert_eq!(store.type_string(ptr_ptr), "**string");
    assert_eq!(store.type_string(m), "map[string][]string");
  }

  #[test]
  fn named_underlying_resolves_through_chains() {
    let mut store = TypeStore::new();
    let int = store.basic(BasicKind::Int);
    let a = store.named("A", None, NamedGenerics::None);
    store.set_underlying(a, int);
    let b = store.named("B", None, NamedGenerics::None);
    store.set_underlying(b, a);

    assert_eq!(store.underlying(b), int);
  }

  #[test]
  #[should_panic(expected = "multiple type parameters")]
  fn duplicate_type_params_are_rejected() {
    let mut store = TypeStore::new();
    store.named(
      "Pair",
      None,
      NamedGenerics::Generic {
        type_params: vec!["T".into(), "T".into()],
      },
    );
  }

  #[test]
  fn identical_is_alpha_blind() {
    let mut store = TypeStore::new();
    let t = store.type_param("T");
    let u = store.type_param("U");
    let st = store.slice(t);
    let su = store.slice(u);
    assert!(store.identical(st, su));
  }

  #[test]
  fn interface_method_set_merges_embedded() {
    let mut store = TypeStore::new();
    let int = store.basic(BasicKind::Int);
    let sig = store.signature(None, vec![], vec![Param::new("", int)], false, SignatureGenerics::None);
    let inner = store.interface(
      vec![Method {
        name: "Len".into(),
        sig,
      }],
      vec![],
    );
    let outer = store.interface(
      vec![Method {
        name: "Cap".into(),
        sig,
      }],
      vec![inner],
    );

    let set = store.interface_method_set(outer);
    let names: Vec<_> = set.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Cap", "Len"]);
  }
}
