use std::collections::HashMap;

use fo_type::symbol::SymbolId;

use crate::ObjectId;

/// A lexical scope: a name table with a parent chain index into the
/// checker's scope stack.
#[derive(Debug, Default)]
pub struct Scope {
  names: HashMap<SymbolId, ObjectId>,
}

impl Scope {
  pub fn new() -> Self {
    Self { names: HashMap::new() }
  }

  pub fn insert(
    &mut self,
    name: SymbolId,
    object: ObjectId,
  ) -> Option<ObjectId> {
    self.names.insert(name, object)
  }

  pub fn get(
    &self,
    name: &SymbolId,
  ) -> Option<ObjectId> {
    self.names.get(name).copied()
  }

  pub fn contains(
    &self,
    name: &SymbolId,
  ) -> bool {
    self.names.contains_key(name)
  }
}
