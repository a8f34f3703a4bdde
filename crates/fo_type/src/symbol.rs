use std::rc::Rc;

use ahash::AHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Interned identifier names.
///
/// Each distinct name owns a single allocation, shared between the
/// id-ordered list and the reverse index via `Rc<str>`.
pub struct SymbolTable {
  names: Vec<Rc<str>>,
  index: AHashMap<Rc<str>, SymbolId>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self {
      names: Vec::new(),
      index: AHashMap::new(),
    }
  }

  pub fn intern(
    &mut self,
    name: &str,
  ) -> SymbolId {
    if let Some(&id) = self.index.get(name) {
      return id;
    }
    let id = SymbolId(self.names.len() as u32);
    let shared: Rc<str> = Rc::from(name);
    self.names.push(Rc::clone(&shared));
    self.index.insert(shared, id);
    id
  }

  pub fn get(
    &self,
    id: &SymbolId,
  ) -> &str {
    &self.names[id.0 as usize]
  }

  pub fn lookup(
    &self,
    name: &str,
  ) -> Option<SymbolId> {
    self.index.get(name).copied()
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let mut table = SymbolTable::new();
    let a = table.intern("Box");
    let b = table.intern("Box");
    let c = table.intern("box");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(table.get(&a), "Box");
    assert_eq!(table.lookup("box"), Some(c));
    assert_eq!(table.lookup("unseen"), None);
  }
}
