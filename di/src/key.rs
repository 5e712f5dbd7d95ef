//! Type keys: the identity a binding is stored and looked up under.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An opaque identity for a capability, derived from a Rust type.
///
/// Keys can be derived for concrete types (`TypeKey::of::<Config>()`) as well as
/// trait objects (`TypeKey::of::<dyn Logger>()`). Two keys are equal exactly when they
/// were derived from the same type; the human-readable name is only carried along for
/// diagnostics and does not take part in comparisons.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  /// Derives the key for `T`.
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  /// The fully qualified name of the type this key was derived from.
  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn is<T: ?Sized + Any>(&self) -> bool {
    self.id == TypeId::of::<T>()
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}
