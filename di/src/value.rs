//! Type-erased values and the parameter types a function may ask to be injected.

use crate::container::Container;
use crate::function::Function;
use crate::key::TypeKey;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased, shareable value produced for some `TypeKey`.
///
/// Internally this owns an `Arc<T>` behind `Arc<dyn Any>`, so `T` may itself be unsized
/// (`dyn Trait`). Cloning is a reference-count bump.
#[derive(Clone)]
pub struct AnyValue {
  key: TypeKey,
  inner: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
  pub fn new<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      key: TypeKey::of::<T>(),
      inner: Arc::new(value),
    }
  }

  /// The key of the type this value was created as.
  pub fn key(&self) -> TypeKey {
    self.key
  }

  /// Recovers the typed handle, or `None` if the value was created as another type.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.inner.downcast_ref::<Arc<T>>().cloned()
  }

  /// Returns `true` if both values share the same allocation.
  pub fn ptr_eq(&self, other: &AnyValue) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl fmt::Debug for AnyValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AnyValue").field("key", &self.key).finish_non_exhaustive()
  }
}

/// A type that can appear as a parameter of a provider or invoked function.
///
/// The container resolves `key()` and hands the resulting value to `extract`.
pub trait Injectable: Sized + Send + Sync + 'static {
  fn key() -> TypeKey;

  fn extract(value: &AnyValue) -> Option<Self>;
}

impl<T: ?Sized + Any + Send + Sync> Injectable for Arc<T> {
  fn key() -> TypeKey {
    TypeKey::of::<T>()
  }

  fn extract(value: &AnyValue) -> Option<Self> {
    value.downcast::<T>()
  }
}

// A parameter of type `Container` receives the resolving container itself.
impl Injectable for Container {
  fn key() -> TypeKey {
    TypeKey::of::<Container>()
  }

  fn extract(value: &AnyValue) -> Option<Self> {
    value
      .downcast::<Container>()
      .map(|container| (*container).clone())
  }
}

/// The uniformly-typed input accepted by the dynamic registration entrypoints:
/// either a plain value or something callable.
#[derive(Clone, Debug)]
pub enum Dynamic {
  Value(AnyValue),
  Function(Function),
}

impl Dynamic {
  /// The name of the underlying type, for diagnostics.
  pub fn type_name(&self) -> &'static str {
    match self {
      Dynamic::Value(value) => value.key().name(),
      Dynamic::Function(function) => function.name(),
    }
  }
}

impl From<AnyValue> for Dynamic {
  fn from(value: AnyValue) -> Self {
    Dynamic::Value(value)
  }
}

impl From<Function> for Dynamic {
  fn from(function: Function) -> Self {
    Dynamic::Function(function)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Shape: Send + Sync {
    fn sides(&self) -> u32;
  }
  struct Square;
  impl Shape for Square {
    fn sides(&self) -> u32 {
      4
    }
  }

  #[test]
  fn test_downcast_recovers_trait_object() {
    let shape: Arc<dyn Shape> = Arc::new(Square);
    let value = AnyValue::new(shape);

    assert_eq!(value.key(), TypeKey::of::<dyn Shape>());
    assert_eq!(value.downcast::<dyn Shape>().unwrap().sides(), 4);
    // The concrete type is not visible through the erased value.
    assert!(value.downcast::<Square>().is_none());
  }

  #[test]
  fn test_clones_share_allocation() {
    let value = AnyValue::new(Arc::new(7_u32));
    let copy = value.clone();
    assert!(value.ptr_eq(&copy));
    assert!(Arc::ptr_eq(
      &value.downcast::<u32>().unwrap(),
      &copy.downcast::<u32>().unwrap()
    ));
  }
}
