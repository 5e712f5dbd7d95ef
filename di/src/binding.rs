//! Binding storage.

use crate::function::Function;
use crate::key::TypeKey;
use crate::value::AnyValue;

use dashmap::DashMap;
use std::sync::Arc;

/// What a `TypeKey` is bound to.
#[derive(Clone, Debug)]
pub(crate) enum Binding {
  /// A ready-made instance, handed out as-is on every resolution.
  Value(AnyValue),
  /// A constructor, invoked with freshly resolved arguments on every resolution.
  Factory(Function),
}

impl Binding {
  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Binding::Value(_) => "value",
      Binding::Factory(_) => "factory",
    }
  }

  /// The keys this binding needs resolved before it can produce a value.
  pub(crate) fn dependencies(&self) -> &[TypeKey] {
    match self {
      Binding::Value(_) => &[],
      Binding::Factory(function) => function.parameters(),
    }
  }
}

/// Maps each `TypeKey` to exactly one `Binding`.
///
/// Backed by a sharded concurrent map, so steady-state reads from many threads never
/// contend on a single lock and a late registration racing with them cannot corrupt it.
#[derive(Default)]
pub(crate) struct BindingTable {
  bindings: DashMap<TypeKey, Arc<Binding>>,
}

impl BindingTable {
  /// Stores `binding` under `key`, returning the binding it replaced.
  pub(crate) fn insert(&self, key: TypeKey, binding: Binding) -> Option<Arc<Binding>> {
    self.bindings.insert(key, Arc::new(binding))
  }

  /// Clones the binding out of the map so no shard lock is held by the caller.
  pub(crate) fn get(&self, key: &TypeKey) -> Option<Arc<Binding>> {
    self.bindings.get(key).map(|entry| Arc::clone(entry.value()))
  }

  pub(crate) fn contains(&self, key: &TypeKey) -> bool {
    self.bindings.contains_key(key)
  }

  pub(crate) fn len(&self) -> usize {
    self.bindings.len()
  }

  pub(crate) fn keys(&self) -> Vec<TypeKey> {
    self.bindings.iter().map(|entry| *entry.key()).collect()
  }
}
