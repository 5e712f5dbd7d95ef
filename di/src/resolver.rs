//! Resolution of type keys to values, including recursive provider arguments.

use crate::binding::Binding;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::key::TypeKey;
use crate::value::AnyValue;

use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace};

thread_local! {
  // Keys currently being resolved on this thread, tagged with the owning container,
  // in the order the resolutions were entered.
  static RESOLVING_STACK: RefCell<Vec<(usize, TypeKey)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard that detects circular dependencies.
///
/// Pushes the key onto the thread-local resolution stack on creation and pops it again
/// on drop. Re-entering a key that is already on the stack for the same container is
/// reported as `Error::CircularDependency`.
struct ResolutionGuard {
  container: usize,
  key: TypeKey,
}

impl ResolutionGuard {
  fn enter(container: usize, key: TypeKey) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack
        .iter()
        .position(|entry| *entry == (container, key))
      {
        let path = stack[start..]
          .iter()
          .map(|(_, key)| key.name())
          .chain(std::iter::once(key.name()))
          .collect::<Vec<_>>()
          .join(" -> ");
        return Err(Error::CircularDependency {
          key: key.name(),
          path,
        });
      }
      stack.push((container, key));
      Ok(Self { container, key })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(index) = stack
        .iter()
        .rposition(|entry| *entry == (self.container, self.key))
      {
        stack.remove(index);
      }
    });
  }
}

impl Container {
  /// Produces a value for `key`.
  ///
  /// Returns `Ok(None)` when nothing is registered for `key`. A value binding is returned
  /// as-is; a factory binding has each declared parameter resolved (left to right, all of
  /// them required) and is then called. Factory results are never cached.
  ///
  /// A `Container` key always resolves to this container.
  pub fn resolve(&self, key: &TypeKey) -> Result<Option<AnyValue>> {
    if key.is::<Container>() {
      return Ok(Some(AnyValue::new(Arc::new(self.clone()))));
    }

    let Some(binding) = self.bindings.get(key) else {
      trace!(key = %key, "no binding");
      return Ok(None);
    };

    match &*binding {
      Binding::Value(value) => {
        trace!(key = %key, "resolved value binding");
        Ok(Some(value.clone()))
      }
      Binding::Factory(function) => {
        // Only argument resolution is guarded: declared parameters are resolved
        // unconditionally, so re-entering a key there can never terminate. Lookups made
        // from inside the provider body are left alone.
        let args = {
          let _guard = if self.config.detect_cycles {
            Some(ResolutionGuard::enter(self.id(), *key)?)
          } else {
            None
          };
          self.resolve_args(function.parameters())?
        };
        trace!(key = %key, provider = function.name(), "invoking provider");
        match function.call(&args) {
          Ok(Some(value)) => Ok(Some(value)),
          Ok(None) => Err(Error::UnsupportedReturn {
            provider: function.name(),
            expected: key.name(),
          }),
          Err(err) => {
            debug!(key = %key, error = %err, "provider failed");
            Err(err)
          }
        }
      }
    }
  }

  /// Like [`resolve`](Self::resolve), but a missing binding is an error naming the key.
  pub fn must_resolve(&self, key: &TypeKey) -> Result<AnyValue> {
    match self.resolve(key)? {
      Some(value) => Ok(value),
      None => {
        debug!(key = %key, "required dependency is not registered");
        Err(Error::NotRegistered { key: key.name() })
      }
    }
  }

  /// Resolves every key in `params`, in order, stopping at the first failure.
  pub(crate) fn resolve_args(&self, params: &[TypeKey]) -> Result<Vec<AnyValue>> {
    params.iter().map(|param| self.must_resolve(param)).collect()
  }
}
