//! The `Container` handle: registration, the typed API and introspection.

use crate::binding::{Binding, BindingTable};
use crate::config::ContainerConfig;
use crate::error::{Error, Result};
use crate::function::{Callable, Function, Output, ProviderOutput};
use crate::invoker::Invoker;
use crate::key::TypeKey;
use crate::value::{AnyValue, Dynamic};

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A type-keyed dependency resolution container.
///
/// Bindings map an abstract capability (usually a `dyn Trait`) to either a ready-made
/// instance or a provider function whose own parameters are resolved from the container.
///
/// `Container` is a cheap handle: clones share the same bindings. This is also how a
/// provider or invoked function can ask for the container itself, by declaring a
/// `Container` parameter.
#[derive(Clone, Default)]
pub struct Container {
  pub(crate) bindings: Arc<BindingTable>,
  pub(crate) config: ContainerConfig,
}

impl Container {
  /// Creates a new, empty `Container` with the default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self {
      bindings: Arc::default(),
      config,
    }
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  // --- PRIVATE HELPERS ---

  fn insert(&self, key: TypeKey, binding: Binding) {
    let kind = binding.kind();
    let params = binding.dependencies().len();
    if let Some(previous) = self.bindings.insert(key, binding) {
      if self.config.warn_on_overwrite {
        warn!(key = %key, kind, previous = previous.kind(), "replaced existing binding");
      } else {
        debug!(key = %key, kind, previous = previous.kind(), "replaced existing binding");
      }
    } else {
      debug!(key = %key, kind, params, "registered binding");
    }
  }

  /// Identifies this container's shared state across clones.
  pub(crate) fn id(&self) -> usize {
    Arc::as_ptr(&self.bindings) as usize
  }

  // --- DYNAMIC API ---

  /// Binds `key` to a ready-made value.
  ///
  /// Fails if `value` was not created as the type `key` was derived from. The check is
  /// exact: an `AnyValue` built from `Arc<ConsoleLogger>` is not accepted under
  /// `dyn Logger`, since an erased value cannot be unsized after the fact. Coerce before
  /// erasing instead, with `AnyValue::new::<dyn Logger>(Arc::new(ConsoleLogger))`.
  pub fn set_value(&self, key: TypeKey, value: AnyValue) -> Result<()> {
    if value.key() != key {
      return Err(Error::NotAssignable {
        expected: key.name(),
        actual: value.key().name(),
      });
    }
    self.insert(key, Binding::Value(value));
    Ok(())
  }

  /// Binds `key` to a provider function.
  ///
  /// The provider must be callable and must produce a value for `key`, optionally
  /// paired with a failure.
  pub fn set_provider(&self, key: TypeKey, provider: impl Into<Dynamic>) -> Result<()> {
    let function = match provider.into() {
      Dynamic::Function(function) => function,
      Dynamic::Value(value) => {
        return Err(Error::NotAFunction {
          role: "provider",
          actual: value.key().name(),
        })
      }
    };

    match function.output() {
      Output::Opaque => Err(Error::UnsupportedReturn {
        provider: function.name(),
        expected: key.name(),
      }),
      Output::Value(produced) | Output::Fallible(produced) if produced != key => {
        Err(Error::NotAssignable {
          expected: key.name(),
          actual: produced.name(),
        })
      }
      Output::Value(_) | Output::Fallible(_) => {
        self.insert(key, Binding::Factory(function));
        Ok(())
      }
    }
  }

  // --- TYPED API ---

  /// Registers `instance` as the implementation of `I`.
  ///
  /// Trait objects coerce at the call site:
  /// `container.register::<dyn Logger>(Arc::new(ConsoleLogger))`.
  pub fn register<I: ?Sized + Any + Send + Sync>(&self, instance: Arc<I>) -> Result<()> {
    self.set_value(TypeKey::of::<I>(), AnyValue::new(instance))
  }

  /// Registers a provider for `I`. It is called again on every resolution.
  pub fn register_provider<I, F, Args>(&self, provider: F) -> Result<()>
  where
    I: ?Sized + Any + Send + Sync,
    F: Callable<Args>,
    F::Output: ProviderOutput<I>,
    Args: 'static,
  {
    self.set_provider(TypeKey::of::<I>(), Function::provider::<I, F, Args>(provider))
  }

  /// Resolves `I`, returning `Ok(None)` if nothing is registered for it.
  ///
  /// An error means `I` is registered but could not be produced.
  pub fn get<I: ?Sized + Any + Send + Sync>(&self) -> Result<Option<Arc<I>>> {
    match self.resolve(&TypeKey::of::<I>())? {
      Some(value) => downcast::<I>(&value).map(Some),
      None => Ok(None),
    }
  }

  /// Resolves `I`, failing if nothing is registered for it.
  pub fn must_get<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>> {
    let value = self.must_resolve(&TypeKey::of::<I>())?;
    downcast::<I>(&value)
  }

  /// Resolves the parameters of `function` once and returns an invoker replaying the call.
  pub fn invoker<F, Args>(&self, function: F) -> Result<Invoker>
  where
    F: Callable<Args>,
    Args: 'static,
  {
    self.create_invoker(Function::procedure(function))
  }

  /// Calls `function` with its parameters resolved from the container.
  pub fn invoke<F, Args>(&self, function: F) -> Result<()>
  where
    F: Callable<Args>,
    Args: 'static,
  {
    self.invoker(function)?.call()
  }

  // --- INTROSPECTION ---

  pub fn contains(&self, key: &TypeKey) -> bool {
    key.is::<Container>() || self.bindings.contains(key)
  }

  pub fn contains_type<I: ?Sized + Any>(&self) -> bool {
    self.contains(&TypeKey::of::<I>())
  }

  /// The number of registered bindings.
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.len() == 0
  }

  /// The keys of all registered bindings, in no particular order.
  pub fn keys(&self) -> Vec<TypeKey> {
    self.bindings.keys()
  }

  /// The declared dependencies of the binding for `key`.
  ///
  /// Empty for value bindings, `None` when `key` is not registered.
  pub fn dependencies_of(&self, key: &TypeKey) -> Option<Vec<TypeKey>> {
    self
      .bindings
      .get(key)
      .map(|binding| binding.dependencies().to_vec())
  }
}

fn downcast<I: ?Sized + Any + Send + Sync>(value: &AnyValue) -> Result<Arc<I>> {
  value.downcast::<I>().ok_or(Error::NotAssignable {
    expected: std::any::type_name::<I>(),
    actual: value.key().name(),
  })
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("bindings", &self.bindings.len())
      .field("config", &self.config)
      .finish()
  }
}
