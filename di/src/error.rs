use thiserror::Error;

/// A boxed error reported by a fallible provider.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for all container operations.
///
/// Registration errors (`NotAssignable`, `NotAFunction`, `UnsupportedReturn`) mean the
/// wiring itself is malformed. The remaining variants are resolution faults: the graph was
/// accepted but cannot be satisfied at runtime. Both are meant to stop application startup.
#[derive(Debug, Error)]
pub enum Error {
  #[error("implementation type {actual} is not assignable to {expected}")]
  NotAssignable {
    expected: &'static str,
    actual: &'static str,
  },

  #[error("{role} must be a function, got {actual}")]
  NotAFunction {
    role: &'static str,
    actual: &'static str,
  },

  #[error(
    "provider {provider} must return a single value or a (value, error) pair that is assignable to {expected}"
  )]
  UnsupportedReturn {
    provider: &'static str,
    expected: &'static str,
  },

  #[error("no implementation registered for type {key}")]
  NotRegistered { key: &'static str },

  #[error("provider for {key} failed: {source}")]
  ProviderFailed {
    key: &'static str,
    #[source]
    source: BoxError,
  },

  #[error("circular dependency detected while resolving {key}: {path}")]
  CircularDependency { key: &'static str, path: String },
}

impl Error {
  /// Returns `true` for errors raised while registering, as opposed to resolving.
  pub fn is_registration_error(&self) -> bool {
    matches!(
      self,
      Error::NotAssignable { .. } | Error::NotAFunction { .. } | Error::UnsupportedReturn { .. }
    )
  }

  /// The name of the type key that could not be resolved, if this is a resolution fault.
  pub fn missing_key(&self) -> Option<&'static str> {
    match self {
      Error::NotRegistered { key } => Some(*key),
      _ => None,
    }
  }
}

/// A specialized `Result` type for `fibre_di` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
