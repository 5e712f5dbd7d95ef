//! Type-erased functions.
//!
//! A [`Function`] is the container's view of something callable: the ordered list of
//! parameter keys it wants injected, the shape of what it returns, and a closure that
//! accepts the resolved arguments as [`AnyValue`]s. Functions are built from ordinary
//! closures and `fn` items of up to twelve [`Injectable`] parameters.

use crate::error::{BoxError, Error, Result};
use crate::key::TypeKey;
use crate::value::{AnyValue, Injectable};

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// What a [`Function`] declares it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
  /// Exactly one value for the given key.
  Value(TypeKey),
  /// A value for the given key, or a failure reported by the function.
  Fallible(TypeKey),
  /// Whatever the function returns is not interpreted by the container.
  Opaque,
}

impl Output {
  /// The key of the produced value, if the output is one the container can bind.
  pub fn produces(&self) -> Option<TypeKey> {
    match self {
      Output::Value(key) | Output::Fallible(key) => Some(*key),
      Output::Opaque => None,
    }
  }

  pub fn is_fallible(&self) -> bool {
    matches!(self, Output::Fallible(_))
  }
}

type CallFn = dyn Fn(&[AnyValue]) -> Result<Option<AnyValue>> + Send + Sync;

/// A callable whose parameters are injected by the container.
#[derive(Clone)]
pub struct Function {
  name: &'static str,
  params: Arc<[TypeKey]>,
  output: Output,
  call: Arc<CallFn>,
}

impl Function {
  /// Wraps a constructor for `I`.
  ///
  /// The constructor must return `Arc<I>`, or `Result<Arc<I>, E>` when construction can fail.
  /// Any other return type is rejected at compile time.
  pub fn provider<I, F, Args>(factory: F) -> Self
  where
    I: ?Sized + Any + Send + Sync,
    F: Callable<Args>,
    F::Output: ProviderOutput<I>,
    Args: 'static,
  {
    let produced = TypeKey::of::<I>();
    let output = if <F::Output as ProviderOutput<I>>::FALLIBLE {
      Output::Fallible(produced)
    } else {
      Output::Value(produced)
    };

    Self {
      name: type_name::<F>(),
      params: F::parameters().into(),
      output,
      call: Arc::new(move |args: &[AnyValue]| {
        let instance = factory
          .call_with(args)?
          .into_result()
          .map_err(|source| Error::ProviderFailed {
            key: type_name::<I>(),
            source,
          })?;
        Ok(Some(AnyValue::new(instance)))
      }),
    }
  }

  /// Wraps a function whose return value, if any, is discarded.
  pub fn procedure<F, Args>(function: F) -> Self
  where
    F: Callable<Args>,
    Args: 'static,
  {
    Self {
      name: type_name::<F>(),
      params: F::parameters().into(),
      output: Output::Opaque,
      call: Arc::new(move |args: &[AnyValue]| {
        let _ = function.call_with(args)?;
        Ok(None)
      }),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  /// The declared parameter keys, in declaration order.
  pub fn parameters(&self) -> &[TypeKey] {
    &self.params
  }

  pub fn output(&self) -> Output {
    self.output
  }

  /// Calls the function with already-resolved arguments.
  ///
  /// Returns the produced value for providers and `None` for procedures.
  pub fn call(&self, args: &[AnyValue]) -> Result<Option<AnyValue>> {
    (self.call)(args)
  }
}

impl fmt::Debug for Function {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Function")
      .field("name", &self.name)
      .field("params", &self.params)
      .field("output", &self.output)
      .finish()
  }
}

/// The return shapes a provider for `I` may have.
pub trait ProviderOutput<I: ?Sized> {
  const FALLIBLE: bool;

  fn into_result(self) -> std::result::Result<Arc<I>, BoxError>;
}

impl<I: ?Sized + Any + Send + Sync> ProviderOutput<I> for Arc<I> {
  const FALLIBLE: bool = false;

  fn into_result(self) -> std::result::Result<Arc<I>, BoxError> {
    Ok(self)
  }
}

impl<I, E> ProviderOutput<I> for std::result::Result<Arc<I>, E>
where
  I: ?Sized + Any + Send + Sync,
  E: Into<BoxError>,
{
  const FALLIBLE: bool = true;

  fn into_result(self) -> std::result::Result<Arc<I>, BoxError> {
    self.map_err(Into::into)
  }
}

/// Implemented for closures and `fn` items whose parameters are all [`Injectable`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the per-arity
/// implementations apart and is always inferred.
pub trait Callable<Args>: Send + Sync + 'static {
  type Output;

  fn parameters() -> Vec<TypeKey>;

  fn call_with(&self, args: &[AnyValue]) -> Result<Self::Output>;
}

fn extract_arg<A: Injectable>(value: Option<&AnyValue>) -> Result<A> {
  let key = A::key();
  let value = value.ok_or(Error::NotRegistered { key: key.name() })?;
  A::extract(value).ok_or(Error::NotAssignable {
    expected: key.name(),
    actual: value.key().name(),
  })
}

macro_rules! impl_callable {
  ($($arg:ident => $var:ident),*) => {
    impl<F, R, $($arg,)*> Callable<($($arg,)*)> for F
    where
      F: Fn($($arg),*) -> R + Send + Sync + 'static,
      $($arg: Injectable,)*
    {
      type Output = R;

      fn parameters() -> Vec<TypeKey> {
        vec![$(<$arg as Injectable>::key()),*]
      }

      #[allow(unused_variables, unused_mut)]
      fn call_with(&self, args: &[AnyValue]) -> Result<R> {
        let mut args = args.iter();
        $(
          let $var = extract_arg::<$arg>(args.next())?;
        )*
        Ok(self($($var),*))
      }
    }
  };
}

impl_callable!();
impl_callable!(A1 => a1);
impl_callable!(A1 => a1, A2 => a2);
impl_callable!(A1 => a1, A2 => a2, A3 => a3);
impl_callable!(A1 => a1, A2 => a2, A3 => a3, A4 => a4);
impl_callable!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5);
impl_callable!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6);
impl_callable!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7);
impl_callable!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7, A8 => a8);
impl_callable!(
  A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7, A8 => a8, A9 => a9
);
impl_callable!(
  A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7, A8 => a8, A9 => a9,
  A10 => a10
);
impl_callable!(
  A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7, A8 => a8, A9 => a9,
  A10 => a10, A11 => a11
);
impl_callable!(
  A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7, A8 => a8, A9 => a9,
  A10 => a10, A11 => a11, A12 => a12
);
