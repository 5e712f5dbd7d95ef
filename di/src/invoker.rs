//! Invokers: functions pre-bound to arguments resolved from a container.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::value::{AnyValue, Dynamic};

use std::fmt;
use tracing::trace;

/// A function together with the arguments resolved for it at creation time.
///
/// Calling an invoker never touches the container again: bindings registered or
/// replaced after the invoker was created are not observed.
#[derive(Clone)]
pub struct Invoker {
  function: Function,
  args: Vec<AnyValue>,
}

impl Invoker {
  /// Calls the function with the snapshot arguments. Its return value is discarded.
  pub fn call(&self) -> Result<()> {
    self.function.call(&self.args).map(|_| ())
  }

  pub fn function(&self) -> &Function {
    &self.function
  }

  /// The arguments resolved when the invoker was created, in parameter order.
  pub fn arguments(&self) -> &[AnyValue] {
    &self.args
  }
}

impl fmt::Debug for Invoker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Invoker")
      .field("function", &self.function.name())
      .field("args", &self.args.len())
      .finish()
  }
}

impl Container {
  /// Resolves every parameter of `target` now and returns an [`Invoker`] for it.
  ///
  /// `target` must be a function; a plain value is rejected before anything is resolved.
  pub fn create_invoker(&self, target: impl Into<Dynamic>) -> Result<Invoker> {
    let function = match target.into() {
      Dynamic::Function(function) => function,
      Dynamic::Value(value) => {
        return Err(Error::NotAFunction {
          role: "invoke parameter",
          actual: value.key().name(),
        })
      }
    };

    trace!(
      function = function.name(),
      params = function.parameters().len(),
      "creating invoker"
    );
    let args = self.resolve_args(function.parameters())?;
    Ok(Invoker { function, args })
  }

  /// Creates an invoker for `target` and calls it once.
  pub fn invoke_dynamic(&self, target: impl Into<Dynamic>) -> Result<()> {
    self.create_invoker(target)?.call()
  }
}
