//! Panicking conveniences for startup wiring.
//!
//! Every container operation returns a `Result`. During application startup, though,
//! a broken wiring graph usually means there is nothing sensible left to do but stop,
//! and these macros do exactly that with a message naming the failing capability.

/// Resolves a service from a container, panicking if it cannot be produced.
///
/// # Panics
///
/// Panics if the service is not registered or its provider fails. For a non-panicking
/// version, use [`Container::must_get`](crate::Container::must_get) directly.
///
/// # Examples
///
/// ```
/// use fibre_di::{resolve, Container};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.register(Arc::new(String::from("hello"))).unwrap();
/// container.register::<dyn Greeter>(Arc::new(EnglishGreeter)).unwrap();
///
/// assert_eq!(*resolve!(container, String), "hello");
/// assert_eq!(resolve!(container, trait Greeter).greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  ($container:expr, trait $trait_ident:ident) => {
    $crate::Container::must_get::<dyn $trait_ident>(&$container).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required trait service {}: {}",
        ::std::any::type_name::<dyn $trait_ident>(),
        err
      )
    })
  };

  ($container:expr, $type:ty) => {
    $crate::Container::must_get::<$type>(&$container).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required service {}: {}",
        ::std::any::type_name::<$type>(),
        err
      )
    })
  };
}

/// Resolves a service from a container, yielding `None` if it is not registered.
///
/// # Panics
///
/// Panics if the service is registered but cannot be produced, e.g. because one of its
/// provider's dependencies is missing.
#[macro_export]
macro_rules! maybe_resolve {
  ($container:expr, trait $trait_ident:ident) => {
    $crate::Container::get::<dyn $trait_ident>(&$container).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve trait service {}: {}",
        ::std::any::type_name::<dyn $trait_ident>(),
        err
      )
    })
  };

  ($container:expr, $type:ty) => {
    $crate::Container::get::<$type>(&$container).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve service {}: {}",
        ::std::any::type_name::<$type>(),
        err
      )
    })
  };
}

/// Calls a function with its parameters injected from a container.
///
/// # Panics
///
/// Panics if any parameter cannot be resolved. The function is not called in that case.
#[macro_export]
macro_rules! invoke {
  ($container:expr, $function:expr) => {
    $crate::Container::invoke(&$container, $function)
      .unwrap_or_else(|err| panic!("Failed to invoke function: {}", err))
  };
}
