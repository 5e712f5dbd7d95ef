//! # Fibre DI
//!
//! A type-keyed dependency resolution container for Rust.
//!
//! Capabilities, usually trait objects, are bound either to a ready-made instance or to a
//! provider function. Providers declare their own dependencies simply as parameters, and
//! the container resolves those recursively whenever the capability is requested. The
//! same mechanism lets arbitrary setup functions be called with their arguments injected.
//!
//! ## Core Concepts
//!
//! - **TypeKey**: The identity a capability is registered and resolved under.
//! - **Binding**: Either a value, returned as-is, or a provider, called on every resolution.
//! - **Resolution**: `get` reports absence as `None`; `must_get`, provider arguments and
//!   invoked functions treat absence as an error naming the missing capability.
//! - **Self-injection**: A parameter of type `Container` receives the container itself.
//!
//! There is no global container. Create one during startup and pass it along.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{resolve, Container};
//! use std::sync::Arc;
//!
//! trait Adder: Send + Sync {
//!     fn add(&self, x: i64, y: i64) -> i64;
//! }
//!
//! struct AdderImpl;
//!
//! impl Adder for AdderImpl {
//!     fn add(&self, x: i64, y: i64) -> i64 {
//!         x + y
//!     }
//! }
//!
//! struct Calculator {
//!     adder: Arc<dyn Adder>,
//! }
//!
//! fn main() -> Result<(), fibre_di::Error> {
//!     let container = Container::new();
//!
//!     container.register::<dyn Adder>(Arc::new(AdderImpl))?;
//!     container.register_provider::<Calculator, _, _>(|adder: Arc<dyn Adder>| {
//!         Arc::new(Calculator { adder })
//!     })?;
//!
//!     let calculator = resolve!(container, Calculator);
//!     assert_eq!(calculator.adder.add(2, 3), 5);
//!
//!     container.invoke(|adder: Arc<dyn Adder>| {
//!         assert_eq!(adder.add(20, 22), 42);
//!     })?;
//!     Ok(())
//! }
//! ```

mod binding;
mod config;
mod container;
mod error;
mod function;
mod invoker;
mod key;
mod macros;
mod resolver;
mod value;

pub use config::ContainerConfig;
pub use container::Container;
pub use error::{BoxError, Error, Result};
pub use function::{Callable, Function, Output, ProviderOutput};
pub use invoker::Invoker;
pub use key::TypeKey;
pub use value::{AnyValue, Dynamic, Injectable};
