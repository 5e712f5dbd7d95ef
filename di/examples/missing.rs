use fibre_di::{resolve, Container};
use std::panic;
use std::sync::Arc;

struct UnregisteredService;

fn main() {
  let container = Container::new();

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    // This line will panic!
    let _service = resolve!(container, UnregisteredService);
  }));

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the non-panicking API ---
  println!("\nNow, attempting to resolve using `get()` and `must_get()`...");

  match container.get::<UnregisteredService>() {
    Ok(Some(_)) => panic!("Should not have found the service!"),
    Ok(None) => println!("Correctly received `None` for the missing service."),
    Err(err) => panic!("Unexpected error: {}", err),
  }

  match container.must_get::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the service!"),
    Err(err) => println!("must_get reported: {}", err),
  }

  // --- A provider whose own dependency is missing ---
  container
    .register_provider::<String, _, _>(|_dep: Arc<UnregisteredService>| Arc::new(String::new()))
    .expect("registration itself is valid");

  if let Err(err) = container.get::<String>() {
    println!("Resolving String failed because of its dependency: {}", err);
  }
}
