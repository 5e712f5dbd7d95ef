use fibre_di::{Container, ContainerConfig, Error, TypeKey};
use pretty_assertions::assert_eq;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

// --- Advanced Test Fixtures ---

struct Config {
  listen_addr: String,
}

trait MetricsProvider: Send + Sync {
  fn namespace(&self) -> &str;
}

struct PrometheusMetrics;
impl MetricsProvider for PrometheusMetrics {
  fn namespace(&self) -> &str {
    "app"
  }
}

trait Router: Send + Sync {
  fn describe(&self) -> String;
}

struct HttpRouter {
  config: Arc<Config>,
  metrics: Arc<dyn MetricsProvider>,
}

impl Router for HttpRouter {
  fn describe(&self) -> String {
    format!("{} ({})", self.config.listen_addr, self.metrics.namespace())
  }
}

fn new_router(config: Arc<Config>, metrics: Arc<dyn MetricsProvider>) -> Arc<dyn Router> {
  Arc::new(HttpRouter { config, metrics })
}

#[derive(Debug)]
struct DatabaseUnavailable;

impl fmt::Display for DatabaseUnavailable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("database unavailable")
  }
}

impl std::error::Error for DatabaseUnavailable {}

struct Database {
  url: String,
}

// --- Advanced Tests ---

#[test]
fn test_multi_level_dependency_chaining() {
  // Arrange
  let container = Container::new();
  container
    .register(Arc::new(Config {
      listen_addr: "0.0.0.0:8080".to_string(),
    }))
    .unwrap();
  container
    .register_provider::<dyn MetricsProvider, _, _>(|_config: Arc<Config>| -> Arc<dyn MetricsProvider> {
      Arc::new(PrometheusMetrics)
    })
    .unwrap();
  container.register_provider::<dyn Router, _, _>(new_router).unwrap();

  // Act
  let router = container.must_get::<dyn Router>().unwrap();

  // Assert
  assert_eq!(router.describe(), "0.0.0.0:8080 (app)");
}

#[test]
fn test_missing_transitive_dependency_names_the_missing_key() {
  // Arrange: the router needs Config and MetricsProvider, but Config is never registered.
  let container = Container::new();
  container
    .register::<dyn MetricsProvider>(Arc::new(PrometheusMetrics))
    .unwrap();
  container.register_provider::<dyn Router, _, _>(new_router).unwrap();

  // Act
  let err = container.must_get::<dyn Router>().err().unwrap();

  // Assert
  let missing = err.missing_key().expect("expected a missing-key error");
  assert_eq!(missing, TypeKey::of::<Config>().name());
  assert!(!missing.contains("Router"));
  assert!(!missing.contains("MetricsProvider"));
}

#[test]
fn test_get_escalates_broken_provider_graph() {
  // `get` only reports absence of the requested key itself as `None`.
  let container = Container::new();
  container.register_provider::<dyn Router, _, _>(new_router).unwrap();

  let result = container.get::<dyn Router>();

  assert!(matches!(result, Err(Error::NotRegistered { .. })));
}

#[test]
fn test_fallible_provider_success() {
  let container = Container::new();
  container
    .register(Arc::new(Config {
      listen_addr: "db.internal".to_string(),
    }))
    .unwrap();
  container
    .register_provider::<Database, _, _>(
      |config: Arc<Config>| -> Result<Arc<Database>, DatabaseUnavailable> {
        Ok(Arc::new(Database {
          url: format!("postgres://{}", config.listen_addr),
        }))
      },
    )
    .unwrap();

  let db = container.must_get::<Database>().unwrap();

  assert_eq!(db.url, "postgres://db.internal");
}

#[test]
fn test_fallible_provider_failure_is_escalated() {
  // Arrange
  let container = Container::new();
  container
    .register_provider::<Database, _, _>(|| -> Result<Arc<Database>, DatabaseUnavailable> {
      Err(DatabaseUnavailable)
    })
    .unwrap();

  // Act
  let from_get = container.get::<Database>();
  let from_must_get = container.must_get::<Database>();

  // Assert
  match from_get {
    Err(Error::ProviderFailed { key, source }) => {
      assert_eq!(key, TypeKey::of::<Database>().name());
      assert_eq!(source.to_string(), "database unavailable");
    }
    other => panic!("expected a provider failure, got {:?}", other.map(|v| v.is_some())),
  }
  assert!(matches!(from_must_get, Err(Error::ProviderFailed { .. })));
}

#[test]
fn test_fallible_provider_with_boxed_error() {
  let container = Container::new();
  container
    .register_provider::<Database, _, _>(|| -> Result<Arc<Database>, String> {
      Err("no route to host".to_string())
    })
    .unwrap();

  let err = container.must_get::<Database>().err().unwrap();

  assert!(err.to_string().ends_with("failed: no route to host"));
}

#[test]
fn test_container_injects_itself() {
  // Arrange: a provider that performs a manual, late lookup through the container.
  let container = Container::new();
  container.register(Arc::new(5_u32)).unwrap();
  container
    .register_provider::<String, _, _>(|container: Container| {
      let n = container.must_get::<u32>().unwrap();
      Arc::new(format!("n = {}", n))
    })
    .unwrap();

  // Act
  let produced = container.must_get::<String>().unwrap();
  let itself = container.must_get::<Container>().unwrap();

  // Assert
  assert_eq!(*produced, "n = 5");
  assert!(itself.contains_type::<u32>());
  assert!(container.contains_type::<Container>());
}

#[test]
fn test_custom_containers_are_isolated() {
  let first = Container::new();
  let second = Container::new();

  first.register(Arc::new("only in first".to_string())).unwrap();

  assert!(first.get::<String>().unwrap().is_some());
  assert!(second.get::<String>().unwrap().is_none());
}

#[test]
fn test_cloned_handle_shares_bindings() {
  let container = Container::new();
  let handle = container.clone();

  handle.register(Arc::new(1_u8)).unwrap();

  assert_eq!(*container.must_get::<u8>().unwrap(), 1);
}

#[test]
fn test_invoker_snapshots_arguments_at_creation() {
  // Arrange
  let container = Container::new();
  container.register(Arc::new("before".to_string())).unwrap();
  let seen = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&seen);
  let invoker = container
    .invoker(move |value: Arc<String>| sink.lock().unwrap().push((*value).clone()))
    .unwrap();

  // Act
  container.register(Arc::new("after".to_string())).unwrap();
  invoker.call().unwrap();
  invoker.call().unwrap();

  // Assert
  assert_eq!(*seen.lock().unwrap(), vec!["before", "before"]);
  assert_eq!(*container.must_get::<String>().unwrap(), "after");
}

#[test]
fn test_invoker_resolves_providers_once() {
  static CALLS: AtomicUsize = AtomicUsize::new(0);
  let container = Container::new();
  container
    .register_provider::<u64, _, _>(|| Arc::new(CALLS.fetch_add(1, Ordering::SeqCst) as u64))
    .unwrap();

  let invoker = container.invoker(|_n: Arc<u64>| ()).unwrap();
  for _ in 0..5 {
    invoker.call().unwrap();
  }

  assert_eq!(CALLS.load(Ordering::SeqCst), 1);
  assert_eq!(invoker.arguments().len(), 1);
}

#[test]
fn test_circular_dependency_is_detected() {
  struct ServiceA {
    _b: Arc<ServiceB>,
  }
  struct ServiceB {
    _a: Arc<ServiceA>,
  }

  // Arrange: A -> B -> A
  let container = Container::new();
  container
    .register_provider::<ServiceA, _, _>(|b: Arc<ServiceB>| Arc::new(ServiceA { _b: b }))
    .unwrap();
  container
    .register_provider::<ServiceB, _, _>(|a: Arc<ServiceA>| Arc::new(ServiceB { _a: a }))
    .unwrap();

  // Act
  let err = container.must_get::<ServiceA>().err().unwrap();

  // Assert
  match err {
    Error::CircularDependency { key, path } => {
      assert_eq!(key, TypeKey::of::<ServiceA>().name());
      assert_eq!(path.split(" -> ").count(), 3);
    }
    other => panic!("expected a circular dependency error, got {}", other),
  }

  // The failed resolution must not leave stale state behind: resolving again
  // reports the same cycle, and unrelated keys still resolve.
  assert!(matches!(
    container.must_get::<ServiceB>(),
    Err(Error::CircularDependency { .. })
  ));
  container.register(Arc::new(1_u8)).unwrap();
  assert_eq!(*container.must_get::<u8>().unwrap(), 1);
}

#[test]
fn test_provider_may_look_itself_up_from_its_body() {
  // A provider resolving its own key through the container, under a condition that
  // stops the recursion, is not a cycle and must complete.
  static DEPTH: AtomicUsize = AtomicUsize::new(0);

  let container = Container::new();
  assert!(container.config().detect_cycles);
  container
    .register_provider::<u64, _, _>(|container: Container| {
      let depth = DEPTH.fetch_add(1, Ordering::SeqCst);
      if depth < 2 {
        let inner = container.must_get::<u64>().unwrap();
        Arc::new(*inner + 1)
      } else {
        Arc::new(7)
      }
    })
    .unwrap();

  let value = container.must_get::<u64>().unwrap();

  assert_eq!(*value, 9);
  assert_eq!(DEPTH.load(Ordering::SeqCst), 3);
}

#[test]
fn test_diamond_dependency_is_not_a_cycle() {
  // Two providers depending on the same key is fine.
  let container = Container::new();
  container.register(Arc::new(Config { listen_addr: "x".into() })).unwrap();
  container
    .register_provider::<u16, _, _>(|config: Arc<Config>| Arc::new(config.listen_addr.len() as u16))
    .unwrap();
  container
    .register_provider::<u32, _, _>(|config: Arc<Config>, n: Arc<u16>| {
      Arc::new(config.listen_addr.len() as u32 + *n as u32)
    })
    .unwrap();

  assert_eq!(*container.must_get::<u32>().unwrap(), 2);
}

#[test]
fn test_cycle_detection_can_be_disabled() {
  let container = Container::with_config(ContainerConfig::default().detect_cycles(false));
  assert!(!container.config().detect_cycles);

  // Success paths behave the same with detection off.
  container.register(Arc::new(3_u8)).unwrap();
  container
    .register_provider::<u16, _, _>(|n: Arc<u8>| Arc::new(*n as u16 * 2))
    .unwrap();
  assert_eq!(*container.must_get::<u16>().unwrap(), 6);
}

#[test]
fn test_provider_may_register_reentrantly() {
  let container = Container::new();
  container
    .register_provider::<u32, _, _>(|container: Container| {
      container.register(Arc::new(99_u64)).unwrap();
      Arc::new(1_u32)
    })
    .unwrap();

  assert_eq!(*container.must_get::<u32>().unwrap(), 1);
  assert_eq!(*container.must_get::<u64>().unwrap(), 99);
}

#[test]
fn test_concurrent_resolution() {
  // Arrange
  static FACTORY_EXECUTION_COUNT: AtomicUsize = AtomicUsize::new(0);
  struct ConcurrentService;

  let container = Container::new();
  container.register(Arc::new(Config { listen_addr: "shared".into() })).unwrap();
  container
    .register_provider::<ConcurrentService, _, _>(|_config: Arc<Config>| {
      FACTORY_EXECUTION_COUNT.fetch_add(1, Ordering::SeqCst);
      Arc::new(ConcurrentService)
    })
    .unwrap();

  // Act
  thread::scope(|s| {
    for _ in 0..20 {
      s.spawn(|| {
        for _ in 0..10 {
          let _service = container.must_get::<ConcurrentService>().unwrap();
          let config = container.must_get::<Config>().unwrap();
          assert_eq!(config.listen_addr, "shared");
        }
      });
    }
  });

  // Assert: providers are not memoized, so every resolution ran the factory.
  assert_eq!(FACTORY_EXECUTION_COUNT.load(Ordering::SeqCst), 200);
}

#[test]
fn test_registration_racing_resolution() {
  // Arrange
  const WRITERS: u32 = 4;
  const READERS: usize = 8;
  const ITERATIONS: u32 = 2000;

  let container = Container::new();
  container.register(Arc::new(0_u32)).unwrap();

  // Act
  thread::scope(|s| {
    for writer in 0..WRITERS {
      let container = &container;
      s.spawn(move || {
        for i in 0..ITERATIONS {
          container.register(Arc::new(writer * ITERATIONS + i)).unwrap();
        }
      });
    }
    for _ in 0..READERS {
      s.spawn(|| {
        for _ in 0..ITERATIONS {
          // Assert: every read sees some value that was written.
          let value = container.must_get::<u32>().unwrap();
          assert!(*value < WRITERS * ITERATIONS);
        }
      });
    }
  });

  // The binding table still holds exactly one binding for the key.
  assert_eq!(container.len(), 1);
  assert!(*container.must_get::<u32>().unwrap() < WRITERS * ITERATIONS);
}

#[test]
fn test_introspection() {
  let container = Container::new();
  assert!(container.is_empty());

  container
    .register::<dyn MetricsProvider>(Arc::new(PrometheusMetrics))
    .unwrap();
  container.register_provider::<dyn Router, _, _>(new_router).unwrap();

  let mut keys = container.keys();
  keys.sort_by_key(|key| key.name());
  assert_eq!(container.len(), 2);
  assert!(keys.contains(&TypeKey::of::<dyn Router>()));
  assert_eq!(
    container.dependencies_of(&TypeKey::of::<dyn Router>()),
    Some(vec![
      TypeKey::of::<Config>(),
      TypeKey::of::<dyn MetricsProvider>()
    ])
  );
  assert_eq!(
    container.dependencies_of(&TypeKey::of::<dyn MetricsProvider>()),
    Some(vec![])
  );
  assert_eq!(container.dependencies_of(&TypeKey::of::<Config>()), None);
}
