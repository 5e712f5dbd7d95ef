//! Startup wiring of a small HTTP-style application.
//!
//! Run with `RUST_LOG=fibre_di=trace` to see registration and resolution events.

use fibre_di::{invoke, resolve, Container};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

struct Config {
  listen_addr: String,
}

trait MetricsProvider: Send + Sync {
  fn record(&self, name: &str);
}

struct InMemoryMetrics {
  counters: Mutex<BTreeMap<String, u64>>,
}

impl MetricsProvider for InMemoryMetrics {
  fn record(&self, name: &str) {
    let mut counters = self.counters.lock().unwrap();
    *counters.entry(name.to_string()).or_default() += 1;
  }
}

trait Router: Send + Sync {
  fn route(&self, path: &str, handler: &'static str);
  fn routes(&self) -> Vec<(String, &'static str)>;
}

struct HttpRouter {
  prefix: String,
  metrics: Arc<dyn MetricsProvider>,
  routes: Mutex<Vec<(String, &'static str)>>,
}

impl Router for HttpRouter {
  fn route(&self, path: &str, handler: &'static str) {
    self.metrics.record("routes_registered");
    self
      .routes
      .lock()
      .unwrap()
      .push((format!("{}{}", self.prefix, path), handler));
  }

  fn routes(&self) -> Vec<(String, &'static str)> {
    self.routes.lock().unwrap().clone()
  }
}

fn new_router(config: Arc<Config>, metrics: Arc<dyn MetricsProvider>) -> Arc<dyn Router> {
  Arc::new(HttpRouter {
    prefix: format!("http://{}", config.listen_addr),
    metrics,
    routes: Mutex::new(Vec::new()),
  })
}

fn register_home_routes(router: Arc<dyn Router>) {
  router.route("/", "home::index");
  router.route("/test", "home::test");
}

fn main() -> Result<(), fibre_di::Error> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();
  container.register(Arc::new(Config {
    listen_addr: "127.0.0.1:8080".to_string(),
  }))?;
  container.register::<dyn MetricsProvider>(Arc::new(InMemoryMetrics {
    counters: Mutex::new(BTreeMap::new()),
  }))?;

  // The router is built once and then registered as a value, so every consumer
  // shares it. A provider binding would build a fresh router per resolution.
  container.register_provider::<dyn Router, _, _>(new_router)?;
  let router = container.must_get::<dyn Router>()?;
  container.register::<dyn Router>(Arc::clone(&router))?;

  invoke!(container, register_home_routes);
  invoke!(container, |router: Arc<dyn Router>, container: Container| {
    let _metrics = resolve!(container, trait MetricsProvider);
    router.route("/protected", "protected::index");
  });

  for (path, handler) in router.routes() {
    println!("{:<40} -> {}", path, handler);
  }
  Ok(())
}
