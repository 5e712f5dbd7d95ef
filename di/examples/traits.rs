use fibre_di::{resolve, Container};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() -> Result<(), fibre_di::Error> {
  let container = Container::new();

  // --- Registration ---

  // The container stores an `Arc<dyn Logger>`; the concrete type never leaks out.
  container.register::<dyn Logger>(Arc::new(ConsoleLogger))?;

  // ReportService's provider declares its dependency as a parameter instead of
  // resolving it by hand.
  container.register_provider::<ReportService, _, _>(|logger: Arc<dyn Logger>| {
    Arc::new(ReportService { logger })
  })?;

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(container, ReportService);

  println!("Using the service...");
  report_service.generate_report();
  Ok(())
}
