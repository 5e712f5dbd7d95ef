use serde::Deserialize;

/// Tunables for a [`Container`](crate::Container).
///
/// Deserializable so applications can carry it in their own configuration files:
///
/// ```yaml
/// detect_cycles: true
/// warn_on_overwrite: false
/// ```
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
  /// Fail a resolution that re-enters a key it is already resolving, instead of
  /// recursing until the stack is exhausted.
  pub detect_cycles: bool,
  /// Log replacement of an existing binding at `warn` instead of `debug` level.
  pub warn_on_overwrite: bool,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      detect_cycles: true,
      warn_on_overwrite: false,
    }
  }
}

impl ContainerConfig {
  pub fn detect_cycles(mut self, enabled: bool) -> Self {
    self.detect_cycles = enabled;
    self
  }

  pub fn warn_on_overwrite(mut self, enabled: bool) -> Self {
    self.warn_on_overwrite = enabled;
    self
  }
}
