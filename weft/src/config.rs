//! Process-wide settings for the threads spawned by [`bridge`](crate::bridge).
//!
//! A configuration can be installed once with [`init`]. Until then, and for
//! any code that never calls it, [`current`] returns [`BridgeConfig::default`].

use crate::error::ConfigError;

use once_cell::sync::OnceCell;
use std::env;
use std::str::FromStr;

/// Environment variable holding the base thread name.
pub const ENV_THREAD_NAME: &str = "WEFT_THREAD_NAME";
/// Environment variable holding the thread stack size in bytes.
pub const ENV_STACK_SIZE: &str = "WEFT_STACK_SIZE";
/// Environment variable holding the capacity of each `split` output.
pub const ENV_SPLIT_CAPACITY: &str = "WEFT_SPLIT_CAPACITY";

const DEFAULT_THREAD_NAME: &str = "weft-task";

static GLOBAL: OnceCell<BridgeConfig> = OnceCell::new();

/// Settings applied to every producer, relay and coordinator thread.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
  /// Base name for spawned threads. Each thread is named `"{thread_name}-{role}"`.
  pub thread_name: String,
  /// Stack size for spawned threads. `None` keeps the platform default.
  pub stack_size: Option<usize>,
  /// Capacity of each of the two queues returned by `bridge::split`.
  /// `0` makes them rendezvous queues.
  pub split_capacity: usize,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      thread_name: DEFAULT_THREAD_NAME.to_string(),
      stack_size: None,
      split_capacity: 0,
    }
  }
}

impl BridgeConfig {
  /// Builds a configuration from `WEFT_*` environment variables, falling back
  /// to the default for any variable that is not set.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut cfg = Self::default();
    if let Ok(name) = env::var(ENV_THREAD_NAME) {
      if !name.is_empty() {
        cfg.thread_name = name;
      }
    }
    if let Some(size) = parse_var::<usize>(ENV_STACK_SIZE)? {
      cfg.stack_size = Some(size);
    }
    if let Some(cap) = parse_var::<usize>(ENV_SPLIT_CAPACITY)? {
      cfg.split_capacity = cap;
    }
    Ok(cfg)
  }

  /// Sets the base thread name.
  pub fn thread_name(mut self, name: impl Into<String>) -> Self {
    self.thread_name = name.into();
    self
  }

  /// Sets the stack size of spawned threads.
  pub fn stack_size(mut self, bytes: usize) -> Self {
    self.stack_size = Some(bytes);
    self
  }

  /// Sets the capacity of `split` outputs.
  pub fn split_capacity(mut self, capacity: usize) -> Self {
    self.split_capacity = capacity;
    self
  }

  pub(crate) fn thread_builder(&self, role: &str) -> std::thread::Builder {
    let builder = std::thread::Builder::new().name(format!("{}-{}", self.thread_name, role));
    match self.stack_size {
      Some(size) => builder.stack_size(size),
      None => builder,
    }
  }
}

fn parse_var<V: FromStr>(key: &'static str) -> Result<Option<V>, ConfigError> {
  match env::var(key) {
    Ok(raw) => raw
      .trim()
      .parse::<V>()
      .map(Some)
      .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    Err(_) => Ok(None),
  }
}

/// Installs the process-wide configuration.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyInitialized`] if a configuration was already
/// installed, including implicitly by an earlier call to [`current`].
pub fn init(cfg: BridgeConfig) -> Result<(), ConfigError> {
  GLOBAL.set(cfg).map_err(|_| ConfigError::AlreadyInitialized)?;
  tracing::debug!(config = ?current(), "bridge configuration installed");
  Ok(())
}

/// Returns the installed configuration, installing the default if none was set.
pub fn current() -> &'static BridgeConfig {
  GLOBAL.get_or_init(BridgeConfig::default)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  fn clear_env() {
    env::remove_var(ENV_THREAD_NAME);
    env::remove_var(ENV_STACK_SIZE);
    env::remove_var(ENV_SPLIT_CAPACITY);
  }

  #[test]
  #[serial]
  fn from_env_defaults_when_unset() {
    clear_env();
    assert_eq!(BridgeConfig::from_env().unwrap(), BridgeConfig::default());
  }

  #[test]
  #[serial]
  fn from_env_reads_all_variables() {
    clear_env();
    env::set_var(ENV_THREAD_NAME, "pipeline");
    env::set_var(ENV_STACK_SIZE, "65536");
    env::set_var(ENV_SPLIT_CAPACITY, " 4 ");
    let cfg = BridgeConfig::from_env().unwrap();
    clear_env();

    assert_eq!(cfg.thread_name, "pipeline");
    assert_eq!(cfg.stack_size, Some(65536));
    assert_eq!(cfg.split_capacity, 4);
  }

  #[test]
  #[serial]
  fn from_env_rejects_garbage() {
    clear_env();
    env::set_var(ENV_STACK_SIZE, "big");
    let err = BridgeConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(
      err,
      ConfigError::InvalidValue {
        key: ENV_STACK_SIZE,
        value: "big".to_string()
      }
    );
  }

  #[test]
  fn builder_methods_compose() {
    let cfg = BridgeConfig::default().thread_name("io").stack_size(1 << 20).split_capacity(2);
    assert_eq!(cfg.thread_name, "io");
    assert_eq!(cfg.stack_size, Some(1 << 20));
    assert_eq!(cfg.split_capacity, 2);
  }

  #[test]
  fn init_only_succeeds_once() {
    // `current()` may already have installed the default from another test.
    let _ = current();
    assert_eq!(init(BridgeConfig::default()), Err(ConfigError::AlreadyInitialized));
  }
}
