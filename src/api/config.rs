//! Pool configuration.

use std::sync::Arc;

use crate::core::global::Registry;

/// Environment variable read by [`init_from_env`].
pub const DEBUG_ENV_VAR: &str = "OWNPOOL_DEBUG";

/// How a pool obtains backing instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolMode {
    /// Recycle released instances through a lock-free free-list.
    #[default]
    Pooled,
    /// Construct a fresh instance on every borrow and never recycle.
    ///
    /// Useful when investigating borrow sites without pooling effects.
    Stub,
}

impl std::fmt::Display for PoolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolMode::Pooled => write!(f, "pooled"),
            PoolMode::Stub => write!(f, "stub"),
        }
    }
}

/// Configuration for a [`Pool`](crate::Pool).
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Recycling mode (default: pooled)
    pub mode: PoolMode,

    /// Label used in logs and stats (default: the pooled type's name)
    pub name: Option<&'static str>,

    /// Maximum number of idle instances kept for reuse (default: unbounded)
    pub max_idle: Option<usize>,

    /// Registry to report to (default: the global registry)
    pub registry: Option<Arc<Registry>>,
}

impl PoolConfig {
    /// Config for a stub pool.
    pub fn stub() -> Self {
        Self::default().with_mode(PoolMode::Stub)
    }

    /// Builder pattern: set the mode.
    pub fn with_mode(mut self, mode: PoolMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder pattern: set the pool name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Builder pattern: bound the number of idle instances.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = Some(max_idle);
        self
    }

    /// Builder pattern: report to a specific registry.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub(crate) fn registry_or_global(&self) -> Arc<Registry> {
        self.registry
            .clone()
            .unwrap_or_else(|| Arc::clone(Registry::global()))
    }
}

/// Initialize global debug mode from the environment.
///
/// Checks the `OWNPOOL_DEBUG` environment variable:
/// - "1", "true" or "on" -> debug mode on
/// - "0", "false" or "off" -> debug mode off
///
/// Any other value (or an unset variable) leaves the mode untouched.
pub fn init_from_env() {
    if let Ok(val) = std::env::var(DEBUG_ENV_VAR) {
        if let Some(enabled) = parse_switch(&val) {
            Registry::global().set_debug(enabled);
        }
    }
}

fn parse_switch(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.mode, PoolMode::Pooled);
        assert!(config.max_idle.is_none());
        assert!(config.name.is_none());
        assert!(Arc::ptr_eq(&config.registry_or_global(), Registry::global()));
    }

    #[test]
    fn test_builder() {
        let registry = Arc::new(Registry::new());
        let config = PoolConfig::stub()
            .with_name("buffers")
            .with_max_idle(8)
            .with_registry(registry.clone());

        assert_eq!(config.mode, PoolMode::Stub);
        assert_eq!(config.name, Some("buffers"));
        assert_eq!(config.max_idle, Some(8));
        assert!(Arc::ptr_eq(&config.registry_or_global(), &registry));
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("1"), Some(true));
        assert_eq!(parse_switch(" ON "), Some(true));
        assert_eq!(parse_switch("false"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }
}
