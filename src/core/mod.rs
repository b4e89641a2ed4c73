//! Pool internals: shared state, backing instances and the registry.

pub(crate) mod global;
pub(crate) mod shared;
pub(crate) mod slot;
