//! Backing storage for idle pooled instances.

pub(crate) mod free_list;
