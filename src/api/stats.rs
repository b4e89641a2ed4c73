//! Pool statistics.

use crate::api::config::PoolMode;

/// Snapshot of a pool's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Pool label.
    pub name: &'static str,

    /// Recycling mode.
    pub mode: PoolMode,

    /// Objects borrowed and not yet released.
    pub in_use: u64,

    /// Idle instances waiting in the free-list (approximate).
    pub idle: usize,

    /// Instances built by the instantiator.
    pub created: u64,

    /// Total borrows, owned ones included.
    pub borrowed: u64,

    /// Releases that put the instance back into the free-list.
    pub recycled: u64,

    /// Releases that dropped the instance (stub mode, full or closed pool).
    pub discarded: u64,
}

impl PoolStats {
    /// Share of borrows served by a recycled instance.
    pub fn reuse_ratio(&self) -> f64 {
        if self.borrowed == 0 {
            return 0.0;
        }
        self.borrowed.saturating_sub(self.created) as f64 / self.borrowed as f64
    }
}

impl std::fmt::Display for PoolStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pool '{}' ({}):", self.name, self.mode)?;
        writeln!(f, "  In use:    {}", self.in_use)?;
        writeln!(f, "  Idle:      {}", self.idle)?;
        writeln!(f, "  Created:   {}", self.created)?;
        writeln!(f, "  Borrowed:  {}", self.borrowed)?;
        writeln!(f, "  Recycled:  {}", self.recycled)?;
        writeln!(f, "  Discarded: {}", self.discarded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(created: u64, borrowed: u64) -> PoolStats {
        PoolStats {
            name: "test",
            mode: PoolMode::Pooled,
            in_use: 0,
            idle: 0,
            created,
            borrowed,
            recycled: 0,
            discarded: 0,
        }
    }

    #[test]
    fn test_reuse_ratio() {
        assert_eq!(stats(0, 0).reuse_ratio(), 0.0);
        assert_eq!(stats(1, 4).reuse_ratio(), 0.75);
    }

    #[test]
    fn test_display() {
        let text = stats(1, 4).to_string();
        assert!(text.starts_with("Pool 'test' (pooled):"));
        assert!(text.contains("Borrowed:  4"));
    }
}
