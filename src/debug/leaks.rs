//! Outstanding-borrow table and the leak report.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

/// One borrow site with objects still out of their pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakEntry {
    /// Rendered borrow trace.
    pub trace: Arc<str>,
    /// Number of unreleased borrows made from this trace.
    pub count: u64,
}

/// Outstanding borrows per rendered trace.
///
/// Entries are removed when their count drops to zero, so the table only
/// ever holds live borrow sites.
#[derive(Debug, Default)]
pub(crate) struct LeakTable {
    outstanding: HashMap<Arc<str>, u64>,
}

impl LeakTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a borrow made from `trace`.
    pub(crate) fn record_borrow(&mut self, trace: &Arc<str>) {
        *self.outstanding.entry(Arc::clone(trace)).or_insert(0) += 1;
    }

    /// Record the release of a borrow made from `trace`.
    pub(crate) fn record_release(&mut self, trace: &str) {
        if let Some(count) = self.outstanding.get_mut(trace) {
            *count -= 1;
            if *count == 0 {
                self.outstanding.remove(trace);
            }
        }
    }

    /// Snapshot of all live entries, most borrows first.
    pub(crate) fn entries(&self) -> Vec<LeakEntry> {
        let mut entries: Vec<LeakEntry> = self
            .outstanding
            .iter()
            .map(|(trace, &count)| LeakEntry {
                trace: Arc::clone(trace),
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.trace.cmp(&b.trace)));
        entries
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

/// Write the leak report for `entries`. Writes nothing when empty.
pub(crate) fn write_report<W: Write + ?Sized>(w: &mut W, entries: &[LeakEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    writeln!(w, "objects borrowed from pools but not released:")?;
    for entry in entries {
        writeln!(w, "{} not released borrowed at:", entry.count)?;
        for line in entry.trace.lines() {
            writeln!(w, "\t{}", line)?;
        }
    }
    Ok(())
}
