use std::collections::VecDeque;

use px_core::config::ConversionParams;
use px_core::frame::RenderedArt;

/// Instantané d'une conversion réussie.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    /// Rendered result.
    pub art: RenderedArt,
    /// Parameters that produced it.
    pub params: ConversionParams,
}

/// Historique borné des conversions, éviction FIFO.
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max: usize,
}

impl History {
    /// Create an empty history keeping at most `max` entries (at least 1).
    #[must_use]
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            entries: VecDeque::with_capacity(max),
            max,
        }
    }

    /// Append a snapshot, evicting the oldest when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        while self.entries.len() >= self.max {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Drop the newest snapshot and return the one before it.
    /// `None` when there is nothing to go back to.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop_back();
        self.entries.back()
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of snapshots kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first conversion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity.
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }
}
