//! Per-window review session: which image is shown and how strongly
//! its mask is blended. Nothing here touches the ledger.

use crate::overlay::BlendWeight;

/// Position in the catalog, always within [0, len - 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    index: usize,
    len: usize,
}

impl NavigationCursor {
    /// Start at the first image of a catalog of `len` images
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Step back one image; stays put on the first one
    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Step forward one image; stays put on the last one
    pub fn next(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    /// Jump straight to `index`, clamped to the catalog
    pub fn select(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }
}

/// Caller-owned state of one interactive review
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub cursor: NavigationCursor,
    pub weight: BlendWeight,
}

impl ReviewSession {
    pub fn new(catalog_len: usize, weight: BlendWeight) -> Self {
        Self {
            cursor: NavigationCursor::new(catalog_len),
            weight,
        }
    }
}
