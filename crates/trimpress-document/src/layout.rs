// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout state: the ordered units of one manuscript. Position in the vector
// is the output page number; nothing else records order.

use trimpress_core::error::{Result, TrimpressError};
use trimpress_core::types::Unit;
use tracing::debug;

/// Ordered, editable sequence of units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    units: Vec<Unit>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Populate a fresh state. Fails with `AlreadyPopulated` otherwise.
    pub fn insert_initial(&mut self, units: Vec<Unit>) -> Result<()> {
        if !self.units.is_empty() {
            return Err(TrimpressError::AlreadyPopulated(self.units.len()));
        }
        debug!(units = units.len(), "Layout populated");
        self.units = units;
        Ok(())
    }

    /// Drop everything and take `units` instead (a fresh upload).
    pub fn replace_with(&mut self, units: Vec<Unit>) {
        debug!(old = self.units.len(), new = units.len(), "Layout replaced");
        self.units = units;
    }

    /// Swap unit `index` with the one before it. No-op at the first position
    /// or out of range.
    pub fn move_up(&mut self, index: usize) {
        if index == 0 || index >= self.units.len() {
            return;
        }
        self.units.swap(index - 1, index);
    }

    /// Swap unit `index` with the one after it. No-op at the last position or
    /// out of range.
    pub fn move_down(&mut self, index: usize) {
        if index + 1 >= self.units.len() {
            return;
        }
        self.units.swap(index, index + 1);
    }

    /// Remove and return unit `index`; later units shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<Unit> {
        self.check_index(index)?;
        Ok(self.units.remove(index))
    }

    /// Replace the content of text unit `index`.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.check_index(index)?;
        match &mut self.units[index] {
            Unit::Text { content, .. } => {
                *content = text.into();
                Ok(())
            }
            Unit::Image { .. } => Err(TrimpressError::NotEditable(index)),
        }
    }

    /// By-value copy of the current order, for export.
    pub fn snapshot(&self) -> Vec<Unit> {
        self.units.clone()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.units.len() {
            return Err(TrimpressError::IndexOutOfRange {
                index,
                len: self.units.len(),
            });
        }
        Ok(())
    }
}
