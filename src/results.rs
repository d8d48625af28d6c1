//! Best-known rectangle per (rows, symbols) target.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{Grid, rectangle_imbalance};

/// A search target: a Latin rectangle with `rows` rows over `symbols` symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target {
    pub rows: usize,
    pub symbols: usize,
}

impl Target {
    /// Target matching the shape of `grid`.
    pub fn of(grid: &Grid) -> Self {
        Self {
            rows: grid.rows(),
            symbols: grid.symbols(),
        }
    }
}

/// A rectangle and its rectangle imbalance.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetResult {
    pub grid: Grid,
    pub score: f64,
}

/// Results keyed by target.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    entries: BTreeMap<Target, TargetResult>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score previously computed rectangles, keyed by their own shape.
    ///
    /// When two grids share a shape the lower score wins.
    pub fn from_seed_grids<I>(grids: I) -> Result<Self>
    where
        I: IntoIterator<Item = Grid>,
    {
        let mut table = Self::new();
        for grid in grids {
            let score = rectangle_imbalance(&grid)?;
            table.record(Target::of(&grid), grid, score);
        }
        Ok(table)
    }

    pub fn get(&self, target: Target) -> Option<&TargetResult> {
        self.entries.get(&target)
    }

    pub fn score(&self, target: Target) -> Option<f64> {
        self.get(target).map(|r| r.score)
    }

    /// True when a perfectly balanced rectangle is already known.
    pub fn is_solved(&self, target: Target) -> bool {
        self.score(target) == Some(0.0)
    }

    /// Store `grid` unless the table already holds a strictly better score.
    /// Returns whether the entry was replaced.
    pub fn record(&mut self, target: Target, grid: Grid, score: f64) -> bool {
        match self.entries.get(&target) {
            Some(existing) if existing.score < score => false,
            _ => {
                self.entries.insert(target, TargetResult { grid, score });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, &TargetResult)> {
        self.entries.iter()
    }

    /// Dense summary `table[rows][symbols]` of side `size`. Unknown or
    /// out-of-range targets are left at 0.0.
    pub fn score_table(&self, size: usize) -> Vec<Vec<f64>> {
        let mut table = vec![vec![0.0; size]; size];
        for (target, result) in &self.entries {
            if target.rows < size && target.symbols < size {
                table[target.rows][target.symbols] = result.score;
            }
        }
        table
    }
}
