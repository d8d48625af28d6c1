use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{LatinError, Result};

/// Largest order representable with `u8` symbols.
pub const MAX_ORDER: usize = 255;

/// A Latin rectangle with `rows` rows over the symbols `{1..=symbols}`.
///
/// Every row is a permutation of `{1..=symbols}`. When `rows == symbols`
/// and every column is a permutation too, the grid is a Latin square.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    symbols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates the cyclic Latin square of order `n`: `L[r][c] = ((r + c) mod n) + 1`.
    ///
    /// # Panics
    /// Panics if `n < 2` or `n > 255`.
    pub fn new_cyclic(n: usize) -> Self {
        assert!((2..=MAX_ORDER).contains(&n), "n must be in range 2..=255");
        let cells = (0..n)
            .flat_map(|r| (0..n).map(move |c| ((r + c) % n + 1) as u8))
            .collect();
        Self {
            rows: n,
            symbols: n,
            cells,
        }
    }

    /// Builds a grid from explicit rows, checking that each row is a
    /// permutation of `{1..=symbols}`.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| LatinError::shape("grid has no rows"))?;
        let symbols = first.len();
        if !(2..=MAX_ORDER).contains(&symbols) {
            return Err(LatinError::shape(format!(
                "symbol count {symbols} outside 2..=255"
            )));
        }

        let mut cells = Vec::with_capacity(rows.len() * symbols);
        let mut seen = vec![false; symbols];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != symbols {
                return Err(LatinError::shape(format!(
                    "row {r} has {} entries, expected {symbols}",
                    row.len()
                )));
            }
            seen.fill(false);
            for &v in row {
                let idx = (v as usize).wrapping_sub(1);
                if idx >= symbols || seen[idx] {
                    return Err(LatinError::shape(format!(
                        "row {r} is not a permutation of 1..={symbols}"
                    )));
                }
                seen[idx] = true;
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            symbols,
            cells,
        })
    }

    /// Draws a Latin square by appending random row permutations that do not
    /// clash with any column so far. The last row is forced by the others.
    ///
    /// The expected number of draws grows exponentially with `n`; this exists
    /// as a naive reference generator, the search never uses it.
    ///
    /// # Panics
    /// Panics if `n < 2` or `n > 255`.
    pub fn sample_by_rejection<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        assert!((2..=MAX_ORDER).contains(&n), "n must be in range 2..=255");

        // used[c * n + s]: symbol s + 1 already placed in column c
        let mut used = vec![false; n * n];
        let mut cells = Vec::with_capacity(n * n);
        let mut candidate: Vec<u8> = (1..=n as u8).collect();
        let mut draws = 0u64;

        for _ in 0..n - 1 {
            loop {
                draws += 1;
                candidate.shuffle(rng);
                let clash = candidate
                    .iter()
                    .enumerate()
                    .any(|(c, &v)| used[c * n + v as usize - 1]);
                if !clash {
                    break;
                }
            }
            for (c, &v) in candidate.iter().enumerate() {
                used[c * n + v as usize - 1] = true;
            }
            cells.extend_from_slice(&candidate);
        }

        for c in 0..n {
            let missing = (0..n).find(|&s| !used[c * n + s]).unwrap_or(0);
            cells.push(missing as u8 + 1);
        }

        tracing::trace!(n, draws, "rejection sampling finished");
        Self {
            rows: n,
            symbols: n,
            cells,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of symbols, which is also the number of columns.
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Returns true when the grid has as many rows as symbols.
    pub fn is_square(&self) -> bool {
        self.rows == self.symbols
    }

    /// Returns the symbol at position `(r, c)`.
    ///
    /// # Panics
    /// Panics if `r >= rows` or `c >= symbols`.
    pub fn get(&self, r: usize, c: usize) -> u8 {
        assert!(r < self.rows && c < self.symbols, "index out of bounds");
        self.cells[r * self.symbols + c]
    }

    /// Sets the symbol at position `(r, c)` without checking the row invariant.
    pub(crate) fn set_unchecked(&mut self, r: usize, c: usize, v: u8) {
        self.cells[r * self.symbols + c] = v;
    }

    /// Returns row `r` as a slice.
    pub fn row(&self, r: usize) -> &[u8] {
        &self.cells[r * self.symbols..(r + 1) * self.symbols]
    }

    /// Returns the cells as a flat slice in row-major order.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Copies the grid into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.symbols)
            .map(<[u8]>::to_vec)
            .collect()
    }

    /// Returns the rectangle formed by the first `k` rows.
    pub fn head(&self, k: usize) -> Result<Self> {
        if k == 0 || k > self.rows {
            return Err(LatinError::shape(format!(
                "cannot take {k} rows from a grid with {} rows",
                self.rows
            )));
        }
        Ok(Self {
            rows: k,
            symbols: self.symbols,
            cells: self.cells[..k * self.symbols].to_vec(),
        })
    }

    /// Column index of every symbol in row `r`, indexed by `symbol - 1`.
    pub(crate) fn positions(&self, r: usize) -> Vec<usize> {
        let mut pos = vec![0usize; self.symbols];
        for (c, &v) in self.row(r).iter().enumerate() {
            pos[v as usize - 1] = c;
        }
        pos
    }

    /// Exchanges columns `a` and `b` in every row.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        assert!(a < self.symbols && b < self.symbols, "index out of bounds");
        for row in self.cells.chunks_mut(self.symbols) {
            row.swap(a, b);
        }
    }

    /// Returns true if this is a Latin square: square, with every row and
    /// every column a permutation of `{1..=n}`.
    pub fn is_latin(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.symbols;
        let mut seen = vec![false; n];
        for r in 0..n {
            seen.fill(false);
            for c in 0..n {
                let v = (self.get(r, c) as usize).wrapping_sub(1);
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        for c in 0..n {
            seen.fill(false);
            for r in 0..n {
                let v = (self.get(r, c) as usize).wrapping_sub(1);
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        true
    }
}
