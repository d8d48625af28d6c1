//! Normal form and local moves for Latin rectangles.

use rand::Rng;

use crate::Grid;

/// Relabel symbols so the first row reads `1, 2, ..., n`, then order rows by
/// their first entry.
///
/// Grids that differ only by a symbol relabeling and a row permutation map to
/// the same result, and applying it twice changes nothing.
pub fn canonicalize(grid: &Grid) -> Grid {
    let n = grid.symbols();

    // relabel[old_symbol - 1] = new_symbol
    let mut relabel = vec![0u8; n];
    for (c, &v) in grid.row(0).iter().enumerate() {
        relabel[v as usize - 1] = c as u8 + 1;
    }

    let mut rows: Vec<Vec<u8>> = (0..grid.rows())
        .map(|r| grid.row(r).iter().map(|&v| relabel[v as usize - 1]).collect())
        .collect();
    rows.sort_by_key(|row| row[0]);

    let mut out = grid.clone();
    for (r, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out.set_unchecked(r, c, v);
        }
    }
    out
}

/// Copy `grid` with two columns exchanged. Both columns are drawn
/// independently, so the copy may equal the original.
pub fn perturb<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid {
    let n = grid.symbols();
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let mut out = grid.clone();
    out.swap_columns(a, b);
    out
}
