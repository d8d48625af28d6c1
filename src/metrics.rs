//! Positional imbalance metrics for Latin rectangles.
//!
//! For a pair of symbols `(u, v)` and a row, the reciprocal of the column
//! distance between them measures how close the pair sits. A rectangle is
//! balanced when, summed over its rows, every pair sits at the same
//! aggregate closeness: the [`baseline`] a uniformly random arrangement
//! would give on average.

use crate::Grid;
use crate::error::{LatinError, Result};

fn check_shape(symbols: usize, rows: usize) -> Result<()> {
    if rows == 0 || symbols < 2 {
        return Err(LatinError::shape(format!(
            "metrics need at least 1 row and 2 symbols, got {rows} rows and {symbols} symbols"
        )));
    }
    Ok(())
}

/// Expected row-aggregated reciprocal distance of a symbol pair.
///
/// `t = Σ_{1≤i<j≤symbols} 1/(j-i)` and `b = rows * t / (symbols * (symbols-1)) * 2`.
pub fn baseline(symbols: usize, rows: usize) -> Result<f64> {
    check_shape(symbols, rows)?;
    let mut t = 0.0;
    for i in 1..symbols {
        for j in i + 1..=symbols {
            t += 1.0 / (j - i) as f64;
        }
    }
    Ok(rows as f64 * t / symbols as f64 / (symbols - 1) as f64 * 2.0)
}

/// Sum over symbol pairs of `|Σ_rows 1/|pos(u) - pos(v)| - baseline|`.
///
/// Zero exactly when every pair's aggregate equals the baseline.
pub fn rectangle_imbalance(grid: &Grid) -> Result<f64> {
    let symbols = grid.symbols();
    let b = baseline(symbols, grid.rows())?;
    let positions: Vec<Vec<usize>> = (0..grid.rows()).map(|r| grid.positions(r)).collect();

    let mut imbalance = 0.0;
    for u in 0..symbols {
        for v in u + 1..symbols {
            let pair: f64 = positions
                .iter()
                .map(|pos| 1.0 / pos[u].abs_diff(pos[v]) as f64)
                .sum();
            imbalance += (pair - b).abs();
        }
    }
    Ok(imbalance)
}

/// Number of symbol pairs whose left/right order is unevenly split across rows.
///
/// Each row votes +1 if `u` stands left of `v` and -1 otherwise. With an even
/// number of rows a pair is violated when the votes do not cancel; with an odd
/// number, when they differ by more than one.
pub fn order_imbalance(grid: &Grid) -> Result<usize> {
    let symbols = grid.symbols();
    let rows = grid.rows();
    check_shape(symbols, rows)?;
    let positions: Vec<Vec<usize>> = (0..rows).map(|r| grid.positions(r)).collect();

    let mut violations = 0;
    for u in 0..symbols {
        for v in u + 1..symbols {
            let net: i64 = positions
                .iter()
                .map(|pos| if pos[u] < pos[v] { 1 } else { -1 })
                .sum();
            let violated = if rows % 2 == 0 { net != 0 } else { net.abs() > 1 };
            if violated {
                violations += 1;
            }
        }
    }
    Ok(violations)
}
