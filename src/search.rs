use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LatinError, Result};
use crate::grid::MAX_ORDER;
use crate::results::{ResultTable, Target};
use crate::{Cube, Grid, canonicalize, perturb, rectangle_imbalance};

/// Parameters for a single balanced-rectangle search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of chain-repair cycles before giving up.
    pub outer_cycles: usize,
    /// Column-swap proposals tried after each chain repair.
    pub perturbations_per_cycle: usize,
    /// Cycles after which the walk restarts from the cyclic square.
    pub stagnation_budget: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            outer_cycles: 120,
            perturbations_per_cycle: 35,
            stagnation_budget: 40,
        }
    }
}

/// Result of [`search`] for one target.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub target: Target,
    /// Lowest-imbalance rectangle seen, `target.rows` × `target.symbols`.
    pub best: Grid,
    /// Rectangle imbalance of `best`.
    pub score: f64,
    /// Cycles actually run.
    pub cycles: usize,
    /// Number of resets to the cyclic square.
    pub restarts: usize,
    /// Every zero-imbalance proposal met along the way, canonicalized.
    pub solutions: Vec<Grid>,
}

impl SearchOutcome {
    pub fn is_balanced(&self) -> bool {
        self.score == 0.0
    }
}

fn check_target(target: Target) -> Result<()> {
    if !(2..=MAX_ORDER).contains(&target.symbols) {
        return Err(LatinError::shape(format!(
            "symbol count {} outside 2..=255",
            target.symbols
        )));
    }
    if target.rows == 0 || target.rows > target.symbols {
        return Err(LatinError::shape(format!(
            "row count {} outside 1..={}",
            target.rows, target.symbols
        )));
    }
    Ok(())
}

/// Searches for a `target.rows` × `target.symbols` Latin rectangle with low
/// rectangle imbalance.
///
/// Each cycle walks the Jacobson-Matthews chain from the current square back
/// to a proper square, then hill-climbs by column swaps scored on the leading
/// `target.rows` rows. The best rectangle is replaced whenever a cycle ends
/// at an equal or lower score, and the search stops as soon as it reaches
/// zero. Every `stagnation_budget` cycles the current square is reset to the
/// cyclic one.
///
/// # Panics
/// Panics if `outer_cycles` or `stagnation_budget` is zero.
pub fn search<R: Rng + ?Sized>(
    target: Target,
    rng: &mut R,
    params: &SearchParams,
) -> Result<SearchOutcome> {
    assert!(params.outer_cycles > 0, "outer_cycles must be positive");
    assert!(params.stagnation_budget > 0, "stagnation_budget must be positive");
    check_target(target)?;

    let k = target.rows;
    let n = target.symbols;
    let score_of = |grid: &Grid| -> Result<f64> { rectangle_imbalance(&grid.head(k)?) };

    let mut current = Grid::new_cyclic(n);
    let mut best: Option<(Grid, f64)> = None;
    let mut budget = params.stagnation_budget;
    let mut solutions = Vec::new();
    let mut cycles = 0;
    let mut restarts = 0;

    for cycle in 0..params.outer_cycles {
        cycles = cycle + 1;

        let mut cube = Cube::from_grid(&current)?;
        cube.walk_to_valid(rng)?;
        current = cube.to_grid()?;
        let mut current_score = score_of(&current)?;

        for _ in 0..params.perturbations_per_cycle {
            let candidate = perturb(&current, rng);
            let candidate_score = score_of(&candidate)?;
            if candidate_score == 0.0 {
                solutions.push(canonicalize(&candidate.head(k)?));
            }
            if candidate_score < current_score {
                current = candidate;
                current_score = candidate_score;
            }
        }

        let improved = best
            .as_ref()
            .is_none_or(|&(_, best_score)| current_score <= best_score);
        if improved {
            debug!(k, n, cycle, score = current_score, "best rectangle updated");
            best = Some((current.head(k)?, current_score));
            if current_score == 0.0 {
                break;
            }
        }

        budget -= 1;
        if budget == 0 {
            debug!(k, n, cycle, "stagnation budget spent, restarting from cyclic square");
            current = Grid::new_cyclic(n);
            budget = params.stagnation_budget;
            restarts += 1;
        }
    }

    // outer_cycles > 0 guarantees at least one completed cycle
    let (best, score) = best.ok_or_else(|| LatinError::shape("search ran no cycles"))?;
    info!(
        k,
        n,
        score,
        cycles,
        restarts,
        solutions = solutions.len(),
        "search finished"
    );
    Ok(SearchOutcome {
        target,
        best,
        score,
        cycles,
        restarts,
        solutions,
    })
}

/// Parameters for a sweep over many targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    /// Smallest row count visited.
    pub min_rows: usize,
    /// Largest symbol count visited.
    pub max_symbols: usize,
    /// Base seed; each target derives its own stream from it.
    pub seed: u64,
    pub search: SearchParams,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            min_rows: 2,
            max_symbols: 12,
            seed: 0,
            search: SearchParams::default(),
        }
    }
}

/// An iterator running [`search`] once per target.
///
/// Targets are visited with rows in `min_rows..=max_symbols` on the outside
/// and symbols in `rows..=max_symbols` inside. Targets whose recorded score
/// is already zero are skipped. A failing target yields its error and the
/// sweep moves on.
///
/// # Example
///
/// ```
/// use latin_balance::{ResultTable, SearchParams, Sweep, SweepParams};
///
/// let params = SweepParams {
///     min_rows: 2,
///     max_symbols: 4,
///     seed: 7,
///     search: SearchParams { outer_cycles: 5, ..Default::default() },
/// };
/// let mut sweep = Sweep::new(params, ResultTable::new());
/// for (target, outcome) in sweep.by_ref() {
///     let outcome = outcome.expect("search failed");
///     assert_eq!(outcome.best.rows(), target.rows);
/// }
/// assert_eq!(sweep.table().len(), 6);
/// ```
pub struct Sweep {
    params: SweepParams,
    targets: std::vec::IntoIter<Target>,
    table: ResultTable,
}

impl Sweep {
    /// Create a sweep that records into (and skips targets solved in) `table`.
    ///
    /// # Panics
    /// Panics if `min_rows` is zero or `max_symbols > 255`.
    pub fn new(params: SweepParams, table: ResultTable) -> Self {
        assert!(params.min_rows > 0, "min_rows must be positive");
        assert!(params.max_symbols <= MAX_ORDER, "max_symbols must be at most 255");

        let targets: Vec<Target> = (params.min_rows..=params.max_symbols)
            .flat_map(|rows| {
                (rows.max(2)..=params.max_symbols).map(move |symbols| Target { rows, symbols })
            })
            .collect();

        Self {
            params,
            targets: targets.into_iter(),
            table,
        }
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn into_table(self) -> ResultTable {
        self.table
    }

    /// Independent generator for `target`, reproducible on its own.
    fn rng_for(&self, target: Target) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::seed_from_u64(self.params.seed);
        rng.set_stream(((target.symbols as u64) << 32) | target.rows as u64);
        rng
    }
}

impl Iterator for Sweep {
    type Item = (Target, Result<SearchOutcome>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let target = self.targets.next()?;
            if self.table.is_solved(target) {
                debug!(k = target.rows, n = target.symbols, "already balanced, skipping");
                continue;
            }

            let mut rng = self.rng_for(target);
            let result = search(target, &mut rng, &self.params.search);
            match &result {
                Ok(outcome) => {
                    self.table
                        .record(target, outcome.best.clone(), outcome.score);
                }
                Err(err) => {
                    warn!(k = target.rows, n = target.symbols, error = %err, "target failed");
                }
            }
            return Some((target, result));
        }
    }
}
