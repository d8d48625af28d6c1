//! Incidence-cube representation and the Jacobson-Matthews defect walk.
//!
//! A Latin square of order n is lifted to an n×n×n array indexed by
//! (symbol, row, col) with a 1 wherever the cell (row, col) holds the symbol.
//! Every axis-parallel line of that cube sums to 1. The walk may leave the
//! set of proper cubes by pushing a single entry to -1; all line sums stay 1
//! and the next move starts from the -1 entry until it is repaired.
//!
//! Reference: Jacobson, M. T., & Matthews, P. (1996). "Generating uniformly
//! distributed random Latin squares." Journal of Combinatorial Designs, 4(6), 405-437.

use rand::Rng;

use crate::Grid;
use crate::error::{LatinError, Result};

/// One of the three directions a line of the cube can run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Row and column fixed, symbol varies.
    Symbol,
    /// Symbol and column fixed, row varies.
    Row,
    /// Symbol and row fixed, column varies.
    Col,
}

/// A position in the cube. `symbol` is zero-based (grid symbol minus one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub symbol: usize,
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(symbol: usize, row: usize, col: usize) -> Self {
        Self { symbol, row, col }
    }

    /// The coordinate reached by moving along `axis` to index `i`.
    fn along(self, axis: Axis, i: usize) -> Self {
        match axis {
            Axis::Symbol => Self { symbol: i, ..self },
            Axis::Row => Self { row: i, ..self },
            Axis::Col => Self { col: i, ..self },
        }
    }
}

/// Whether the cube currently encodes a Latin square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectState {
    /// Every entry is 0 or 1.
    Valid,
    /// Exactly one entry, at `at`, is -1. All other entries are 0 or 1.
    Defective { at: Coord },
}

impl DefectState {
    /// Position of the outstanding -1 entry, if any.
    pub fn defect(&self) -> Option<Coord> {
        match *self {
            DefectState::Valid => None,
            DefectState::Defective { at } => Some(at),
        }
    }
}

/// Incidence cube of a (possibly improper) Latin square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    n: usize,
    /// Flattened 3D array: cells[symbol * n * n + row * n + col]
    cells: Vec<i8>,
    state: DefectState,
}

impl Cube {
    /// Lift a Latin square to its characteristic cube.
    ///
    /// Fails with [`LatinError::Shape`] unless `grid` is a full Latin square.
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        if !grid.is_square() {
            return Err(LatinError::shape(format!(
                "incidence cube needs a square grid, got {}x{}",
                grid.rows(),
                grid.symbols()
            )));
        }
        if !grid.is_latin() {
            return Err(LatinError::shape("grid columns are not permutations"));
        }

        let n = grid.symbols();
        let mut cells = vec![0i8; n * n * n];
        for r in 0..n {
            for c in 0..n {
                let s = grid.get(r, c) as usize - 1;
                cells[s * n * n + r * n + c] = 1;
            }
        }
        Ok(Self {
            n,
            cells,
            state: DefectState::Valid,
        })
    }

    /// Order of the square this cube encodes.
    pub fn order(&self) -> usize {
        self.n
    }

    /// Current defect state. O(1).
    #[inline]
    pub fn state(&self) -> DefectState {
        self.state
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state == DefectState::Valid
    }

    /// Entry at `at`.
    ///
    /// # Panics
    /// Panics if any component of `at` is out of range.
    #[inline]
    pub fn get(&self, at: Coord) -> i8 {
        self.cells[self.index(at)]
    }

    /// Sum of the line through `at` running along `axis`.
    pub fn line_sum(&self, axis: Axis, at: Coord) -> i32 {
        (0..self.n)
            .map(|i| i32::from(self.get(at.along(axis, i))))
            .sum()
    }

    /// Lower the cube back to a grid.
    ///
    /// Fails with [`LatinError::InvalidCube`] unless the cube is in the valid
    /// state with every line summing to exactly one.
    pub fn to_grid(&self) -> Result<Grid> {
        let violations = self.violations();
        if violations > 0 || !self.is_valid() {
            return Err(LatinError::invalid_cube(violations.max(1)));
        }

        let n = self.n;
        let mut grid = Grid::new_cyclic(n);
        for r in 0..n {
            for c in 0..n {
                if let Some(s) = (0..n).find(|&s| self.get(Coord::new(s, r, c)) == 1) {
                    grid.set_unchecked(r, c, s as u8 + 1);
                }
            }
        }
        Ok(grid)
    }

    /// Perform one Jacobson-Matthews move and return the new state.
    ///
    /// From the valid state the move starts at a uniformly random 0 entry;
    /// from the defective state it starts at the -1 entry. The three lines
    /// through that start hold one partner each when valid and two when
    /// defective; one partner per line is chosen uniformly. The start is
    /// incremented, the point assembled from the three partners is
    /// decremented and the other six corners of the spanned 2x2x2 box are
    /// flipped. If the decrement leaves -1 behind, that point is the new defect.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DefectState> {
        let n = self.n;

        let (target, expected) = match self.state {
            DefectState::Valid => {
                let row = rng.random_range(0..n);
                let col = rng.random_range(0..n);
                let current = self.partners(Axis::Symbol, Coord::new(0, row, col), 1)?[0];
                let symbol = loop {
                    let s = rng.random_range(0..n);
                    if s != current {
                        break s;
                    }
                };
                (Coord::new(symbol, row, col), 1)
            }
            DefectState::Defective { at } => (at, 2),
        };

        let mut pick = |axis: Axis| -> Result<usize> {
            let found = self.partners(axis, target, expected)?;
            Ok(found[rng.random_range(0..expected)])
        };
        let symbol = pick(Axis::Symbol)?;
        let row = pick(Axis::Row)?;
        let col = pick(Axis::Col)?;
        let partner = Coord::new(symbol, row, col);

        self.apply_move(target, partner);
        Ok(self.state)
    }

    /// Step until the cube is valid again, taking at least one step.
    /// Returns the number of steps taken.
    pub fn walk_to_valid<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        let mut steps = 0u64;
        loop {
            self.step(rng)?;
            steps += 1;
            if self.is_valid() {
                break;
            }
        }
        tracing::trace!(n = self.n, steps, "chain repaired");
        Ok(steps)
    }

    /// Increment `target`, decrement `partner`, flip the rest of their box.
    fn apply_move(&mut self, target: Coord, partner: Coord) {
        self.add(target, 1);
        self.add(partner, -1);

        for symbol in [target.symbol, partner.symbol] {
            for row in [target.row, partner.row] {
                for col in [target.col, partner.col] {
                    let at = Coord::new(symbol, row, col);
                    if at == target || at == partner {
                        continue;
                    }
                    let idx = self.index(at);
                    self.cells[idx] = 1 - self.cells[idx];
                }
            }
        }

        self.state = if self.get(partner) == -1 {
            DefectState::Defective { at: partner }
        } else {
            DefectState::Valid
        };
    }

    /// Indices along `axis` through `at` whose entry is 1. Exactly `expected`
    /// of them must exist.
    fn partners(&self, axis: Axis, at: Coord, expected: usize) -> Result<[usize; 2]> {
        let mut found = [0usize; 2];
        let mut count = 0;
        for i in 0..self.n {
            if self.get(at.along(axis, i)) == 1 {
                if count < found.len() {
                    found[count] = i;
                }
                count += 1;
            }
        }
        if count != expected {
            return Err(LatinError::NoPartner {
                axis,
                at,
                found: count,
                expected,
            });
        }
        Ok(found)
    }

    /// Count of entries outside {0, 1} plus lines not summing to one.
    fn violations(&self) -> usize {
        let n = self.n;
        let bad_entries = self.cells.iter().filter(|&&v| v != 0 && v != 1).count();
        let mut bad_lines = 0;
        for a in 0..n {
            for b in 0..n {
                let lines = [
                    (Axis::Symbol, Coord::new(0, a, b)),
                    (Axis::Row, Coord::new(a, 0, b)),
                    (Axis::Col, Coord::new(a, b, 0)),
                ];
                bad_lines += lines
                    .iter()
                    .filter(|&&(axis, at)| self.line_sum(axis, at) != 1)
                    .count();
            }
        }
        bad_entries + bad_lines
    }

    #[inline]
    fn index(&self, at: Coord) -> usize {
        at.symbol * self.n * self.n + at.row * self.n + at.col
    }

    #[inline]
    fn add(&mut self, at: Coord, delta: i8) {
        let idx = self.index(at);
        self.cells[idx] += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn all_lines_sum_to_one(cube: &Cube) -> bool {
        let n = cube.order();
        (0..n).all(|a| {
            (0..n).all(|b| {
                cube.line_sum(Axis::Symbol, Coord::new(0, a, b)) == 1
                    && cube.line_sum(Axis::Row, Coord::new(a, 0, b)) == 1
                    && cube.line_sum(Axis::Col, Coord::new(a, b, 0)) == 1
            })
        })
    }

    fn negative_entries(cube: &Cube) -> Vec<Coord> {
        let n = cube.order();
        let mut out = Vec::new();
        for s in 0..n {
            for r in 0..n {
                for c in 0..n {
                    let at = Coord::new(s, r, c);
                    let v = cube.get(at);
                    assert!((-1..=1).contains(&v), "entry {:?} = {} out of range", at, v);
                    if v == -1 {
                        out.push(at);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn round_trip_cyclic() {
        for n in 2..=10 {
            let sq = Grid::new_cyclic(n);
            let cube = Cube::from_grid(&sq).unwrap();
            assert!(cube.is_valid());
            assert!(all_lines_sum_to_one(&cube));
            assert_eq!(cube.to_grid().unwrap(), sq, "round trip failed for n={}", n);
        }
    }

    #[test]
    fn lift_uses_symbol_row_col_order() {
        let sq = Grid::new_cyclic(3);
        let cube = Cube::from_grid(&sq).unwrap();
        // cell (1, 2) holds symbol 1
        assert_eq!(cube.get(Coord::new(0, 1, 2)), 1);
        assert_eq!(cube.get(Coord::new(1, 1, 2)), 0);
    }

    #[test]
    fn from_grid_rejects_rectangles_and_non_latin() {
        let rect = Grid::new_cyclic(4).head(2).unwrap();
        assert!(matches!(
            Cube::from_grid(&rect),
            Err(LatinError::Shape { .. })
        ));

        let repeated = Grid::from_rows(&[vec![1, 2, 3], vec![1, 2, 3], vec![3, 1, 2]]).unwrap();
        assert!(matches!(
            Cube::from_grid(&repeated),
            Err(LatinError::Shape { .. })
        ));
    }

    #[test]
    fn single_step_keeps_at_most_one_defect() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);

        for n in 3..=8 {
            let mut cube = Cube::from_grid(&Grid::new_cyclic(n)).unwrap();
            for _ in 0..2_000 {
                let state = cube.step(&mut rng).unwrap();
                let negatives = negative_entries(&cube);
                match state {
                    DefectState::Valid => assert!(negatives.is_empty()),
                    DefectState::Defective { at } => assert_eq!(negatives, vec![at]),
                }
                assert!(all_lines_sum_to_one(&cube), "line sums broken for n={}", n);
            }
        }
    }

    #[test]
    fn defective_cube_cannot_be_lowered() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut cube = Cube::from_grid(&Grid::new_cyclic(6)).unwrap();
        while cube.is_valid() {
            cube.step(&mut rng).unwrap();
        }
        assert!(cube.state().defect().is_some());
        assert!(matches!(
            cube.to_grid(),
            Err(LatinError::InvalidCube { .. })
        ));
    }

    #[test]
    fn missing_partner_from_valid_state() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let mut cube = Cube::from_grid(&Grid::new_cyclic(4)).unwrap();
        cube.cells.fill(0);
        assert!(matches!(
            cube.step(&mut rng),
            Err(LatinError::NoPartner {
                axis: Axis::Symbol,
                found: 0,
                expected: 1,
                ..
            })
        ));
    }

    #[test]
    fn missing_partners_from_defective_state() {
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let mut cube = Cube::from_grid(&Grid::new_cyclic(5)).unwrap();
        while cube.is_valid() {
            cube.step(&mut rng).unwrap();
        }
        let at = cube.state().defect().unwrap();
        cube.cells.fill(0);
        let idx = cube.index(at);
        cube.cells[idx] = -1;

        let err = cube.step(&mut rng).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(matches!(
            err,
            LatinError::NoPartner {
                found: 0,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn walk_to_valid_yields_latin_squares() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);

        for n in [2, 3, 5, 7, 8] {
            let mut cube = Cube::from_grid(&Grid::new_cyclic(n)).unwrap();
            for _ in 0..200 {
                let steps = cube.walk_to_valid(&mut rng).unwrap();
                assert!(steps >= 1);
                assert!(cube.is_valid());
                assert!(all_lines_sum_to_one(&cube));
                let sq = cube.to_grid().unwrap();
                assert!(sq.is_latin(), "result should be Latin for n={}", n);
                assert_eq!(Cube::from_grid(&sq).unwrap(), cube);
            }
        }
    }

    #[test]
    fn walk_leaves_the_cyclic_square() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let start = Grid::new_cyclic(5);
        let mut cube = Cube::from_grid(&start).unwrap();
        let mut moved = false;
        for _ in 0..50 {
            cube.walk_to_valid(&mut rng).unwrap();
            if cube.to_grid().unwrap() != start {
                moved = true;
                break;
            }
        }
        assert!(moved, "chain never left the cyclic square");
    }

    #[test]
    fn same_seed_same_walk() {
        let start = Grid::new_cyclic(6);
        let run = |seed| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut cube = Cube::from_grid(&start).unwrap();
            for _ in 0..100 {
                cube.walk_to_valid(&mut rng).unwrap();
            }
            cube.to_grid().unwrap()
        };
        assert_eq!(run(9), run(9));
    }
}
