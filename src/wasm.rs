use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use wasm_bindgen::prelude::*;

use crate::{Grid, SearchOutcome, SearchParams, Target, search};

/// Convert a Grid to a JsValue (2D array of u8).
fn grid_to_js(grid: &Grid) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&grid.to_rows()).map_err(|e| JsError::new(&e.to_string()))
}

fn run(n: u8, k: u8, seed: u64) -> Result<SearchOutcome, JsError> {
    if n < 2 {
        return Err(JsError::new("n must be at least 2"));
    }
    let target = Target {
        rows: k as usize,
        symbols: n as usize,
    };
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    search(target, &mut rng, &SearchParams::default()).map_err(|e| JsError::new(&e.to_string()))
}

/// Search for a balanced `k` × `n` Latin rectangle with the given seed.
/// Returns the best rectangle as a 2D array directly usable in JavaScript.
#[wasm_bindgen]
pub fn balanced_rectangle(n: u8, k: u8, seed: u64) -> Result<JsValue, JsError> {
    let outcome = run(n, k, seed)?;
    grid_to_js(&outcome.best)
}

/// A finished search exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmSearch {
    outcome: SearchOutcome,
}

#[wasm_bindgen]
impl WasmSearch {
    /// Run a search for a `k` × `n` rectangle.
    ///
    /// `n` must be in range 2..=255 and `k` in 1..=n.
    #[wasm_bindgen(constructor)]
    pub fn new(n: u8, k: u8, seed: u64) -> Result<WasmSearch, JsError> {
        Ok(WasmSearch {
            outcome: run(n, k, seed)?,
        })
    }

    /// Rectangle imbalance of the best rectangle.
    pub fn score(&self) -> f64 {
        self.outcome.score
    }

    /// Best rectangle as a 2D array of u8 values.
    pub fn best(&self) -> Result<JsValue, JsError> {
        grid_to_js(&self.outcome.best)
    }

    /// Number of zero-imbalance rectangles met during the search.
    pub fn solution_count(&self) -> usize {
        self.outcome.solutions.len()
    }
}
