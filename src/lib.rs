#![doc = include_str!("../README.md")]

mod error;
mod grid;
mod incidence;
mod metrics;
mod perturb;
mod results;
mod search;
#[cfg(feature = "wasm")]
mod wasm;

pub use error::{LatinError, Result};
pub use grid::Grid;
pub use incidence::{Axis, Coord, Cube, DefectState};
pub use metrics::{baseline, order_imbalance, rectangle_imbalance};
pub use perturb::{canonicalize, perturb};
pub use results::{ResultTable, Target, TargetResult};
pub use search::{SearchOutcome, SearchParams, Sweep, SweepParams, search};
