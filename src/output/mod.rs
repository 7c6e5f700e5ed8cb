//! Writes numeric tables and figures with the calibration results

mod plotting;
mod table;
pub use plotting::*;
pub use table::*;
