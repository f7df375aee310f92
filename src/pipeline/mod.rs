//! Pipeline entry points for watcher operations.
//!
//! - `Watcher`: the fetch → extract → match → notify → persist cycle
//! - `run_clean`: offline repair of the persisted seen set

pub mod clean;
pub mod scan;

pub use clean::{CleanOutcome, run_clean};
pub use scan::{ScanOutcome, Watcher};
