//! Data models and processing for engine telemetry.
//!
//! ## Submodules
//!
//! - [`analysis`]: RPM irregularity heuristic and fault prediction
//! - [`duration`]: Parsing and formatting of interval strings (e.g., "1s", "500ms")
//! - [`health`]: Operator [`Thresholds`] and [`HealthStatus`] classification
//! - [`stats`]: Mean and standard deviation helpers
//! - [`table`]: Bounded [`SampleTable`] with summary statistics
//! - [`window`]: Bounded [`RpmWindow`] feeding the heuristic
//!
//! ## Data Flow
//!
//! ```text
//! Reading
//!    │
//!    ├──▶ RpmWindow::push ──▶ predict_fault() ──▶ Prediction
//!    │                                              │
//!    ├──▶ SampleTable::push                         ▼
//!    │                                   Thresholds::classify()
//!    ▼
//! TableSummary (end of run)
//! ```

pub mod analysis;
pub mod duration;
pub mod health;
pub mod stats;
pub mod table;
pub mod window;

pub use analysis::{analyze_rpm, predict_fault, Fault, Irregularity, Prediction, RpmAnalysis};
pub use health::{HealthStatus, Thresholds};
pub use table::{Sample, SampleTable, TableSummary};
pub use window::RpmWindow;
