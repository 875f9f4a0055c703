//! Strassen matrix multiplication behind a benchmarkable task lifecycle.
//!
//! * [`algebra`]: elementwise add/sub, quadrant split/join, naive multiply.
//! * [`strassen`]: the recursive engine, fanning its seven sub-products out
//!   on Rayon above a size threshold.
//! * [`task`]: the validate / stage-in / execute / stage-out contract.
//! * [`perf`]: pipeline and task timing protocols over any [`task::Task`].

pub mod algebra;
pub mod error;
pub mod generate;
pub mod logging;
pub mod perf;
pub mod strassen;
pub mod task;

pub use error::{Result, StrassenError};
pub use perf::{Perf, PerfAttr, PerfResults, RunKind};
pub use strassen::{strassen, strassen_with, Parallelism, StrassenConfig};
pub use task::{NaiveTask, Phase, StrassenTask, Task, TaskData};

/// Recursion levels at or below this dimension run their products sequentially.
pub const PARALLEL_THRESHOLD: usize = 32;

/// Dimension at which the recursion hands over to the triple loop.
pub const LEAF_SIZE: usize = 2;
