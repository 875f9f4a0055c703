//! Performance harness driving a [`Task`] under two timing protocols.
//!
//! * [`Perf::pipeline_run`] times the whole lifecycle (validate, stage in,
//!   execute, stage out) once per iteration, after a configurable number of
//!   untimed warm-up cycles.
//! * [`Perf::task_run`] validates and stages once outside the timed region,
//!   times only [`Task::run`] for every iteration, then stages out once.
//!
//! Both report the mean seconds per iteration. The clock is injected through
//! [`PerfAttr::current_timer`], so tests can substitute a deterministic one.
//!
//! # Example
//!
//! ```rust
//! use strassen_task::perf::{Perf, PerfAttr, PerfResults, RunKind};
//! use strassen_task::task::{StrassenTask, TaskData};
//!
//! let a = vec![1.0, 2.0, 3.0, 4.0];
//! let b = vec![1.0, 0.0, 0.0, 1.0];
//! let mut out = vec![0.0; 4];
//!
//! let mut perf = Perf::new(StrassenTask::new(TaskData::new(&a, &b, 2, &mut out)));
//! let mut results = PerfResults::default();
//! perf.task_run(&PerfAttr::default().with_num_running(3), &mut results).unwrap();
//! drop(perf);
//!
//! assert_eq!(results.type_of_running, RunKind::TaskRun);
//! assert_eq!(out, a);
//! ```

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;

use crate::{
    error::{invalid_config, validation_failed, Result, StrassenError},
    task::Task,
};

/// Mean iteration times above this many seconds fail the report.
pub const MAX_TIME: f64 = 10.0;

/// Mean iteration times below this many seconds are reported as not measured.
pub const MIN_MEASURABLE_TIME: f64 = 1e-6;

/// Clock returning seconds elapsed since some fixed reference point.
pub type Timer = Box<dyn Fn() -> f64>;

/// Monotonic wall clock anchored at the moment of the call.
pub fn wall_clock() -> Timer {
    let t0 = Instant::now();
    Box::new(move || t0.elapsed().as_secs_f64())
}

/// Parameters of one harness run.
pub struct PerfAttr {
    /// Number of timed iterations to average over.
    pub num_running: usize,
    /// Untimed full cycles run before a pipeline measurement.
    pub warmup_runs: usize,
    /// Clock sampled around each timed iteration.
    pub current_timer: Timer,
}

impl Default for PerfAttr {
    fn default() -> Self {
        Self {
            num_running: 10,
            warmup_runs: 1,
            current_timer: wall_clock(),
        }
    }
}

impl fmt::Debug for PerfAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerfAttr")
            .field("num_running", &self.num_running)
            .field("warmup_runs", &self.warmup_runs)
            .finish_non_exhaustive()
    }
}

impl PerfAttr {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_num_running(mut self, num_running: usize) -> Self {
        self.num_running = num_running;
        self
    }

    #[must_use]
    pub fn with_warmup_runs(mut self, warmup_runs: usize) -> Self {
        self.warmup_runs = warmup_runs;
        self
    }

    #[must_use]
    pub fn with_timer(mut self, timer: impl Fn() -> f64 + 'static) -> Self {
        self.current_timer = Box::new(timer);
        self
    }

    fn now(&self) -> f64 {
        (self.current_timer)()
    }
}

/// Which protocol produced a [`PerfResults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunKind {
    #[default]
    None,
    Pipeline,
    TaskRun,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunKind::None => "none",
            RunKind::Pipeline => "pipeline",
            RunKind::TaskRun => "task_run",
        };
        f.write_str(name)
    }
}

/// Outcome of a harness run.
#[derive(Debug, Clone, Default)]
pub struct PerfResults {
    /// Mean seconds per timed iteration.
    pub time_sec: f64,
    pub type_of_running: RunKind,
    /// Seconds taken by each timed iteration, in order.
    pub samples: Vec<f64>,
    /// Name of the task that was measured.
    pub task_name: String,
    /// When the measurement finished.
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Spread of the per-iteration samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation, zero for fewer than two samples.
    pub std_dev: f64,
}

impl PerfResults {
    /// `false` when the mean is too small to be distinguished from noise.
    pub fn is_measured(&self) -> bool {
        self.time_sec >= MIN_MEASURABLE_TIME
    }

    pub fn summary(&self) -> Option<SampleSummary> {
        if self.samples.is_empty() {
            return None;
        }

        let std_dev = if self.samples.len() < 2 {
            0.0
        } else {
            Statistics::std_dev(self.samples.iter())
        };

        Some(SampleSummary {
            min: Statistics::min(self.samples.iter()),
            max: Statistics::max(self.samples.iter()),
            mean: Statistics::mean(self.samples.iter()),
            std_dev,
        })
    }

    fn record(&mut self, kind: RunKind, task_name: &str, samples: Vec<f64>) {
        let total: f64 = samples.iter().sum();
        self.time_sec = total / samples.len() as f64;
        self.type_of_running = kind;
        self.samples = samples;
        self.task_name = task_name.to_string();
        self.recorded_at = Some(Utc::now());
    }
}

/// Harness owning the task it measures.
///
/// The task borrows the caller's output buffer, so the buffer becomes readable
/// again once the harness is dropped or [`Perf::into_task`] is consumed.
pub struct Perf<T: Task> {
    task: T,
}

impl<T: Task> Perf<T> {
    pub fn new(task: T) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn into_task(self) -> T {
        self.task
    }

    /// Times `num_running` full lifecycles, after `warmup_runs` untimed ones.
    #[tracing::instrument(level = "info", skip_all, fields(task = self.task.name(), runs = attr.num_running))]
    pub fn pipeline_run(&mut self, attr: &PerfAttr, results: &mut PerfResults) -> Result<()> {
        check_runs(attr)?;

        for _ in 0..attr.warmup_runs {
            self.cycle()?;
        }

        let mut samples = Vec::with_capacity(attr.num_running);
        for _ in 0..attr.num_running {
            let begin = attr.now();
            self.cycle()?;
            samples.push(attr.now() - begin);
        }

        results.record(RunKind::Pipeline, self.task.name(), samples);
        tracing::info!(time_sec = results.time_sec, "pipeline run complete");
        Ok(())
    }

    /// Stages once, times `num_running` executions, then stages out once.
    #[tracing::instrument(level = "info", skip_all, fields(task = self.task.name(), runs = attr.num_running))]
    pub fn task_run(&mut self, attr: &PerfAttr, results: &mut PerfResults) -> Result<()> {
        check_runs(attr)?;

        self.validate()?;
        self.task.pre_processing()?;

        let mut samples = Vec::with_capacity(attr.num_running);
        for _ in 0..attr.num_running {
            let begin = attr.now();
            self.task.run()?;
            samples.push(attr.now() - begin);
        }

        self.task.post_processing()?;

        results.record(RunKind::TaskRun, self.task.name(), samples);
        tracing::info!(time_sec = results.time_sec, "task run complete");
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.task.validation() {
            Ok(())
        } else {
            Err(validation_failed(format!(
                "task `{}` rejected its input/output sizes",
                self.task.name()
            )))
        }
    }

    fn cycle(&mut self) -> Result<()> {
        self.validate()?;
        self.task.pre_processing()?;
        self.task.run()?;
        self.task.post_processing()
    }
}

fn check_runs(attr: &PerfAttr) -> Result<()> {
    if attr.num_running == 0 {
        return Err(invalid_config("num_running must be at least 1"));
    }
    Ok(())
}

/// Renders the report lines for `results`.
pub fn format_perf_statistic(results: &PerfResults) -> String {
    let time = if results.is_measured() {
        format!("{:.10}", results.time_sec)
    } else {
        "not measured".to_string()
    };

    let mut report = format!(
        "{}:{}:{} ({} iterations)",
        results.task_name,
        results.type_of_running,
        time,
        results.samples.len()
    );

    if let Some(summary) = results.summary() {
        report.push_str(&format!(
            "\n  min {:.6}s  max {:.6}s  std-dev {:.6}s",
            summary.min, summary.max, summary.std_dev
        ));
    }

    if let Some(at) = results.recorded_at {
        report.push_str(&format!("\n  recorded {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    report
}

/// Prints the report for `results` to stdout.
///
/// # Errors
///
/// Returns [`StrassenError::TimeLimitExceeded`] when the mean iteration time
/// is at or above [`MAX_TIME`]; the report is still printed.
pub fn print_perf_statistic(results: &PerfResults) -> Result<()> {
    println!("{}", format_perf_statistic(results));

    if results.time_sec >= MAX_TIME {
        return Err(StrassenError::TimeLimitExceeded {
            time_sec: results.time_sec,
            limit_sec: MAX_TIME,
        });
    }
    Ok(())
}
