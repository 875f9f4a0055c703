//! Four-phase task lifecycle: validate, stage in, execute, stage out.
//!
//! A [`Task`] is bound to one [`TaskData`] bundle for its whole life. The
//! bundle only borrows caller-owned buffers; the task copies the operands into
//! private storage during [`Task::pre_processing`], computes during
//! [`Task::run`] and writes back into the caller's output slice during
//! [`Task::post_processing`].
//!
//! Phases must be invoked in order. Each task tracks its current [`Phase`]
//! and rejects out-of-order calls with
//! [`StrassenError::PhaseOrder`](crate::StrassenError::PhaseOrder) instead of
//! computing on stale or missing data. [`Task::run`] may be repeated once the
//! operands are staged, which is what the task benchmarking protocol relies on.

use crate::{
    algebra::naive_multiply,
    error::{dimension_mismatch, phase_order, Result},
    strassen::{element_count, strassen_with, StrassenConfig},
};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Constructed, nothing checked yet.
    #[default]
    Created,
    /// The bundle passed validation.
    Validated,
    /// The bundle failed validation.
    Rejected,
    /// Operands copied into private storage.
    Staged,
    /// A result is available in private storage.
    Executed,
    /// The result was copied to the caller's output buffer.
    Finished,
}

/// Borrowed operands, dimension and destination for one multiplication.
///
/// Input slot 0 is operand A, slot 1 operand B, and `n` plays the role of the
/// dedicated scalar input slot. There is a single output slot.
#[derive(Debug)]
pub struct TaskData<'a> {
    pub a: &'a [f64],
    pub b: &'a [f64],
    pub n: usize,
    pub output: &'a mut [f64],
}

impl<'a> TaskData<'a> {
    pub fn new(a: &'a [f64], b: &'a [f64], n: usize, output: &'a mut [f64]) -> Self {
        Self { a, b, n, output }
    }

    /// Element counts of the two operand slots.
    pub fn inputs_count(&self) -> [usize; 2] {
        [self.a.len(), self.b.len()]
    }

    /// Element count of the output slot.
    pub fn outputs_count(&self) -> [usize; 1] {
        [self.output.len()]
    }
}

/// A computation driven through the four ordered phases.
pub trait Task {
    /// Checks the bundle's declared sizes. Never touches staged data.
    fn validation(&mut self) -> bool;

    /// Copies the inputs into private storage.
    fn pre_processing(&mut self) -> Result<()>;

    /// Performs the computation on the staged inputs.
    fn run(&mut self) -> Result<()>;

    /// Copies the private result into the caller's output buffer.
    fn post_processing(&mut self) -> Result<()>;

    /// Current lifecycle state.
    fn phase(&self) -> Phase;

    /// Short identifier used in reports.
    fn name(&self) -> &str;
}

/// A multiplication kernel a [`MatrixTask`] can execute.
pub trait Multiplier {
    fn multiply(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>>;

    fn name(&self) -> &'static str;
}

impl Multiplier for StrassenConfig {
    fn multiply(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        strassen_with(a, b, n, self)
    }

    fn name(&self) -> &'static str {
        "strassen"
    }
}

/// Triple-loop reference kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl Multiplier for Naive {
    fn multiply(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        let expected = element_count(n)?;
        for operand in [a, b] {
            if operand.len() != expected {
                return Err(dimension_mismatch(expected, operand.len()));
            }
        }
        Ok(naive_multiply(a, b, n))
    }

    fn name(&self) -> &'static str {
        "naive"
    }
}

/// Square matrix product task, generic over the kernel it runs.
#[derive(Debug)]
pub struct MatrixTask<'a, M> {
    data: TaskData<'a>,
    multiplier: M,
    phase: Phase,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    n: usize,
}

/// Task running the Strassen engine.
pub type StrassenTask<'a> = MatrixTask<'a, StrassenConfig>;

/// Task running the naive triple loop.
pub type NaiveTask<'a> = MatrixTask<'a, Naive>;

impl<'a> MatrixTask<'a, StrassenConfig> {
    pub fn new(data: TaskData<'a>) -> Self {
        Self::with_multiplier(data, StrassenConfig::default())
    }

    pub fn with_config(data: TaskData<'a>, config: StrassenConfig) -> Self {
        Self::with_multiplier(data, config)
    }
}

impl<'a> MatrixTask<'a, Naive> {
    pub fn new(data: TaskData<'a>) -> Self {
        Self::with_multiplier(data, Naive)
    }
}

impl<'a, M: Multiplier> MatrixTask<'a, M> {
    pub fn with_multiplier(data: TaskData<'a>, multiplier: M) -> Self {
        Self {
            data,
            multiplier,
            phase: Phase::Created,
            a: Vec::new(),
            b: Vec::new(),
            c: Vec::new(),
            n: 0,
        }
    }

    /// The privately held result of the last [`Task::run`].
    pub fn result(&self) -> &[f64] {
        &self.c
    }

    fn enter(&self, phase: &'static str, allowed: &[Phase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(phase_order(phase, self.phase))
        }
    }
}

impl<M: Multiplier> Task for MatrixTask<'_, M> {
    fn validation(&mut self) -> bool {
        if self.enter("validation", &[Phase::Created, Phase::Finished, Phase::Rejected]).is_err() {
            tracing::warn!(state = ?self.phase, "validation requested mid-lifecycle");
            return false;
        }

        let [count_a, count_b] = self.data.inputs_count();
        let [count_out] = self.data.outputs_count();
        let ok = count_a == count_b && count_a == count_out;

        if ok {
            self.phase = Phase::Validated;
        } else {
            tracing::warn!(count_a, count_b, count_out, "task bundle rejected");
            self.phase = Phase::Rejected;
        }
        ok
    }

    fn pre_processing(&mut self) -> Result<()> {
        self.enter("pre_processing", &[Phase::Validated])?;

        self.a.clear();
        self.a.extend_from_slice(self.data.a);
        self.b.clear();
        self.b.extend_from_slice(self.data.b);
        self.n = self.data.n;

        self.phase = Phase::Staged;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.enter("run", &[Phase::Staged, Phase::Executed])?;

        self.c = self.multiplier.multiply(&self.a, &self.b, self.n)?;

        self.phase = Phase::Executed;
        Ok(())
    }

    fn post_processing(&mut self) -> Result<()> {
        self.enter("post_processing", &[Phase::Executed])?;

        let [count] = self.data.outputs_count();
        if self.c.len() != count {
            return Err(dimension_mismatch(count, self.c.len()));
        }
        self.data.output.copy_from_slice(&self.c);

        self.phase = Phase::Finished;
        Ok(())
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn name(&self) -> &str {
        self.multiplier.name()
    }
}
