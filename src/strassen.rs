//! Recursive Strassen multiplication with Rayon fork-join fan-out.
//!
//! An `n x n` product is decomposed into seven `(n/2) x (n/2)` products plus
//! a handful of additions:
//!
//! ```text
//! P1 = (A11 + A22)(B11 + B22)      C11 = P1 + P4 - P5 + P7
//! P2 = (A21 + A22) B11             C12 = P3 + P5
//! P3 = A11 (B12 - B22)             C21 = P2 + P4
//! P4 = A22 (B21 - B11)             C22 = P1 - P2 + P3 + P6
//! P5 = (A11 + A12) B22
//! P6 = (A21 - A11)(B11 + B12)
//! P7 = (A12 - A22)(B21 + B22)
//! ```
//!
//! The seven products share nothing mutable: every branch reads the parent's
//! quadrants and writes only its own freshly allocated result. Above
//! [`StrassenConfig::parallel_threshold`] they are spawned into one
//! `rayon::scope`, which blocks until all seven have completed; below it the
//! recursion stays on the current thread.
//!
//! # Example
//!
//! ```rust
//! use strassen_task::strassen::strassen;
//!
//! let a = vec![1.0, 2.0, 3.0, 4.0];
//! let b = vec![5.0, 6.0, 7.0, 8.0];
//! let c = strassen(&a, &b, 2).unwrap();
//! assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
//! ```

use crate::{
    algebra::{add, join, naive_multiply, split, sub, Element},
    error::{dimension_mismatch, invalid_config, invalid_size, Result},
    LEAF_SIZE, PARALLEL_THRESHOLD,
};

/// How the seven sub-products of a recursion level are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Every product runs on the calling thread.
    Sequential,
    /// Products above the threshold are spawned on the Rayon pool.
    #[default]
    Rayon,
}

/// Tuning knobs for the Strassen engine.
///
/// None of these affect the mathematical result, only where the work runs and
/// where the recursion hands over to the triple loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrassenConfig {
    /// Scheduling strategy for the seven sub-products.
    pub parallelism: Parallelism,
    /// Levels with `n <= parallel_threshold` recurse sequentially.
    pub parallel_threshold: usize,
    /// Levels with `n <= leaf_size` use [`naive_multiply`]. Power of two, `>= 2`.
    pub leaf_size: usize,
}

impl Default for StrassenConfig {
    fn default() -> Self {
        Self {
            parallelism: Parallelism::Rayon,
            parallel_threshold: PARALLEL_THRESHOLD,
            leaf_size: LEAF_SIZE,
        }
    }
}

impl StrassenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallelism: Parallelism::Sequential,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Checks that the leaf size is a power of two no smaller than 2.
    pub fn validate(&self) -> Result<()> {
        if self.leaf_size < 2 || !self.leaf_size.is_power_of_two() {
            return Err(invalid_config(format!(
                "leaf_size must be a power of two >= 2, got {}",
                self.leaf_size
            )));
        }
        Ok(())
    }
}

/// Returns `true` when `n` is a usable Strassen dimension.
#[inline]
pub fn is_valid_size(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Number of elements in an `n x n` matrix.
///
/// # Errors
///
/// [`StrassenError::InvalidSize`](crate::StrassenError::InvalidSize) when
/// `n * n` does not fit in a `usize`.
#[inline]
pub fn element_count(n: usize) -> Result<usize> {
    n.checked_mul(n).ok_or_else(|| invalid_size(n))
}

/// Multiplies two `n x n` row-major matrices with the default configuration.
///
/// # Errors
///
/// * [`StrassenError::InvalidSize`](crate::StrassenError::InvalidSize) if `n`
///   is zero, not a power of two, or too large for `n * n` to fit in a
///   `usize`.
/// * [`StrassenError::DimensionMismatch`](crate::StrassenError::DimensionMismatch)
///   if either operand does not hold `n * n` elements.
pub fn strassen<T: Element>(a: &[T], b: &[T], n: usize) -> Result<Vec<T>> {
    strassen_with(a, b, n, &StrassenConfig::default())
}

/// Multiplies two `n x n` row-major matrices using `config`.
#[tracing::instrument(level = "debug", skip(a, b, config), fields(parallelism = ?config.parallelism))]
pub fn strassen_with<T: Element>(
    a: &[T],
    b: &[T],
    n: usize,
    config: &StrassenConfig,
) -> Result<Vec<T>> {
    if !is_valid_size(n) {
        return Err(invalid_size(n));
    }
    config.validate()?;

    let expected = element_count(n)?;
    for operand in [a, b] {
        if operand.len() != expected {
            return Err(dimension_mismatch(expected, operand.len()));
        }
    }

    tracing::debug!(
        threshold = config.parallel_threshold,
        leaf_size = config.leaf_size,
        "starting strassen recursion"
    );

    Ok(recurse(a, b, n, config))
}

/// Borrowed quadrants of both operands at one recursion level.
struct Quadrants<'q, T> {
    a11: &'q [T],
    a12: &'q [T],
    a21: &'q [T],
    a22: &'q [T],
    b11: &'q [T],
    b12: &'q [T],
    b21: &'q [T],
    b22: &'q [T],
}

fn recurse<T: Element>(a: &[T], b: &[T], n: usize, config: &StrassenConfig) -> Vec<T> {
    if n <= config.leaf_size {
        return naive_multiply(a, b, n);
    }

    let half = n / 2;

    let (a11, a12, a21, a22) = split(a);
    let (b11, b12, b21, b22) = split(b);
    let quads = Quadrants {
        a11: &a11,
        a12: &a12,
        a21: &a21,
        a22: &a22,
        b11: &b11,
        b12: &b12,
        b21: &b21,
        b22: &b22,
    };

    let parallel = config.parallelism == Parallelism::Rayon && n > config.parallel_threshold;

    let [p1, p2, p3, p4, p5, p6, p7] = if parallel {
        let mut products: [Vec<T>; 7] = Default::default();
        let quads = &quads;
        let slots = products.iter_mut().enumerate();
        rayon::scope(move |s| {
            for (k, slot) in slots {
                s.spawn(move |_| *slot = product(k, quads, half, config));
            }
        });
        products
    } else {
        std::array::from_fn(|k| product(k, &quads, half, config))
    };

    let c11 = add(&add(&p1, &p4), &sub(&p7, &p5));
    let c12 = add(&p3, &p5);
    let c21 = add(&p2, &p4);
    let c22 = add(&sub(&p1, &p2), &add(&p3, &p6));

    join(&c11, &c12, &c21, &c22, n)
}

/// Computes the `k`-th Strassen product (`P{k+1}`) of one recursion level.
fn product<T: Element>(
    k: usize,
    q: &Quadrants<'_, T>,
    half: usize,
    config: &StrassenConfig,
) -> Vec<T> {
    match k {
        0 => recurse(&add(q.a11, q.a22), &add(q.b11, q.b22), half, config),
        1 => recurse(&add(q.a21, q.a22), q.b11, half, config),
        2 => recurse(q.a11, &sub(q.b12, q.b22), half, config),
        3 => recurse(q.a22, &sub(q.b21, q.b11), half, config),
        4 => recurse(&add(q.a11, q.a12), q.b22, half, config),
        5 => recurse(&sub(q.a21, q.a11), &add(q.b11, q.b12), half, config),
        _ => recurse(&sub(q.a12, q.a22), &add(q.b21, q.b22), half, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::max_abs_diff;
    use crate::generate::generate_random_matrix_with;
    use crate::StrassenError;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_identity_base_case() {
        let identity = vec![1.0, 0.0, 0.0, 1.0];
        let c = strassen(&identity, &identity, 2).unwrap();
        assert_eq!(c, identity);
        assert_eq!(c, naive_multiply(&identity, &identity, 2));
    }

    #[test]
    fn test_one_by_one() {
        assert_eq!(strassen(&[3.0], &[4.0], 1).unwrap(), vec![12.0]);
    }

    #[test]
    fn test_sequential_integers_exact() {
        let a: Vec<f64> = (1..=16).map(|v| v as f64).collect();
        let expected = vec![
            90.0, 100.0, 110.0, 120.0, //
            202.0, 228.0, 254.0, 280.0, //
            314.0, 356.0, 398.0, 440.0, //
            426.0, 484.0, 542.0, 600.0,
        ];

        assert_eq!(strassen(&a, &a, 4).unwrap(), expected);
        assert_eq!(naive_multiply(&a, &a, 4), expected);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        let a = vec![1.0; 64];
        for n in [0usize, 3, 5, 6, 7, 12] {
            assert_eq!(
                strassen(&a, &a, n),
                Err(StrassenError::InvalidSize { n }),
                "n = {n} should be rejected"
            );
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0; 16];
        let b = vec![1.0; 15];
        assert_eq!(
            strassen(&a, &b, 4),
            Err(StrassenError::DimensionMismatch {
                expected: 16,
                got: 15
            })
        );
    }

    #[test]
    fn test_overflowing_dimension_rejected() {
        let n = 1usize << (usize::BITS / 2 + 1);
        assert!(is_valid_size(n));
        assert_eq!(element_count(n), Err(StrassenError::InvalidSize { n }));

        let a = vec![1.0; 4];
        assert_eq!(strassen(&a, &a, n), Err(StrassenError::InvalidSize { n }));
        assert_eq!(
            strassen_with(&a, &a, n, &StrassenConfig::sequential()),
            Err(StrassenError::InvalidSize { n })
        );
    }

    #[test]
    fn test_invalid_leaf_size() {
        let a = vec![1.0; 16];
        let config = StrassenConfig::default().with_leaf_size(3);
        assert!(matches!(
            strassen_with(&a, &a, 4, &config),
            Err(StrassenError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_matches_naive_for_powers_of_two() {
        let mut rng = StdRng::seed_from_u64(42);
        for k in 1..=6 {
            let n = 1usize << k;
            let a = generate_random_matrix_with(n, &mut rng);
            let b = generate_random_matrix_with(n, &mut rng);

            let c = strassen(&a, &b, n).unwrap();
            let reference = naive_multiply(&a, &b, n);

            let diff = max_abs_diff(&c, &reference);
            assert!(diff < 1e-6, "n = {n}: max abs diff {diff:.3e}");
        }
    }

    #[test]
    fn test_parallel_and_sequential_are_bit_identical() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 64;
        let a = generate_random_matrix_with(n, &mut rng);
        let b = generate_random_matrix_with(n, &mut rng);

        let parallel = StrassenConfig::default().with_parallel_threshold(4);
        let sequential = StrassenConfig::sequential();

        assert_eq!(
            strassen_with(&a, &b, n, &parallel).unwrap(),
            strassen_with(&a, &b, n, &sequential).unwrap()
        );
    }

    #[test]
    fn test_leaf_size_variants_agree() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 32;
        let a = generate_random_matrix_with(n, &mut rng);
        let b = generate_random_matrix_with(n, &mut rng);
        let reference = naive_multiply(&a, &b, n);

        for leaf_size in [2usize, 4, 8, 16, 32, 64] {
            let config = StrassenConfig::default().with_leaf_size(leaf_size);
            let c = strassen_with(&a, &b, n, &config).unwrap();
            assert!(max_abs_diff(&c, &reference) < 1e-6, "leaf_size = {leaf_size}");
        }
    }

    #[test]
    fn test_integer_elements_exact() {
        let n = 8;
        let a: Vec<i64> = (0..(n * n) as i64).map(|v| v % 7 - 3).collect();
        let b: Vec<i64> = (0..(n * n) as i64).map(|v| (v * 5) % 11 - 5).collect();

        assert_eq!(strassen(&a, &b, n).unwrap(), naive_multiply(&a, &b, n));
    }
}
