//! Dense matrix algebra on flat row-major buffers.
//!
//! Every matrix handled here is a square `n x n` matrix stored row-major in a
//! contiguous slice of length `n * n`. The helpers are pure: they never mutate
//! their inputs and always return a freshly allocated buffer, which is what
//! lets the Strassen recursion hand each branch data it exclusively owns.

use num::{Num, ToPrimitive};

/// Scalar types the algebra and the Strassen engine operate on.
///
/// Blanket-implemented for every `Copy` numeric type that can cross thread
/// boundaries, so `f64`, `f32` and the integer types all qualify.
pub trait Element: Num + Copy + Send + Sync {}

impl<T: Num + Copy + Send + Sync> Element for T {}

/// Elementwise `a + b`.
///
/// Both slices must have the same length; every call site derives its
/// operands from the same split, so this is only checked in debug builds.
#[inline]
pub fn add<T: Element>(a: &[T], b: &[T]) -> Vec<T> {
    debug_assert_eq!(a.len(), b.len(), "Matrices must be the same length");

    a.iter().zip(b.iter()).map(|(&x, &y)| x + y).collect()
}

/// Elementwise `a - b`.
#[inline]
pub fn sub<T: Element>(a: &[T], b: &[T]) -> Vec<T> {
    debug_assert_eq!(a.len(), b.len(), "Matrices must be the same length");

    a.iter().zip(b.iter()).map(|(&x, &y)| x - y).collect()
}

/// Side length of a square row-major buffer.
#[inline]
pub fn side(len: usize) -> usize {
    (len as f64).sqrt() as usize
}

/// Partitions an `n x n` matrix (`n` even) into its four quadrants.
///
/// Returns `(A11, A12, A21, A22)` where
///
/// * `A11` = rows `[0, n/2)`, cols `[0, n/2)`
/// * `A12` = rows `[0, n/2)`, cols `[n/2, n)`
/// * `A21` = rows `[n/2, n)`, cols `[0, n/2)`
/// * `A22` = rows `[n/2, n)`, cols `[n/2, n)`
///
/// The dimension is recovered from `a.len()`.
pub fn split<T: Element>(a: &[T]) -> (Vec<T>, Vec<T>, Vec<T>, Vec<T>) {
    let n = side(a.len());
    if n == 0 {
        return (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    }
    let half = n / 2;
    let quadrant = half * half;

    let mut a11 = Vec::with_capacity(quadrant);
    let mut a12 = Vec::with_capacity(quadrant);
    let mut a21 = Vec::with_capacity(quadrant);
    let mut a22 = Vec::with_capacity(quadrant);

    for (i, row) in a.chunks_exact(n).enumerate() {
        let (left, right) = row.split_at(half);
        if i < half {
            a11.extend_from_slice(left);
            a12.extend_from_slice(right);
        } else {
            a21.extend_from_slice(left);
            a22.extend_from_slice(right);
        }
    }

    (a11, a12, a21, a22)
}

/// Reassembles four `(n/2) x (n/2)` quadrants into one `n x n` matrix.
///
/// Inverse of [`split`]. The output starts zeroed and each cell is written
/// exactly once.
pub fn join<T: Element>(a11: &[T], a12: &[T], a21: &[T], a22: &[T], n: usize) -> Vec<T> {
    let half = n / 2;
    let mut a = vec![T::zero(); n * n];

    for i in 0..half {
        let top = i * n;
        let bottom = (i + half) * n;
        let src = i * half..(i + 1) * half;

        a[top..top + half].copy_from_slice(&a11[src.clone()]);
        a[top + half..top + n].copy_from_slice(&a12[src.clone()]);
        a[bottom..bottom + half].copy_from_slice(&a21[src.clone()]);
        a[bottom + half..bottom + n].copy_from_slice(&a22[src]);
    }

    a
}

/// Reference triple-loop product `C[i][j] = sum_k A[i][k] * B[k][j]`.
///
/// Serves both as the Strassen base case and as an independent correctness
/// oracle. Returns an empty matrix when `n == 0`.
#[allow(clippy::needless_range_loop)]
pub fn naive_multiply<T: Element>(a: &[T], b: &[T], n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }

    let mut c = vec![T::zero(); n * n];

    for i in 0..n {
        for j in 0..n {
            let mut acc = T::zero();
            for k in 0..n {
                acc = acc + a[i * n + k] * b[k * n + j];
            }
            c[i * n + j] = acc;
        }
    }

    c
}

/// Largest absolute elementwise difference between two matrices.
///
/// Elements that cannot be represented as `f64` count as `f64::INFINITY`, as
/// do matrices of different lengths.
pub fn max_abs_diff<T: Element + ToPrimitive>(a: &[T], b: &[T]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x.to_f64(), y.to_f64()) {
            (Some(x), Some(y)) => (x - y).abs(),
            _ => f64::INFINITY,
        })
        .fold(0.0, f64::max)
}
