//! Random operand generation for tests, benchmarks and the CLI.

use rand::Rng;

/// Lower bound (inclusive) of generated entries.
pub const RANDOM_MIN: f64 = 1.0;
/// Upper bound (exclusive) of generated entries.
pub const RANDOM_MAX: f64 = 5.0;

/// Generates an `n x n` row-major matrix with entries uniform in `[1.0, 5.0)`,
/// drawn from the thread-local generator.
pub fn generate_random_matrix(n: usize) -> Vec<f64> {
    generate_random_matrix_with(n, &mut rand::rng())
}

/// Same as [`generate_random_matrix`] but driven by a caller-supplied RNG, so
/// seeded generators give reproducible operands.
pub fn generate_random_matrix_with<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n * n)
        .map(|_| rng.random_range(RANDOM_MIN..RANDOM_MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_size_and_range() {
        let m = generate_random_matrix(16);
        assert_eq!(m.len(), 256);
        assert!(m.iter().all(|&v| (RANDOM_MIN..RANDOM_MAX).contains(&v)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_random_matrix_with(8, &mut StdRng::seed_from_u64(3));
        let b = generate_random_matrix_with(8, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_matrix() {
        assert!(generate_random_matrix(0).is_empty());
    }
}
