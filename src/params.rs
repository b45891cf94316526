//! Tuning constants shared by the kernels and decompositions.
//!
//! Thresholds are element counts. Below them every loop runs on the calling
//! thread with vectorized inner loops; at or above them the outer loop is
//! split across the rayon pool (when the `rayon` feature is enabled).

/// Panel width for the blocked Cholesky and PLU factorizations.
pub const BLOCK_SIZE: usize = 64;

/// Length beyond which one-dimensional reductions (dot) go parallel.
///
/// Unlike the quadratic threshold this comparison is strict.
pub const LINEAR_PAR_THRESHOLD: usize = 500_000;

/// `rows * cols` at which GEMV, GER and outer products go parallel.
pub const QUADRATIC_PAR_THRESHOLD: usize = 500 * 500;

/// Pivot magnitudes at or below this are treated as zero by PLU.
pub const PIVOT_TOLERANCE: f64 = 1e-9;

/// Default absolute tolerance for symmetry checks and `loosely_equal`.
pub const EPSILON: f64 = 1e-6;

/// Cholesky parallelizes its trailing update above this order.
pub const CHOLESKY_PAR_ORDER: usize = 1000;

/// PLU eliminates panel rows in parallel above this many remaining rows.
pub const PLU_PANEL_PAR_ROWS: usize = 256;

/// PLU runs the U12 solve and trailing update in parallel above this
/// many trailing rows/columns.
pub const PLU_TRAILING_PAR: usize = 128;

/// PLU extracts U in parallel above this order.
pub const PLU_EXTRACT_PAR_ORDER: usize = 256;

/// `m * n * p` at which dense matrix products split their output rows.
pub const CUBIC_PAR_THRESHOLD: usize = 64 * 64 * 64;

/// Element count at which `transposed` fills output rows in parallel.
pub const TRANSPOSE_PAR_THRESHOLD: usize = 100 * 100;
