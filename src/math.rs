//! Matrix aliases and column helpers for per-integration-point storage

use nalgebra::DMatrix;

pub type Mat = DMatrix<f64>;

/// Components of a full (non-symmetric) stress or strain tensor
pub const TENSOR_COMPONENTS: usize = 9;

/// Components of the symmetric back-stress tensor
pub const BACK_STRESS_COMPONENTS: usize = 6;

/// Overwrite column `col` of `dst` with the same column of `src`.
///
/// Only the rows both matrices share are touched.
pub fn copy_column(dst: &mut Mat, src: &Mat, col: usize) {
    let rows = dst.nrows().min(src.nrows());
    for row in 0..rows {
        dst[(row, col)] = src[(row, col)];
    }
}

/// Add column `col` of `src` into the same column of `dst`.
pub fn accumulate_column(dst: &mut Mat, src: &Mat, col: usize) {
    let rows = dst.nrows().min(src.nrows());
    for row in 0..rows {
        dst[(row, col)] += src[(row, col)];
    }
}
