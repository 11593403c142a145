//! Core compute primitives.
//!
//! Covariance matrices and their Cholesky factors are stored as dense
//! row-major [`Matrix<f64>`]; points and means are plain `Vec<f64>`.

mod matrix;

pub use matrix::Matrix;
