//! Custom error types for the benchmark.
//!
//! This module defines the primary error type, `BenchError`, using the
//! `thiserror` crate. Library-level HDF5 failures and filesystem errors are
//! wrapped here and propagate with `?`; the binary converts them into an
//! `anyhow` diagnostic at the top level. Verification mismatches are *not*
//! errors: they are counted and reported, and the run continues.

use thiserror::Error;

/// Convenience alias for results using the benchmark error type.
pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum BenchError {
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A direct `hdf5-sys` call returned a negative status or identifier.
    #[error("{call} failed in the HDF5 library")]
    LowLevel { call: &'static str },
}
