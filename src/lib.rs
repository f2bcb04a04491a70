//! # h5dirbench
//!
//! A serial HDF5 microbenchmark: builds (or re-reads) a 1 to 4 level deep
//! hierarchy of groups with double-precision datasets at the leaves, and
//! reports creation/write/read throughput. All datasets are written with a
//! single write call and read with a single read call; no partial I/O is
//! performed. The storage engineering itself (B-tree group indexing,
//! chunking, shuffle+deflate compression, the metadata cache) lives in
//! libhdf5; this crate is the harness that configures and drives it.
//!
//! ## Crate structure
//!
//! - **`config`**: `RunConfig` and the `key=value` argument parsing, plus
//!   the pre-run parameter dump.
//! - **`driver`**: the nested tree walk, periodic maintenance (flush,
//!   garbage collection, close+reopen), and report assembly.
//! - **`dataset`**: leaf writing/reading with layout selection and optional
//!   value verification.
//! - **`group`**: group creation/opening with `..` back-links.
//! - **`props`**: file creation/access property builders.
//! - **`progress`**: the ~5%-step progress reporter and rate extremes.
//! - **`raw`**: safe wrappers for `hdf5-sys` entry points the high-level
//!   crate does not cover.
//! - **`stats`**: running counters and the final `RunReport`.
//! - **`stopwatch`**: wall-clock timing.
//! - **`error`**: the `BenchError` type shared by all modules.

pub mod config;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod group;
pub mod progress;
pub mod props;
pub mod raw;
pub mod stats;
pub mod stopwatch;

pub use config::{RunConfig, RunMode};
pub use error::{BenchError, Result};
pub use stats::{RunReport, RunStats};
