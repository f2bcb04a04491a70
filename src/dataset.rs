//! Leaf dataset writing, reading, and verification.
//!
//! A leaf is a one-dimensional array of `dsize` doubles written (and read)
//! in a single call. Three layouts are used: compact for small datasets,
//! contiguous when forced or at 8192 doubles and beyond (the compact message
//! limit), and a single shuffled+deflated chunk when compression is
//! requested.
//!
//! The value buffers are allocated once on first use and reused for every
//! leaf; [`LeafIo::release`] drops them at the end of the run. Deterministic
//! values follow `idx + p * 1e-8`. Noise mode fills a double-length buffer
//! from a fixed-seed generator once and writes each dataset from a fresh
//! random starting offset, simulating varying content without regenerating
//! randomness per leaf.

use hdf5::plist::dataset_create::Layout;
use hdf5::Group;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{RunConfig, RunMode};
use crate::error::Result;
use crate::stats::RunStats;
use crate::stopwatch::Stopwatch;

/// Seed for the noise generator; fixed so that runs are reproducible.
const NOISE_SEED: u64 = 0xDEAD_BEEF;

/// Datasets at or above this many doubles never use the compact layout.
const COMPACT_LIMIT: usize = 8192;

/// Deterministic name of the `idx`-th leaf dataset in its group.
pub fn leaf_name(idx: u64) -> String {
    format!("doubles_{idx:08}")
}

/// Fill `buf` with the deterministic value pattern for leaf `idx`.
pub fn fill_values(buf: &mut [f64], idx: u64) {
    for (p, value) in buf.iter_mut().enumerate() {
        *value = idx as f64 + p as f64 * 1e-8;
    }
}

/// Generate the shared noise buffer: `2 * dsize` pseudo-random values from a
/// fixed-seed generator combining two bounded ratios and a sine term.
pub fn noise_buffer(dsize: usize, noise: u64, rng: &mut StdRng) -> Vec<f64> {
    let mut buf = Vec::with_capacity(2 * dsize);
    for _ in 0..2 * dsize {
        let a = rng.gen_range(0..noise) as f64;
        let b = rng.gen_range(0..noise) as f64 + 1.0;
        let c = rng.gen_range(0..100_000) as f64;
        let d = rng.gen_range(0..100_000) as f64;
        buf.push(a / b * (2.0 * std::f64::consts::PI * c / d).sin());
    }
    buf
}

/// Reusable leaf I/O state: the write buffer, the read-back buffer, and the
/// offset generator for noise mode.
pub struct LeafIo {
    dsize: usize,
    zip: u8,
    contig: bool,
    noise: u64,
    mode: RunMode,
    write_buf: Option<Vec<f64>>,
    read_buf: Option<Vec<f64>>,
    rng: StdRng,
}

impl LeafIo {
    /// Capture the leaf-relevant knobs; buffers stay unallocated until the
    /// first leaf operation.
    pub fn new(cfg: &RunConfig) -> Self {
        Self {
            dsize: cfg.dsize,
            zip: cfg.zip,
            contig: cfg.contig,
            noise: cfg.noise,
            mode: cfg.mode,
            write_buf: None,
            read_buf: None,
            rng: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    /// Write the `idx`-th leaf under `parent`, timing the write itself.
    pub fn write(
        &mut self,
        idx: u64,
        parent: &Group,
        stats: &mut RunStats,
        clock: &Stopwatch,
    ) -> Result<()> {
        self.ensure_write_buf();
        if self.noise == 0 {
            if let Some(buf) = self.write_buf.as_mut() {
                fill_values(buf, idx);
            }
        }
        let offset = if self.noise > 0 && self.dsize > 0 {
            self.rng.gen_range(0..self.dsize)
        } else {
            0
        };

        let name = leaf_name(idx);
        let ds = if self.zip > 0 {
            parent
                .new_dataset::<f64>()
                .shape(self.dsize)
                .chunk(self.dsize)
                .shuffle()
                .deflate(self.zip)
                .create(name.as_str())?
        } else if self.contig || self.dsize >= COMPACT_LIMIT {
            parent
                .new_dataset::<f64>()
                .shape(self.dsize)
                .layout(Layout::Contiguous)
                .create(name.as_str())?
        } else {
            parent
                .new_dataset::<f64>()
                .shape(self.dsize)
                .layout(Layout::Compact)
                .create(name.as_str())?
        };

        let Some(buf) = self.write_buf.as_ref() else {
            return Ok(());
        };
        let payload = &buf[offset..offset + self.dsize];

        let start = clock.elapsed();
        ds.write(payload)?;
        drop(ds);
        stats.io_secs += clock.elapsed() - start;
        stats.datasets += 1;
        Ok(())
    }

    /// Read the `idx`-th leaf under `parent` back, optionally verifying its
    /// values. Open and read failures are tolerated; under verification they
    /// count as mismatches naming the dataset and its parent path.
    pub fn read(
        &mut self,
        idx: u64,
        parent: Option<&Group>,
        parent_path: &str,
        stats: &mut RunStats,
        clock: &Stopwatch,
    ) -> Result<()> {
        self.ensure_write_buf();
        if self.noise == 0 && self.mode.verifies() {
            if let Some(buf) = self.write_buf.as_mut() {
                fill_values(buf, idx);
            }
        }

        let name = leaf_name(idx);
        match parent.and_then(|p| p.dataset(&name).ok()) {
            Some(ds) => {
                let start = clock.elapsed();
                let outcome = ds.read_raw::<f64>();
                stats.io_secs += clock.elapsed() - start;
                match outcome {
                    Ok(values) => {
                        if self.mode.verifies() && !self.matches_expected(&values) {
                            report_failure(&name, parent_path, stats);
                        }
                        // keep the allocation around for the next read
                        self.read_buf = Some(values);
                    }
                    Err(_) => {
                        if self.mode.verifies() {
                            report_failure(&name, parent_path, stats);
                        }
                    }
                }
            }
            None => {
                if self.mode.verifies() {
                    report_failure(&name, parent_path, stats);
                }
            }
        }
        stats.datasets += 1;
        Ok(())
    }

    /// Release both reusable buffers. Safe when nothing was ever allocated,
    /// and safe to call again.
    pub fn release(&mut self) {
        self.write_buf = None;
        self.read_buf = None;
    }

    fn ensure_write_buf(&mut self) {
        if self.write_buf.is_none() {
            let buf = if self.noise > 0 {
                noise_buffer(self.dsize, self.noise, &mut self.rng)
            } else {
                vec![0.0; self.dsize]
            };
            self.write_buf = Some(buf);
        }
    }

    fn matches_expected(&self, values: &[f64]) -> bool {
        match self.write_buf.as_deref() {
            Some(buf) => values == &buf[..self.dsize.min(buf.len())],
            None => false,
        }
    }
}

fn report_failure(name: &str, parent_path: &str, stats: &mut RunStats) {
    println!("Verification failed on dataset \"{name}\" in dir \"{parent_path}\"");
    stats.verify_failures += 1;
}
