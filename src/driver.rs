//! The benchmark driver: opens the container file, walks the configured
//! tree, triggers periodic maintenance, and assembles the final report.
//!
//! The walk mirrors the tree shape directly: every level iterates its
//! fan-out; inner levels create or open a group and recurse, the deepest
//! active level writes or reads a leaf dataset. Each group handle is owned
//! by the loop frame that opened it and dropped before that iteration's
//! maintenance checks run. The file handle lives for the whole run, except
//! that the `closef` interval replaces it in place with a reopened one;
//! handles created under the old file stay valid because the library keeps
//! the file alive until they close.

use std::mem;

use hdf5::File;
use log::debug;

use crate::config::RunConfig;
use crate::dataset::LeafIo;
use crate::error::Result;
use crate::group;
use crate::progress::ProgressReporter;
use crate::props;
use crate::raw;
use crate::stats::{raw_payload_bytes, RunReport, RunStats};
use crate::stopwatch::Stopwatch;

/// Execute one full benchmark run and return its statistics. Progress lines
/// and verification failures print as the run goes; the caller prints the
/// final report.
pub fn run(cfg: &RunConfig) -> Result<RunReport> {
    if cfg.dontae && raw::dont_atexit().is_err() {
        // only possible once the library is already initialized; the
        // opt-out simply has no effect then
        debug!("atexit opt-out ignored by the library");
    }
    if cfg.freelim > 0 {
        let limit = 1i32.checked_shl(cfg.freelim).unwrap_or(i32::MAX);
        raw::set_free_list_limits(limit)?;
    }

    let file = open_file(cfg)?;
    let root = file.group("/")?;

    let mut bench = Bench {
        cfg,
        stats: RunStats::default(),
        leaf: LeafIo::new(cfg),
        progress: ProgressReporter::new(),
        clock: Stopwatch::new(),
        file: Some(file),
        total: cfg.total_objects(),
    };
    bench.descend(0, Some(&root), "/")?;
    drop(root);
    bench.finish()
}

fn open_file(cfg: &RunConfig) -> Result<File> {
    let fapl = props::file_access_props(cfg)?;
    let mut builder = File::with_options();
    builder.set_access_plist(&fapl);

    if cfg.mode.is_read() {
        Ok(builder.open(&cfg.filename)?)
    } else {
        let fcpl = props::file_create_props(cfg)?;
        builder.set_create_plist(&fcpl);
        let file = builder.create(&cfg.filename)?;
        file.link_soft("/", "..")?;
        Ok(file)
    }
}

struct Bench<'a> {
    cfg: &'a RunConfig,
    stats: RunStats,
    leaf: LeafIo,
    progress: ProgressReporter,
    clock: Stopwatch,
    file: Option<File>,
    total: u64,
}

impl Bench<'_> {
    fn descend(
        &mut self,
        level: usize,
        parent: Option<&hdf5::Group>,
        parent_path: &str,
    ) -> Result<()> {
        let is_leaf_level = level + 1 >= self.cfg.depth();
        for idx in 0..self.cfg.fanout[level] {
            if is_leaf_level {
                if self.cfg.mode.is_read() {
                    self.leaf
                        .read(idx, parent, parent_path, &mut self.stats, &self.clock)?;
                } else if let Some(parent) = parent {
                    self.leaf.write(idx, parent, &mut self.stats, &self.clock)?;
                }
            } else {
                let (child, child_path) = group::create_or_open(
                    parent,
                    idx,
                    level + 1,
                    self.cfg,
                    parent_path,
                    &mut self.stats,
                )?;
                self.descend(level + 1, child.as_ref(), &child_path)?;
                drop(child);
            }
            self.object_boundary()?;
        }
        Ok(())
    }

    /// Maintenance and reporting after every completed loop iteration at
    /// every level, gated on the current object count.
    fn object_boundary(&mut self) -> Result<()> {
        let n = self.stats.objects();
        if interval_hit(self.cfg.flush, n) {
            debug!("flushing file at {n} objects");
            if let Some(file) = &self.file {
                raw::flush_global(file)?;
            }
        }
        if interval_hit(self.cfg.gc, n) {
            debug!("garbage collecting at {n} objects");
            raw::garbage_collect()?;
        }
        if interval_hit(self.cfg.closef, n) {
            debug!("closing and reopening file at {n} objects");
            if let Some(file) = self.file.take() {
                self.file = Some(props::reopen_file(file, self.cfg)?);
            }
        }
        self.progress.observe(
            n,
            self.total,
            self.file.as_ref(),
            self.stats.io_secs,
            &self.clock,
        );
        Ok(())
    }

    fn finish(mut self) -> Result<RunReport> {
        self.leaf.release();

        if let Some(file) = &self.file {
            println!(
                "Upon close, number of open objects is {}",
                raw::open_object_count(file)
            );
            if self.cfg.flush > 0 {
                raw::flush_global(file)?;
            }
        }
        if self.cfg.gc > 0 {
            raw::garbage_collect()?;
        }

        match self.file.take() {
            // leak the handle on purpose: `dontae` runs want no cleanup
            Some(file) if self.cfg.dontae => mem::forget(file),
            Some(file) => drop(file),
            None => {}
        }

        let total_secs = self.clock.elapsed();
        let file_bytes = std::fs::metadata(&self.cfg.filename)?.len();

        Ok(RunReport {
            total_secs,
            io_secs: self.stats.io_secs,
            objects: self.stats.objects(),
            groups: self.stats.groups,
            datasets: self.stats.datasets,
            verify_failures: self.stats.verify_failures,
            min_rate: self.progress.min_rate,
            max_rate: self.progress.max_rate,
            file_bytes,
            raw_bytes: raw_payload_bytes(self.stats.datasets, self.cfg.dsize),
            zip: self.cfg.zip > 0,
        })
    }
}

fn interval_hit(interval: u64, n: u64) -> bool {
    interval > 0 && n > 0 && n % interval == 0
}
