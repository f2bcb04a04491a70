//! Running counters and the final statistics report.
//!
//! `RunStats` is the mutable accumulator threaded through the driver and
//! mutated by the dataset writer/reader and the group builder. `RunReport`
//! is the immutable summary assembled once at the end of a run; tests assert
//! on it directly instead of scraping stdout.

use std::mem::size_of;

/// Running totals, mutated by every leaf and group operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    /// Groups created or opened so far.
    pub groups: u64,
    /// Datasets written or read so far.
    pub datasets: u64,
    /// Seconds spent inside dataset read/write calls.
    pub io_secs: f64,
    /// Verification mismatches observed (read-with-verify runs only).
    pub verify_failures: u64,
}

impl RunStats {
    /// Total objects touched so far.
    pub fn objects(&self) -> u64 {
        self.groups + self.datasets
    }
}

/// Final statistics for one benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Wall-clock seconds from main-loop start to after the file closed.
    pub total_secs: f64,
    /// Seconds spent inside dataset read/write calls.
    pub io_secs: f64,
    /// Total objects (groups plus datasets).
    pub objects: u64,
    /// Groups created or opened.
    pub groups: u64,
    /// Datasets written or read.
    pub datasets: u64,
    /// Verification mismatches.
    pub verify_failures: u64,
    /// Smallest instantaneous metadata rate observed by the reporter.
    pub min_rate: f64,
    /// Largest instantaneous metadata rate observed by the reporter.
    pub max_rate: f64,
    /// Size of the container file on disk.
    pub file_bytes: u64,
    /// Bytes of raw dataset payload written or read.
    pub raw_bytes: u64,
    /// Whether deflate compression was requested for this run.
    pub zip: bool,
}

impl RunReport {
    /// Seconds not attributable to dataset I/O (the metadata path).
    pub fn meta_secs(&self) -> f64 {
        self.total_secs - self.io_secs
    }

    /// File bytes not accounted for by raw dataset payload.
    pub fn other_bytes(&self) -> u64 {
        self.file_bytes.saturating_sub(self.raw_bytes)
    }

    /// True when compression was on and visibly effective: the raw payload
    /// alone outweighs the whole file.
    pub fn is_compressed(&self) -> bool {
        self.zip && self.raw_bytes > self.file_bytes
    }

    /// Raw-to-file size ratio, overheads included.
    pub fn compression_ratio(&self) -> f64 {
        self.raw_bytes as f64 / self.file_bytes as f64
    }

    /// Objects per second of metadata time.
    pub fn creation_rate(&self) -> f64 {
        self.objects as f64 / self.meta_secs()
    }

    /// Print the run summary in the benchmark's fixed output format.
    pub fn print(&self) {
        let meta = self.meta_secs();
        println!(
            "Total time = {:8.4} seconds, dataset write time = {:8.4}, other time = {:8.4} ({:4.2} % of tot) seconds",
            self.total_secs,
            self.io_secs,
            meta,
            meta / self.total_secs * 100.0
        );
        let ds_percent = if self.objects > 0 {
            self.datasets as f64 * 100.0 / self.objects as f64
        } else {
            0.0
        };
        println!(
            "Total objects = {}: {} dirs, {} datasets ({:4.2} % of tot)",
            self.objects, self.groups, self.datasets, ds_percent
        );
        println!(
            "Object creation rate = {:8.4} objs/sec, min={:8.4}, max={:8.4}, skew = {:4.2}",
            self.creation_rate(),
            self.min_rate,
            self.max_rate,
            self.max_rate / self.min_rate
        );
        if self.is_compressed() {
            println!(
                "File size = {} (compressed), overall zip ratio (w/overheads) = {:4.2} : 1",
                self.file_bytes,
                self.compression_ratio()
            );
        } else {
            let raw_percent = if self.file_bytes > 0 {
                100.0 * self.raw_bytes as f64 / self.file_bytes as f64
            } else {
                0.0
            };
            println!(
                "File size = {}, raw = {} ({:4.2} %), other = {} ({:4.2} %)",
                self.file_bytes,
                self.raw_bytes,
                raw_percent,
                self.other_bytes(),
                100.0 - raw_percent
            );
            if self.objects > 0 {
                println!(
                    "Average object overhead is ~{} bytes",
                    self.other_bytes() / self.objects
                );
            }
        }
    }
}

/// Bytes of raw payload for `datasets` datasets of `dsize` doubles each.
pub fn raw_payload_bytes(datasets: u64, dsize: usize) -> u64 {
    datasets * dsize as u64 * size_of::<f64>() as u64
}
