//! Periodic progress reporting and min/max rate tracking.
//!
//! Fires roughly every 5% of the planned object count. The instantaneous
//! rate excludes measured dataset I/O time, so it tracks the metadata path
//! in isolation.

use hdf5::File;

use crate::raw;
use crate::stopwatch::Stopwatch;

/// Tracks the last reporting point and the observed rate extremes.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    last_n: u64,
    last_time: f64,
    last_io: f64,
    /// Smallest rate seen so far; zero until the first report fires.
    pub min_rate: f64,
    /// Largest rate seen so far; zero until the first report fires.
    pub max_rate: f64,
}

impl ProgressReporter {
    /// Fresh reporter with no observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress if `n` crossed a 5% boundary. No-op for tiny runs
    /// (`total < 20`) and before the second object.
    pub fn observe(
        &mut self,
        n: u64,
        total: u64,
        file: Option<&File>,
        io_secs: f64,
        clock: &Stopwatch,
    ) {
        if n < 2 || total < 20 {
            return;
        }
        let step = total / 20;
        if n % step != 0 || n == self.last_n {
            return;
        }

        let now = clock.elapsed();
        let dn = (n - self.last_n) as f64;
        let dt = now - self.last_time - (io_secs - self.last_io);
        let rate = dn / dt;

        print!(
            "{:3}% complete, dt={:.6} secs, rate = {:.6} objs/sec",
            100 * n / total,
            dt,
            rate
        );
        match file {
            Some(file) => println!(
                ", number of open objects is {}",
                raw::open_object_count(file)
            ),
            None => println!(),
        }

        if self.min_rate == 0.0 {
            self.min_rate = rate;
        }
        if self.max_rate == 0.0 {
            self.max_rate = rate;
        }
        if rate < self.min_rate {
            self.min_rate = rate;
        }
        if rate > self.max_rate {
            self.max_rate = rate;
        }

        self.last_n = n;
        self.last_time = now;
        self.last_io = io_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_below_thresholds() {
        let clock = Stopwatch::new();
        let mut progress = ProgressReporter::new();
        // tiny run: never fires regardless of n
        progress.observe(10, 19, None, 0.0, &clock);
        assert_eq!(progress.min_rate, 0.0);
        assert_eq!(progress.max_rate, 0.0);
        // big run but before the second object
        progress.observe(1, 100, None, 0.0, &clock);
        assert_eq!(progress.max_rate, 0.0);
    }

    #[test]
    fn seeds_min_and_max_on_first_report() {
        let clock = Stopwatch::new();
        let mut progress = ProgressReporter::new();
        progress.observe(2, 20, None, 0.0, &clock);
        assert!(progress.min_rate > 0.0);
        assert!(progress.max_rate >= progress.min_rate);
    }

    #[test]
    fn repeated_count_does_not_reset_the_extremes() {
        let clock = Stopwatch::new();
        let mut progress = ProgressReporter::new();
        progress.observe(2, 20, None, 0.0, &clock);
        let (min, max) = (progress.min_rate, progress.max_rate);
        // the same object count again, as happens at a group boundary
        progress.observe(2, 20, None, 0.0, &clock);
        assert_eq!(progress.min_rate, min);
        assert_eq!(progress.max_rate, max);
    }
}
