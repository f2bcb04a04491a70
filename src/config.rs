//! Run configuration: `key=value` argument parsing and the parameter dump.
//!
//! All knobs are optional `key=value` tokens (for example `nd=50,10`,
//! `dsize=250`, `zip=6`). Unknown tokens are collected and reported by the
//! caller rather than failing the run; empty tokens are skipped silently.
//! The resolved configuration is immutable for the whole run.

use std::path::PathBuf;

/// Name of the container file created or opened in the working directory.
pub const DEFAULT_FILENAME: &str = "test-hdf5-dirs.h5";

/// Link estimates passed to the library are capped at this many entries.
const MAX_LINK_ESTIMATE: u64 = 65_535;

/// What a run does with the tree: build it, re-read it, or re-read and
/// compare every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Create the file and write the tree (`doread=0`).
    #[default]
    Write,
    /// Re-read an existing file (`doread=1`).
    Read,
    /// Re-read and verify every dataset value (`doread=2`).
    Verify,
}

impl RunMode {
    /// True for both plain-read and verifying runs.
    pub fn is_read(self) -> bool {
        !matches!(self, Self::Write)
    }

    /// True when read-back values must be compared.
    pub fn verifies(self) -> bool {
        matches!(self, Self::Verify)
    }

    fn from_knob(value: u64) -> Self {
        match value {
            0 => Self::Write,
            1 => Self::Read,
            _ => Self::Verify,
        }
    }

    fn as_knob(self) -> u64 {
        match self {
            Self::Write => 0,
            Self::Read => 1,
            Self::Verify => 2,
        }
    }
}

/// The parsed set of benchmark knobs. See the module docs for the CLI form.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Per-level fan-out (`nd=a,b,c,d`). Levels after the first zero are
    /// inactive.
    pub fanout: [u64; 4],
    /// Doubles per dataset (`dsize`).
    pub dsize: usize,
    /// Force contiguous dataset layout (`contig`).
    pub contig: bool,
    /// Deflate level, 0 disables compression (`zip`).
    pub zip: u8,
    /// Modulus for pseudo-random values, 0 selects deterministic values
    /// (`noise`).
    pub noise: u64,
    /// Write, read, or read-and-verify (`doread`).
    pub mode: RunMode,
    /// Average link-name-length hint for link-count estimation, 0 disables
    /// (`estlink`).
    pub estlink: u32,
    /// Restrict the file to the earliest compatible format version
    /// (`compat`).
    pub compat: bool,
    /// Fixed metadata cache size in bytes, 0 keeps the library default
    /// (`cache`).
    pub cache: usize,
    /// Set the library free-list limits to `1 << freelim` (`freelim`).
    pub freelim: u32,
    /// Garbage-collect every this many objects (`gc`).
    pub gc: u64,
    /// Flush the file every this many objects (`flush`).
    pub flush: u64,
    /// Close and reopen the file every this many objects (`closef`).
    pub closef: u64,
    /// Skip library and file cleanup at exit (`dontae`).
    pub dontae: bool,
    /// Container file path; the CLI always uses [`DEFAULT_FILENAME`].
    pub filename: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fanout: [1000, 0, 0, 0],
            dsize: 1,
            contig: false,
            zip: 0,
            noise: 0,
            mode: RunMode::Write,
            estlink: 0,
            compat: false,
            cache: 0,
            freelim: 0,
            gc: 0,
            flush: 0,
            closef: 0,
            dontae: false,
            filename: PathBuf::from(DEFAULT_FILENAME),
        }
    }
}

impl RunConfig {
    /// Parse `key=value` tokens. Returns the configuration together with the
    /// tokens that were not recognized; the caller decides how to report
    /// them. Empty tokens are skipped without comment.
    pub fn from_args<I, S>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::default();
        let mut ignored = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if arg.is_empty() {
                continue;
            }
            let Some((key, value)) = arg.split_once('=') else {
                ignored.push(arg.to_string());
                continue;
            };
            match key {
                "nd" => cfg.set_fanout(value),
                "dsize" => cfg.dsize = num(value) as usize,
                "contig" => cfg.contig = num(value) != 0,
                "zip" => cfg.zip = num(value) as u8,
                "noise" => cfg.noise = num(value),
                "doread" => cfg.mode = RunMode::from_knob(num(value)),
                "estlink" => cfg.estlink = num(value) as u32,
                "compat" => cfg.compat = num(value) != 0,
                "cache" => cfg.cache = num(value) as usize,
                "freelim" => cfg.freelim = num(value) as u32,
                "gc" => cfg.gc = num(value),
                "flush" => cfg.flush = num(value),
                "closef" => cfg.closef = num(value),
                "dontae" => cfg.dontae = num(value) != 0,
                _ => ignored.push(arg.to_string()),
            }
        }

        (cfg, ignored)
    }

    fn set_fanout(&mut self, value: &str) {
        self.fanout = [0; 4];
        for (slot, part) in self.fanout.iter_mut().zip(value.split(',')) {
            *slot = num(part);
        }
    }

    /// Number of active tree levels: the fan-out list truncated at its first
    /// zero. Level 0 is always active (a zero `nd` just runs zero
    /// iterations).
    pub fn depth(&self) -> usize {
        for level in 1..4 {
            if self.fanout[level] == 0 {
                return level;
            }
        }
        4
    }

    /// Total planned objects: the sum of per-level fan-out products over the
    /// active levels.
    pub fn total_objects(&self) -> u64 {
        let mut product = self.fanout[0];
        let mut total = product;
        for level in 1..self.depth() {
            product *= self.fanout[level];
            total += product;
        }
        total
    }

    /// Estimated link count for containers whose children come from the
    /// given level's fan-out, capped the way the library expects.
    pub fn est_links(&self, level: usize) -> u32 {
        self.fanout[level].min(MAX_LINK_ESTIMATE) as u32
    }

    /// Print every resolved parameter before the run starts.
    pub fn print_parameters(&self) {
        println!("Creates a 1, 2, 3, or 4 level dir hierarchy with datasets at the bottom");
        println!("Test parameters...");
        dump("doread", self.mode.as_knob(), "do a read instead of a write test");
        dump("nd0", self.fanout[0], "level 0 dir|dataset count");
        dump("nd1", self.fanout[1], "level 1 dir|dataset count");
        dump("nd2", self.fanout[2], "level 2 dir|dataset count");
        dump("nd3", self.fanout[3], "level 3 dataset count");
        dump("dsize", self.dsize as u64, "dataset size in # doubles");
        dump("estlink", u64::from(self.estlink), "turn on link count estimation");
        dump("maxlink", u64::from(self.est_links(0)), "computed value");
        dump("maxlink1", u64::from(self.est_links(1)), "computed value");
        dump("maxlink2", u64::from(self.est_links(2)), "computed value");
        dump("compat", self.compat.into(), "turn on earliest libver compatibility");
        dump("zip", u64::from(self.zip), "turn on dataset compression");
        dump("noise", self.noise, "turn on dataset value randomizing");
        dump("gc", self.gc, "call garbage collect after every <gc> objects");
        dump("flush", self.flush, "call flush after every <flush> objects");
        dump("closef", self.closef, "close and re-open file after every <closef> objects");
        dump("contig", self.contig.into(), "turn on contiguous datasets");
        dump("dontae", self.dontae.into(), "do not atexit|close (helps with valgrind)");
        dump("cache", self.cache as u64, "set metadata cache byte count");
        dump("freelim", u64::from(self.freelim), "set free list limits to 1<<(<freelim>)");
    }
}

fn dump(name: &str, value: u64, help: &str) {
    let pair = format!("{name}={value}");
    let width = 60usize.saturating_sub(pair.len());
    println!("    {pair} {help:>width$}");
}

fn num(s: &str) -> u64 {
    s.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (RunConfig, Vec<String>) {
        RunConfig::from_args(args.iter().copied())
    }

    #[test]
    fn defaults_match_a_bare_run() {
        let (cfg, ignored) = parse(&[]);
        assert!(ignored.is_empty());
        assert_eq!(cfg.fanout, [1000, 0, 0, 0]);
        assert_eq!(cfg.dsize, 1);
        assert_eq!(cfg.mode, RunMode::Write);
        assert_eq!(cfg.filename, PathBuf::from(DEFAULT_FILENAME));
    }

    #[test]
    fn parses_per_level_fanout() {
        let (cfg, _) = parse(&["nd=50,10"]);
        assert_eq!(cfg.fanout, [50, 10, 0, 0]);

        let (cfg, _) = parse(&["nd=10,10,10,10"]);
        assert_eq!(cfg.fanout, [10, 10, 10, 10]);

        // an explicit nd list replaces the level-0 default entirely
        let (cfg, _) = parse(&["nd="]);
        assert_eq!(cfg.fanout, [0, 0, 0, 0]);
    }

    #[test]
    fn parses_scalar_knobs() {
        let (cfg, ignored) = parse(&[
            "dsize=250", "contig=1", "zip=6", "noise=97", "doread=2", "estlink=16",
            "compat=1", "cache=1048576", "freelim=12", "gc=100", "flush=50",
            "closef=200", "dontae=1",
        ]);
        assert!(ignored.is_empty());
        assert_eq!(cfg.dsize, 250);
        assert!(cfg.contig);
        assert_eq!(cfg.zip, 6);
        assert_eq!(cfg.noise, 97);
        assert_eq!(cfg.mode, RunMode::Verify);
        assert_eq!(cfg.estlink, 16);
        assert!(cfg.compat);
        assert_eq!(cfg.cache, 1_048_576);
        assert_eq!(cfg.freelim, 12);
        assert_eq!(cfg.gc, 100);
        assert_eq!(cfg.flush, 50);
        assert_eq!(cfg.closef, 200);
        assert!(cfg.dontae);
    }

    #[test]
    fn unknown_tokens_are_collected_not_fatal() {
        let (cfg, ignored) = parse(&["nd=5", "bogus=1", "", "stray"]);
        assert_eq!(cfg.fanout[0], 5);
        assert_eq!(ignored, vec!["bogus=1".to_string(), "stray".to_string()]);
    }

    #[test]
    fn depth_truncates_at_first_zero() {
        let (cfg, _) = parse(&["nd=5"]);
        assert_eq!(cfg.depth(), 1);
        let (cfg, _) = parse(&["nd=5,4"]);
        assert_eq!(cfg.depth(), 2);
        let (cfg, _) = parse(&["nd=5,0,7"]);
        assert_eq!(cfg.depth(), 1);
        let (cfg, _) = parse(&["nd=2,2,2,2"]);
        assert_eq!(cfg.depth(), 4);
    }

    #[test]
    fn total_objects_sums_level_products() {
        let (cfg, _) = parse(&["nd=3,2"]);
        assert_eq!(cfg.total_objects(), 3 + 3 * 2);

        let (cfg, _) = parse(&["nd=10,10,10,10"]);
        assert_eq!(cfg.total_objects(), 10 + 100 + 1000 + 10_000);

        // a zero level cuts everything below it off
        let (cfg, _) = parse(&["nd=7,0,9"]);
        assert_eq!(cfg.total_objects(), 7);

        let (cfg, _) = parse(&["nd=0"]);
        assert_eq!(cfg.total_objects(), 0);
    }

    #[test]
    fn link_estimates_are_capped() {
        let (cfg, _) = parse(&["nd=100000,3"]);
        assert_eq!(cfg.est_links(0), 65_535);
        assert_eq!(cfg.est_links(1), 3);
    }

    #[test]
    fn doread_knob_maps_to_modes() {
        assert_eq!(RunMode::from_knob(0), RunMode::Write);
        assert_eq!(RunMode::from_knob(1), RunMode::Read);
        assert_eq!(RunMode::from_knob(2), RunMode::Verify);
        assert!(RunMode::Verify.is_read());
        assert!(RunMode::Verify.verifies());
        assert!(!RunMode::Read.verifies());
    }
}
