//! End-to-end runs against real HDF5 files: build a tree, re-read it, and
//! verify the values, under the interesting knob combinations.

use h5dirbench::config::{RunConfig, RunMode};
use h5dirbench::driver;
use serial_test::serial;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> RunConfig {
    RunConfig {
        filename: dir.path().join("tree.h5"),
        ..RunConfig::default()
    }
}

#[test]
#[serial]
fn two_level_tree_counts_and_verifies() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [3, 2, 0, 0],
        dsize: 4,
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.objects, 9);
    assert_eq!(report.groups, 3);
    assert_eq!(report.datasets, 6);
    assert_eq!(report.verify_failures, 0);
    assert!(report.file_bytes > 0);

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    let report = driver::run(&verify).unwrap();
    assert_eq!(report.groups, 3);
    assert_eq!(report.datasets, 6);
    assert_eq!(report.verify_failures, 0);
}

#[test]
#[serial]
fn read_runs_leave_the_file_untouched() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [10, 0, 0, 0],
        dsize: 16,
        ..config_in(&dir)
    };

    let written = driver::run(&cfg).unwrap();
    assert_eq!(written.datasets, 10);
    assert_eq!(written.groups, 0);

    let read_cfg = RunConfig {
        mode: RunMode::Read,
        ..cfg
    };
    let first = driver::run(&read_cfg).unwrap();
    let second = driver::run(&read_cfg).unwrap();
    assert_eq!(first.file_bytes, written.file_bytes);
    assert_eq!(second.file_bytes, written.file_bytes);
    assert_eq!(first.verify_failures, 0);

    // contents are still exactly what the write run produced
    let verify = RunConfig {
        mode: RunMode::Verify,
        ..read_cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn four_level_tree_has_the_planned_shape() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [2, 2, 2, 2],
        ..config_in(&dir)
    };
    assert_eq!(cfg.total_objects(), 30);

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.objects, 30);
    assert_eq!(report.groups, 2 + 4 + 8);
    assert_eq!(report.datasets, 16);

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn missing_datasets_count_as_verification_failures() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [3, 0, 0, 0],
        dsize: 2,
        ..config_in(&dir)
    };
    driver::run(&cfg).unwrap();

    // ask for more leaves than were written
    let verify = RunConfig {
        fanout: [5, 0, 0, 0],
        mode: RunMode::Verify,
        ..cfg
    };
    let report = driver::run(&verify).unwrap();
    assert_eq!(report.datasets, 5);
    assert_eq!(report.verify_failures, 2);
}

#[test]
#[serial]
fn missing_groups_fail_every_leaf_below_them() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [2, 2, 0, 0],
        dsize: 4,
        ..config_in(&dir)
    };
    driver::run(&cfg).unwrap();

    let verify = RunConfig {
        fanout: [3, 2, 0, 0],
        mode: RunMode::Verify,
        ..cfg
    };
    let report = driver::run(&verify).unwrap();
    // the third level-1 group does not exist, so both its leaves fail
    assert_eq!(report.verify_failures, 2);
}

#[test]
#[serial]
fn compressed_run_shrinks_below_the_raw_payload() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [4, 0, 0, 0],
        dsize: 100_000,
        zip: 6,
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert!(report.zip);
    assert_eq!(report.raw_bytes, 4 * 100_000 * 8);
    assert!(report.is_compressed(), "deterministic data must compress");
    assert!(report.file_bytes < report.raw_bytes);

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn contiguous_layout_roundtrips() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [5, 0, 0, 0],
        dsize: 9000, // past the compact limit, so contiguous even unforced
        ..config_in(&dir)
    };
    driver::run(&cfg).unwrap();

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);

    let forced = RunConfig {
        contig: true,
        dsize: 8,
        ..config_in(&dir)
    };
    driver::run(&forced).unwrap();
    let verify = RunConfig {
        mode: RunMode::Verify,
        ..forced
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn maintenance_intervals_do_not_disturb_the_tree() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [30, 0, 0, 0],
        dsize: 8,
        flush: 7,
        gc: 5,
        closef: 11,
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.datasets, 30);

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn tuning_knobs_accept_a_normal_run() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [4, 3, 0, 0],
        dsize: 2,
        estlink: 16,
        cache: 1 << 20,
        freelim: 10,
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.groups, 4);
    assert_eq!(report.datasets, 12);

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn compat_mode_roundtrips() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [6, 0, 0, 0],
        compat: true,
        ..config_in(&dir)
    };
    driver::run(&cfg).unwrap();

    let verify = RunConfig {
        mode: RunMode::Verify,
        ..cfg
    };
    assert_eq!(driver::run(&verify).unwrap().verify_failures, 0);
}

#[test]
#[serial]
fn empty_tree_still_produces_a_file() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [0, 0, 0, 0],
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.objects, 0);
    assert!(report.file_bytes > 0);
}

#[test]
#[serial]
fn noise_values_write_and_read_back() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        fanout: [6, 0, 0, 0],
        dsize: 32,
        noise: 11,
        ..config_in(&dir)
    };

    let report = driver::run(&cfg).unwrap();
    assert_eq!(report.datasets, 6);

    let read_cfg = RunConfig {
        mode: RunMode::Read,
        ..cfg
    };
    assert_eq!(driver::run(&read_cfg).unwrap().verify_failures, 0);
}
