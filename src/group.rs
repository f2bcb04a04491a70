//! Group ("directory") creation and reopening.
//!
//! Group names encode their level and index so that read runs can
//! reconstruct the tree from the configuration alone. Every created group
//! gets a `..` soft link back to its parent path, mirroring a filesystem
//! directory. In read mode an open failure is tolerated: the caller carries
//! the absence downstream and reports it per leaf when verifying.

use hdf5::Group;

use crate::config::RunConfig;
use crate::error::Result;
use crate::raw;
use crate::stats::RunStats;

/// Deterministic name for the `idx`-th group at `level` (levels start at 1).
pub fn group_name(level: usize, idx: u64) -> String {
    format!("level_{level}_{idx:06}")
}

/// Absolute path of a child under `parent_path`.
pub fn child_path(parent_path: &str, name: &str) -> String {
    if parent_path == "/" {
        format!("/{name}")
    } else {
        format!("{parent_path}/{name}")
    }
}

/// Create (write mode) or open (read modes) the `idx`-th child group at
/// `level` under `parent`. Returns the handle, absent when the parent is
/// absent or a read-mode open fails, together with the child's path.
pub fn create_or_open(
    parent: Option<&Group>,
    idx: u64,
    level: usize,
    cfg: &RunConfig,
    parent_path: &str,
    stats: &mut RunStats,
) -> Result<(Option<Group>, String)> {
    let name = group_name(level, idx);
    let path = child_path(parent_path, &name);

    let child = if cfg.mode.is_read() {
        parent.and_then(|p| p.group(&name).ok())
    } else {
        match parent {
            Some(p) => {
                let group = if cfg.estlink > 0 {
                    raw::create_group_with_est_links(
                        p,
                        &name,
                        cfg.est_links(level - 1),
                        cfg.estlink,
                    )?;
                    p.group(&name)?
                } else {
                    p.create_group(&name)?
                };
                group.link_soft(parent_path, "..")?;
                Some(group)
            }
            None => None,
        }
    };

    stats.groups += 1;
    Ok((child, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded_per_level() {
        assert_eq!(group_name(1, 0), "level_1_000000");
        assert_eq!(group_name(3, 42), "level_3_000042");
        assert_eq!(group_name(2, 1_000_000), "level_2_1000000");
    }

    #[test]
    fn paths_join_without_double_slashes() {
        assert_eq!(child_path("/", "level_1_000000"), "/level_1_000000");
        assert_eq!(
            child_path("/level_1_000003", "level_2_000001"),
            "/level_1_000003/level_2_000001"
        );
    }
}
