//! File creation and access property builders.
//!
//! Creation properties pin the indexed-storage branching factor to its
//! minimum (the workload is many tiny objects, not large chunked arrays) and
//! optionally carry the link-count estimation hint. Access properties select
//! the latest on-disk format unless compatibility mode is requested and can
//! pin the metadata cache to a fixed size with the adaptive resize machinery
//! switched off.

use hdf5::plist::file_access::{
    CacheDecreaseMode, CacheIncreaseMode, FlashIncreaseMode, LibraryVersion, MetadataCacheConfig,
};
use hdf5::plist::{FileAccess, FileCreate};
use hdf5::File;

use crate::config::RunConfig;
use crate::error::Result;
use crate::raw;

/// Build the file-creation property list for a write run.
pub fn file_create_props(cfg: &RunConfig) -> Result<FileCreate> {
    let mut builder = FileCreate::build();
    builder.istore_k(1);
    let fcpl = builder.finish()?;
    if cfg.estlink > 0 {
        raw::set_file_link_estimate(&fcpl, cfg.est_links(0), cfg.estlink)?;
    }
    Ok(fcpl)
}

/// Build the file-access property list used for every open of the file.
pub fn file_access_props(cfg: &RunConfig) -> Result<FileAccess> {
    let mut builder = FileAccess::build();
    if !cfg.compat {
        builder.libver_bounds(LibraryVersion::V110, LibraryVersion::V110);
    }
    if cfg.cache > 0 {
        let mdc = MetadataCacheConfig {
            set_initial_size: true,
            initial_size: cfg.cache,
            min_size: cfg.cache,
            max_size: cfg.cache,
            incr_mode: CacheIncreaseMode::Off,
            flash_incr_mode: FlashIncreaseMode::Off,
            decr_mode: CacheDecreaseMode::Off,
            ..MetadataCacheConfig::default()
        };
        builder.mdc_config(&mdc);
    }
    Ok(builder.finish()?)
}

/// Close the file and open it again with freshly built access properties,
/// read-write for write runs and read-only for read runs. Group handles
/// created under the old handle stay usable; the library keeps the
/// underlying file alive until they close, which also means the new open
/// must ask for the same access the surviving handles hold.
pub fn reopen_file(file: File, cfg: &RunConfig) -> Result<File> {
    drop(file);
    let fapl = file_access_props(cfg)?;
    let mut builder = File::with_options();
    builder.set_access_plist(&fapl);
    if cfg.mode.is_read() {
        Ok(builder.open(&cfg.filename)?)
    } else {
        Ok(builder.open_rw(&cfg.filename)?)
    }
}
