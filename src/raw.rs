//! Thin safe wrappers over `hdf5-sys` entry points that the high-level
//! `hdf5` crate does not expose: whole-library garbage collection, free-list
//! limits, the atexit opt-out, open-handle counting, global flush, and group
//! creation with link-count estimation hints.
//!
//! Every function here checks the C return code and maps failures to
//! [`BenchError::LowLevel`]; no raw identifier escapes this module.

#![allow(unsafe_code)]

use std::ffi::CString;

use hdf5::globals::H5P_GROUP_CREATE;
use hdf5::{File, Group};
use hdf5_sys::h5::{herr_t, H5dont_atexit, H5garbage_collect, H5set_free_list_limits};
use hdf5_sys::h5f::{H5F_scope_t, H5Fflush, H5Fget_obj_count, H5F_OBJ_ALL};
use hdf5_sys::h5g::{H5Gclose, H5Gcreate2};
use hdf5_sys::h5p::{H5P_DEFAULT, H5Pclose, H5Pcreate, H5Pset_est_link_info};

use crate::error::{BenchError, Result};

fn check(call: &'static str, status: herr_t) -> Result<()> {
    if status < 0 {
        Err(BenchError::LowLevel { call })
    } else {
        Ok(())
    }
}

/// Ask the library not to install its atexit cleanup handler. Must run
/// before the first other library call to have any effect.
pub fn dont_atexit() -> Result<()> {
    check("H5dont_atexit", unsafe { H5dont_atexit() })
}

/// Reclaim the library's internal free lists.
pub fn garbage_collect() -> Result<()> {
    check("H5garbage_collect", unsafe { H5garbage_collect() })
}

/// Apply the same byte limit to all six of the library's free-list caps.
pub fn set_free_list_limits(limit: i32) -> Result<()> {
    check("H5set_free_list_limits", unsafe {
        H5set_free_list_limits(limit, limit, limit, limit, limit, limit)
    })
}

/// Flush everything the file owns out to disk.
pub fn flush_global(file: &File) -> Result<()> {
    check("H5Fflush", unsafe {
        H5Fflush(file.id(), H5F_scope_t::H5F_SCOPE_GLOBAL)
    })
}

/// Number of open library handles attached to the file, or a negative value
/// when the query itself fails.
pub fn open_object_count(file: &File) -> i64 {
    unsafe { H5Fget_obj_count(file.id(), H5F_OBJ_ALL) as i64 }
}

/// Create a child group under `parent` with an `est_link_info` hint on its
/// creation properties, then close it again. The caller reopens the group
/// through the safe API; the hint itself is persisted at creation time and
/// cannot be applied afterwards.
pub fn create_group_with_est_links(
    parent: &Group,
    name: &str,
    est_entries: u32,
    est_name_len: u32,
) -> Result<()> {
    let c_name = CString::new(name).map_err(|_| BenchError::LowLevel {
        call: "CString::new",
    })?;
    unsafe {
        let gcpl = H5Pcreate(*H5P_GROUP_CREATE);
        if gcpl < 0 {
            return Err(BenchError::LowLevel { call: "H5Pcreate" });
        }
        if H5Pset_est_link_info(gcpl, est_entries, est_name_len) < 0 {
            H5Pclose(gcpl);
            return Err(BenchError::LowLevel {
                call: "H5Pset_est_link_info",
            });
        }
        let gid = H5Gcreate2(parent.id(), c_name.as_ptr(), H5P_DEFAULT, gcpl, H5P_DEFAULT);
        H5Pclose(gcpl);
        if gid < 0 {
            return Err(BenchError::LowLevel { call: "H5Gcreate2" });
        }
        H5Gclose(gid);
    }
    Ok(())
}

/// Apply an `est_link_info` hint to a file-creation property list. File
/// creation properties inherit the group-creation properties of the root
/// group, so the same hint shapes the root's link storage.
pub fn set_file_link_estimate(
    fcpl: &hdf5::plist::FileCreate,
    est_entries: u32,
    est_name_len: u32,
) -> Result<()> {
    check("H5Pset_est_link_info", unsafe {
        H5Pset_est_link_info(fcpl.id(), est_entries, est_name_len)
    })
}
