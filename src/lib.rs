//! A uniform object model over hierarchical file-share storage.
//!
//! Directories and files of a share are exposed as [`storage::Object`] records
//! through a single [`storage::Storage`] session supporting create, stat, read,
//! write, delete and paginated listing.

pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
