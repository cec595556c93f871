//! famtree: family trees from flat genealogy snapshots.
//!
//! Members carry optional father/mother references. The domain layer groups
//! them into couples, single-parent links and roots, builds a tree per
//! family and filters it by name.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
