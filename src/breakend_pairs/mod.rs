//! Relations between adjacent breakends: deletion bridges and foldbacks
//!

pub mod deletion_bridges;
pub mod foldbacks;

pub use deletion_bridges::{DeletionBridges, find_deletion_bridges};
pub use foldbacks::{Foldbacks, mark_foldbacks};
