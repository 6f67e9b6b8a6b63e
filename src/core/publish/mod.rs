//! Publishing of materialized state
//!
//! - [`layout`] - Keys of the published file and staging directories
//! - [`staging`] - Scoped staging directory
//! - [`writer`] - Stage, atomic replace, clean up

pub mod layout;
pub mod staging;
pub mod writer;

pub use layout::{PublishLayout, PART_FILE_NAME, SUCCESS_MARKER};
pub use staging::StagingArea;
pub use writer::{MaterializationWriter, PublishReceipt};
