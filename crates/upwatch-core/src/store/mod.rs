//! Status persistence for Upwatch
//!
//! The process is stateless between runs; everything it needs to remember
//! about an endpoint lives in the status file.

mod status;

pub use status::StatusStore;
