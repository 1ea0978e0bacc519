//! Data models for Upwatch

mod endpoint;
mod notice;
mod status;

pub use endpoint::*;
pub use notice::*;
pub use status::*;
