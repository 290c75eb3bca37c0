//! Shared Types

pub mod entity;
pub mod session;

pub use entity::*;
pub use session::*;
