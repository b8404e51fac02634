//! Shared building blocks for the workspace: logging setup, pagination
//! primitives and small response types.

pub mod pagination;
pub mod types;
pub mod utils;
