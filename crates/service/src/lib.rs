//! Consistency core for the courier directory: departments, roles, cities
//! and users.
//! - Store access goes through the capability traits in `repository`.
//! - Services validate, check uniqueness, merge patches and project views.
//! - `repo::seaorm` backs the traits with PostgreSQL; `repository::memory`
//!   keeps everything in process.

pub mod domain;
pub mod errors;
pub mod merge;
pub mod patch;
pub mod repo;
pub mod repository;
pub mod services;
pub mod uniqueness;
pub mod validation;
pub mod view;

#[cfg(test)]
pub mod test_support;
