//! Synthetic stability and pink noise usage monitoring for a care facility.
//!
//! [`generator`] produces per-resident daily series, [`aggregate`] folds them
//! into dashboard numbers, and [`notifications`] holds the mock alert stream.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod generator;
pub mod models;
pub mod notifications;
pub mod registry;
pub mod report;

pub use aggregate::{count_falls, distribution};
pub use generator::generate;
pub use notifications::notify;
